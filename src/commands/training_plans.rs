use crate::api::traits::ConnectApi;
use crate::api::types::HttpMethod;
use crate::cli::TrainingPlansCommand;
use crate::output::render;
use anyhow::{Context, Result};
use serde_json::Value;

const TRAINING_PLAN_PATH: &str = "/trainingplan-service/trainingplan";

pub async fn handle_training_plans_command<T: ConnectApi + ?Sized>(
    command: TrainingPlansCommand,
    client: &T,
) -> Result<()> {
    let (path, title, output) = match command {
        TrainingPlansCommand::List { output } => (
            format!("{TRAINING_PLAN_PATH}/plans"),
            "Training Plans".to_string(),
            output,
        ),
        TrainingPlansCommand::Get { id, output } => (
            format!("{TRAINING_PLAN_PATH}/phased/{id}"),
            format!("Training Plan {id}"),
            output,
        ),
        TrainingPlansCommand::Adaptive { id, output } => (
            format!("{TRAINING_PLAN_PATH}/fbt-adaptive/{id}"),
            format!("Adaptive Training Plan {id}"),
            output,
        ),
    };

    let data = client
        .connectapi(HttpMethod::Get, &path, None, None)
        .await
        .with_context(|| format!("Failed to fetch {path}"))?
        .unwrap_or(Value::Null);
    render(&data, output.format, Some(&title), None, output.output.as_deref()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::clients::tests::FakeApiClient;
    use crate::cli::OutputArgs;

    #[tokio::test]
    async fn test_paths() {
        let client = FakeApiClient::default();
        for command in [
            TrainingPlansCommand::List {
                output: OutputArgs::default(),
            },
            TrainingPlansCommand::Get {
                id: 5,
                output: OutputArgs::default(),
            },
            TrainingPlansCommand::Adaptive {
                id: 6,
                output: OutputArgs::default(),
            },
        ] {
            handle_training_plans_command(command, &client).await.unwrap();
        }

        let targets: Vec<String> = client
            .recorded_calls()
            .into_iter()
            .map(|call| call.target)
            .collect();
        assert_eq!(
            targets,
            vec![
                "/trainingplan-service/trainingplan/plans",
                "/trainingplan-service/trainingplan/phased/5",
                "/trainingplan-service/trainingplan/fbt-adaptive/6",
            ]
        );
    }
}
