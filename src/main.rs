mod api;
mod cli;
mod commands;
mod config;
mod dates;
mod error;
mod output;
mod workout;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::{AppConfig, FileTokenStore, TokenStore};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::clients::LiveApiClient;

/// Logs go to stderr. `RUST_LOG` overrides the level picked by `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn get_client<S: TokenStore + ?Sized>(
    store: &S,
    app_config: &AppConfig,
) -> Result<LiveApiClient> {
    let token = store.load_token().await?;
    if token.expired() {
        warn!(
            expires_at = ?token.expires_at_utc(),
            "stored access token has expired; requests will likely be rejected"
        );
    }
    debug!(api_url = %app_config.api_url, "creating API client");
    Ok(LiveApiClient::new(&token, &app_config.api_url)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let app_config = AppConfig::resolve(cli.tokenstore.as_deref(), cli.api_url.as_deref())?;
    let store = FileTokenStore::new(&app_config.token_dir);

    match cli.command {
        Commands::Status(args) => {
            let client = if args.profile {
                Some(get_client(&store, &app_config).await?)
            } else {
                None
            };
            commands::status::handle_status_command(args, &store, client.as_ref()).await?;
        }
        Commands::Logout => {
            commands::logout::logout(&store).await?;
        }
        Commands::Health { day, output } => {
            let client = get_client(&store, &app_config).await?;
            commands::health::health(&client, &day, &output).await?;
        }
        Commands::Steps {
            span,
            weekly,
            output,
        } => {
            let client = get_client(&store, &app_config).await?;
            commands::health::steps(&client, &span, &weekly, &output).await?;
        }
        Commands::Floors { day, output } => {
            let client = get_client(&store, &app_config).await?;
            commands::health::floors(&client, &day, &output).await?;
        }
        Commands::Intensity {
            day,
            weekly,
            output,
        } => {
            let client = get_client(&store, &app_config).await?;
            commands::health::intensity(&client, &day, &weekly, &output).await?;
        }
        Commands::Events { day, output } => {
            let client = get_client(&store, &app_config).await?;
            commands::health::events(&client, &day, &output).await?;
        }
        Commands::Heart(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::heart::handle_heart_command(args, &client).await?;
        }
        Commands::Sleep { day, output } => {
            let client = get_client(&store, &app_config).await?;
            commands::health::sleep(&client, &day, &output).await?;
        }
        Commands::Stress(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::stress::handle_stress_command(args, &client).await?;
        }
        Commands::Battery {
            span,
            events,
            output,
        } => {
            let client = get_client(&store, &app_config).await?;
            commands::stress::battery(&client, &span, events, &output).await?;
        }
        Commands::Respiration { day, output } => {
            let client = get_client(&store, &app_config).await?;
            commands::vitals::respiration(&client, &day, &output).await?;
        }
        Commands::Spo2 { day, output } => {
            let client = get_client(&store, &app_config).await?;
            commands::vitals::spo2(&client, &day, &output).await?;
        }
        Commands::BloodPressure { span, output } => {
            let client = get_client(&store, &app_config).await?;
            commands::vitals::blood_pressure(&client, &span, &output).await?;
        }
        Commands::Lifestyle { day, output } => {
            let client = get_client(&store, &app_config).await?;
            commands::vitals::lifestyle(&client, &day, &output).await?;
        }
        Commands::Hydration { day, output } => {
            let client = get_client(&store, &app_config).await?;
            commands::health::hydration(&client, &day, &output).await?;
        }
        Commands::Activities(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::activities::handle_activities_command(args.command, &client).await?;
        }
        Commands::Body(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::body::handle_body_command(args, &client).await?;
        }
        Commands::Metrics(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::metrics::handle_metrics_command(args, &client).await?;
        }
        Commands::Devices(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::devices::handle_devices_command(args, &client).await?;
        }
        Commands::Records { output } => {
            let client = get_client(&store, &app_config).await?;
            commands::goals::records(&client, &output).await?;
        }
        Commands::Goals(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::goals::handle_goals_command(args, &client).await?;
        }
        Commands::Badges(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::goals::handle_badges_command(args, &client).await?;
        }
        Commands::Challenges(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::goals::handle_challenges_command(args, &client).await?;
        }
        Commands::Gear(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::gear::handle_gear_command(args, &client).await?;
        }
        Commands::Menstrual(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::menstrual::handle_menstrual_command(args, &client).await?;
        }
        Commands::Workouts(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::workouts::handle_workouts_command(args.command, &client).await?;
        }
        Commands::TrainingPlans(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::training_plans::handle_training_plans_command(args.command, &client)
                .await?;
        }
        Commands::Api(args) => {
            let client = get_client(&store, &app_config).await?;
            commands::api::handle_api_command(args, &client).await?;
        }
        Commands::Completion(args) => {
            commands::completion::handle_completion_command(args.shell)?;
        }
    }

    Ok(())
}
