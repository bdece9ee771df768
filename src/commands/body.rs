use crate::api::traits::ConnectApi;
use crate::cli::{BodyArgs, BodyCommand};
use crate::commands::common::{date_span, get_json, query, show};
use anyhow::Result;
use serde_json::json;

const BODY_COMPOSITION_PATH: &str = "/weight-service/weight/dateRange";
const WEIGH_INS_PATH: &str = "/weight-service/weight/range";
const DAILY_WEIGH_INS_PATH: &str = "/weight-service/weight/dayview";

pub async fn handle_body_command<T: ConnectApi + ?Sized>(args: BodyArgs, client: &T) -> Result<()> {
    match args.command {
        None => {
            let range = date_span(&args.span)?;
            let params = query([
                ("startDate", json!(range.start)),
                ("endDate", json!(range.last())),
            ]);
            let data = get_json(client, BODY_COMPOSITION_PATH, Some(&params)).await?;
            show(&data, &args.output, &format!("Body Composition ({})", range.start)).await
        }
        Some(BodyCommand::Weighins { span, output }) => {
            let range = date_span(&span)?;
            let params = query([("includeAll", json!(true))]);
            let path = match &range.end {
                Some(end) => format!("{WEIGH_INS_PATH}/{}/{end}", range.start),
                None => format!("{DAILY_WEIGH_INS_PATH}/{}", range.start),
            };
            let data = get_json(client, &path, Some(&params)).await?;
            show(&data, &output, "Weigh-ins").await
        }
    }
}
