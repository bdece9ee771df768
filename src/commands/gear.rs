use crate::api::traits::ConnectApi;
use crate::cli::{GearArgs, GearCommand};
use crate::commands::common::{get_json, profile_id, query, show};
use anyhow::Result;
use serde_json::json;

const GEAR_PATH: &str = "/gear-service/gear/filterGear";
const GEAR_USER_PATH: &str = "/gear-service/gear/user";
const GEAR_STATS_PATH: &str = "/gear-service/gear/stats";
const GEAR_ACTIVITIES_PATH: &str = "/activitylist-service/activities";

async fn resolve_profile<T: ConnectApi + ?Sized>(client: &T, profile: Option<u64>) -> Result<u64> {
    match profile {
        Some(profile) => Ok(profile),
        None => profile_id(client).await,
    }
}

pub async fn handle_gear_command<T: ConnectApi + ?Sized>(args: GearArgs, client: &T) -> Result<()> {
    match args.command {
        None => {
            let profile = resolve_profile(client, args.profile).await?;
            let params = query([("userProfilePk", json!(profile))]);
            let data = get_json(client, GEAR_PATH, Some(&params)).await?;
            show(&data, &args.output, "Gear").await
        }
        Some(GearCommand::Defaults { profile, output }) => {
            let profile = resolve_profile(client, profile).await?;
            let path = format!("{GEAR_USER_PATH}/{profile}/activityTypes");
            let data = get_json(client, &path, None).await?;
            show(&data, &output, "Gear Defaults").await
        }
        Some(GearCommand::Stats { uuid, output }) => {
            let data = get_json(client, &format!("{GEAR_STATS_PATH}/{uuid}"), None).await?;
            show(&data, &output, &format!("Gear Stats ({uuid})")).await
        }
        Some(GearCommand::Activities {
            uuid,
            limit,
            output,
        }) => {
            let params = query([("start", json!(0)), ("limit", json!(limit))]);
            let path = format!("{GEAR_ACTIVITIES_PATH}/{uuid}/gear");
            let data = get_json(client, &path, Some(&params)).await?;
            show(&data, &output, &format!("Gear Activities ({uuid})")).await
        }
    }
}
