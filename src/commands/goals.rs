use crate::api::traits::ConnectApi;
use crate::cli::{
    BadgesArgs, BadgesCommand, ChallengesArgs, ChallengesCommand, GoalStatus, GoalsArgs,
    OutputArgs, PageArgs,
};
use crate::commands::common::{display_name, get_json, query, show};
use anyhow::Result;
use serde_json::{Value, json};

const RECORDS_PATH: &str = "/personalrecord-service/personalRecord/prs";
const GOALS_PATH: &str = "/goal-service/goal/goals";
const EARNED_BADGES_PATH: &str = "/badge-service/badge/earned";
const AVAILABLE_BADGES_PATH: &str = "/badge-service/badge/available";
const ADHOC_CHALLENGES_PATH: &str = "/adhocchallenge-service/adHocChallenge/historical";
const BADGE_CHALLENGES_PATH: &str = "/badgechallenge-service/badgeChallenge";
const VIRTUAL_CHALLENGES_PATH: &str = "/badgechallenge-service/virtualChallenge/inProgress";

fn status_key(status: GoalStatus) -> &'static str {
    match status {
        GoalStatus::Active => "active",
        GoalStatus::Future => "future",
        GoalStatus::Past => "past",
    }
}

pub async fn records<T: ConnectApi + ?Sized>(client: &T, output: &OutputArgs) -> Result<()> {
    let name = display_name(client).await?;
    let data = get_json(client, &format!("{RECORDS_PATH}/{name}"), None).await?;
    show(&data, output, "Personal Records").await
}

pub async fn handle_goals_command<T: ConnectApi + ?Sized>(
    args: GoalsArgs,
    client: &T,
) -> Result<()> {
    let status = status_key(args.status);
    let params = query([
        ("status", json!(status)),
        ("start", json!(0)),
        ("limit", json!(args.limit)),
    ]);
    let data = get_json(client, GOALS_PATH, Some(&params)).await?;
    show(&data, &args.output, &format!("Goals ({status})")).await
}

/// A badge counts as in progress once it has progress that has not reached
/// the target, or when a repeatable badge can still be earned again.
fn badge_in_progress(badge: &Value) -> bool {
    let progress = badge
        .get("badgeProgressValue")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    if progress == 0.0 {
        return false;
    }
    let target = badge.get("badgeTargetValue").and_then(Value::as_f64);
    if target != Some(progress) {
        return true;
    }
    match badge.get("badgeLimitCount").and_then(Value::as_u64) {
        Some(limit) => {
            let earned = badge
                .get("badgeEarnedNumber")
                .and_then(Value::as_u64)
                .unwrap_or(0);
            earned < limit
        }
        None => false,
    }
}

/// In-progress badges from both listings, one entry per `badgeId`.
/// An available badge replaces an earned one with the same id.
fn in_progress_badges(earned: &Value, available: &Value) -> Value {
    let mut badges: Vec<Value> = Vec::new();
    let candidates = [earned, available]
        .into_iter()
        .filter_map(Value::as_array)
        .flatten()
        .filter(|badge| badge_in_progress(badge));
    for badge in candidates {
        let id = badge.get("badgeId");
        match badges.iter_mut().find(|kept| id.is_some() && kept.get("badgeId") == id) {
            Some(kept) => *kept = badge.clone(),
            None => badges.push(badge.clone()),
        }
    }
    Value::Array(badges)
}

pub async fn handle_badges_command<T: ConnectApi + ?Sized>(
    args: BadgesArgs,
    client: &T,
) -> Result<()> {
    match args.command {
        BadgesCommand::Earned { output } => {
            let data = get_json(client, EARNED_BADGES_PATH, None).await?;
            show(&data, &output, "Earned Badges").await
        }
        BadgesCommand::Available { output } => {
            let params = query([("showExclusiveBadge", json!(true))]);
            let data = get_json(client, AVAILABLE_BADGES_PATH, Some(&params)).await?;
            show(&data, &output, "Available Badges").await
        }
        BadgesCommand::InProgress { output } => {
            let earned = get_json(client, EARNED_BADGES_PATH, None).await?;
            let params = query([("showExclusiveBadge", json!(true))]);
            let available = get_json(client, AVAILABLE_BADGES_PATH, Some(&params)).await?;
            let data = in_progress_badges(&earned, &available);
            show(&data, &output, "In-Progress Badges").await
        }
    }
}

pub async fn handle_challenges_command<T: ConnectApi + ?Sized>(
    args: ChallengesArgs,
    client: &T,
) -> Result<()> {
    let (path, page, output, title) = match args.command {
        ChallengesCommand::Adhoc { page, output } => {
            (ADHOC_CHALLENGES_PATH.to_string(), page, output, "Adhoc Challenges")
        }
        ChallengesCommand::Badge { page, output } => (
            format!("{BADGE_CHALLENGES_PATH}/completed"),
            page,
            output,
            "Badge Challenges",
        ),
        ChallengesCommand::Available { page, output } => (
            format!("{BADGE_CHALLENGES_PATH}/available"),
            page,
            output,
            "Available Badge Challenges",
        ),
        ChallengesCommand::NonCompleted { page, output } => (
            format!("{BADGE_CHALLENGES_PATH}/non-completed"),
            page,
            output,
            "Non-Completed Badge Challenges",
        ),
        ChallengesCommand::Virtual { page, output } => (
            VIRTUAL_CHALLENGES_PATH.to_string(),
            page,
            output,
            "Virtual Challenges",
        ),
    };
    let PageArgs { start, limit } = page;
    let params = query([("start", json!(start)), ("limit", json!(limit))]);
    let data = get_json(client, &path, Some(&params)).await?;
    show(&data, &output, title).await
}
