//! Fixed reference data for the workout endpoint.
//!
//! Display order matches the numeric ID for every entry.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    pub key: &'static str,
    pub id: i64,
}

impl TableEntry {
    pub fn display_order(&self) -> i64 {
        self.id
    }
}

const fn entry(key: &'static str, id: i64) -> TableEntry {
    TableEntry { key, id }
}

pub const STEP_TYPES: &[TableEntry] = &[
    entry("warmup", 1),
    entry("cooldown", 2),
    entry("interval", 3),
    entry("recovery", 4),
    entry("rest", 5),
    entry("repeat", 6),
    entry("other", 7),
];

pub const END_CONDITIONS: &[TableEntry] = &[
    entry("lap.button", 1),
    entry("time", 2),
    entry("distance", 3),
    entry("calories", 4),
    entry("power", 5),
    entry("heart.rate", 6),
    entry("iterations", 7),
    entry("fixed.rest", 8),
];

pub const TARGET_TYPES: &[TableEntry] = &[
    entry("no.target", 1),
    entry("power.zone", 2),
    entry("cadence.zone", 3),
    entry("heart.rate.zone", 4),
    entry("speed.zone", 5),
    entry("pace.zone", 6),
];

/// Shorthand target names and the canonical key each maps to.
pub const TARGET_ALIASES: &[(&str, &str)] = &[
    ("hr_zone", "heart.rate.zone"),
    ("heart_rate_zone", "heart.rate.zone"),
    ("heart_rate", "heart.rate.zone"),
    ("hr", "heart.rate.zone"),
    ("power_zone", "power.zone"),
    ("power", "power.zone"),
    ("pace_zone", "pace.zone"),
    ("pace", "pace.zone"),
    ("speed_zone", "speed.zone"),
    ("speed", "speed.zone"),
    ("cadence", "cadence.zone"),
    ("cadence_zone", "cadence.zone"),
    ("no_target", "no.target"),
    ("none", "no.target"),
];

pub const NO_TARGET: &str = "no.target";
/// Target used when the shorthand is a bare number.
pub const NUMERIC_TARGET: &str = "heart.rate.zone";
pub const TIME_CONDITION: &str = "time";
pub const LAP_BUTTON_CONDITION: &str = "lap.button";

fn find(table: &'static [TableEntry], key: &str) -> Option<&'static TableEntry> {
    table.iter().find(|entry| entry.key == key)
}

pub fn step_type(key: &str) -> Option<&'static TableEntry> {
    find(STEP_TYPES, key)
}

pub fn end_condition(key: &str) -> Option<&'static TableEntry> {
    find(END_CONDITIONS, key)
}

pub fn target_type(key: &str) -> Option<&'static TableEntry> {
    find(TARGET_TYPES, key)
}

/// Resolves a target alias or canonical key. Input is expected lower-cased.
pub fn canonical_target(kind: &str) -> Option<&'static str> {
    TARGET_ALIASES
        .iter()
        .find(|(alias, _)| *alias == kind)
        .map(|(_, key)| *key)
        .or_else(|| target_type(kind).map(|entry| entry.key))
}

/// Zone targets carry a zone number alongside the target value.
pub fn is_zone_target(key: &str) -> bool {
    key.ends_with(".zone")
}
