use crate::output::OutputFormat;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// A command-line client for Garmin Connect.
#[derive(Parser, Debug)]
#[command(name = "gc", author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the stored session tokens
    #[arg(long, global = true, value_name = "DIR")]
    pub tokenstore: Option<String>,

    /// Override the Connect API base URL
    #[arg(long, global = true, hide = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show whether a session is stored and when it expires
    Status(StatusArgs),

    /// Remove the stored session tokens
    Logout,

    /// Daily summary of steps, calories and other totals
    Health {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Step counts for a day, a range or recent weeks
    Steps {
        #[command(flatten)]
        span: SpanArgs,
        #[command(flatten)]
        weekly: WeeklyArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Floors climbed
    Floors {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Intensity minutes for a day or recent weeks
    Intensity {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        weekly: WeeklyArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// All-day events
    Events {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Heart rate for a day
    Heart(HeartArgs),

    /// Sleep data for a night
    Sleep {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Stress levels
    Stress(StressArgs),

    /// Body battery for a day or range
    Battery {
        #[command(flatten)]
        span: SpanArgs,
        /// Show battery events instead of the daily report
        #[arg(long)]
        events: bool,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Respiration rate
    Respiration {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Pulse oximetry
    Spo2 {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Blood pressure readings for a day or range
    BloodPressure {
        #[command(flatten)]
        span: SpanArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Lifestyle logging entries
    Lifestyle {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Hydration for a day
    Hydration {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Query recorded activities
    Activities(ActivitiesArgs),

    /// Body composition and weigh-ins
    Body(BodyArgs),

    /// Advanced training metrics
    Metrics(MetricsArgs),

    /// Registered devices
    Devices(DevicesArgs),

    /// Personal records
    Records {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Goals
    Goals(GoalsArgs),

    /// Badges
    Badges(BadgesArgs),

    /// Challenges
    Challenges(ChallengesArgs),

    /// Gear
    Gear(GearArgs),

    /// Menstrual cycle data
    Menstrual(MenstrualArgs),

    /// Manage workouts
    Workouts(WorkoutsArgs),

    /// Query training plans
    TrainingPlans(TrainingPlansArgs),

    /// Call an arbitrary Connect API path
    Api(ApiArgs),

    /// Generate shell completions
    Completion(CompletionArgs),
}

// --- Argument Structs ---

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// A single day, given as a positional shortcut or with `--date`.
#[derive(Args, Debug, Clone, Default)]
pub struct DayArgs {
    /// today, yesterday, week, month or YYYY-MM-DD
    #[arg(value_name = "WHEN")]
    pub when: Option<String>,

    /// Date (YYYY-MM-DD)
    #[arg(short, long, conflicts_with = "when")]
    pub date: Option<String>,
}

impl DayArgs {
    pub fn date(&self) -> Option<&str> {
        self.when.as_deref().or(self.date.as_deref())
    }
}

/// A day, or a range given with `--start`/`--end`. `--end` alone extends the day.
#[derive(Args, Debug, Clone, Default)]
pub struct SpanArgs {
    #[command(flatten)]
    pub day: DayArgs,

    /// Range start (YYYY-MM-DD)
    #[arg(long, requires = "end", conflicts_with_all = ["when", "date"])]
    pub start: Option<String>,

    /// Range end (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct WeeklyArgs {
    /// Show weekly totals ending on the chosen day
    #[arg(long)]
    pub weekly: bool,

    /// Number of weeks for --weekly
    #[arg(long, default_value_t = 4)]
    pub weeks: u32,
}

impl Default for WeeklyArgs {
    fn default() -> Self {
        Self {
            weekly: false,
            weeks: 4,
        }
    }
}

/// Paging options for challenge listings.
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Index of the first entry
    #[arg(long, default_value_t = 0)]
    pub start: u32,

    /// Maximum number of entries
    #[arg(short, long, default_value_t = 20)]
    pub limit: u32,
}

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Also fetch the social profile of the logged-in user
    #[arg(long)]
    pub profile: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct ActivitiesArgs {
    #[command(subcommand)]
    pub command: ActivitiesCommand,
}

#[derive(Subcommand, Debug)]
pub enum ActivitiesCommand {
    /// List activities, optionally within a date range
    List {
        /// today, yesterday, week, month or YYYY-MM-DD
        #[arg(long, conflicts_with_all = ["start", "end"])]
        date: Option<String>,
        /// Range start (YYYY-MM-DD)
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Range end (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// Maximum number of activities
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Number of activities to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,
        /// Only activities of this type key (e.g. running)
        #[arg(long = "type", value_name = "TYPE")]
        activity_type: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the most recent activity
    Last {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show one activity
    Get {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the total number of activities
    Count {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the known activity types
    Types {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the full details of an activity
    Details {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show lap splits
    Splits {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show typed splits
    TypedSplits {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show split summaries
    SplitSummaries {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the weather during an activity
    Weather {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show time in heart-rate zones
    HrZones {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show time in power zones
    PowerZones {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show strength exercise sets
    ExerciseSets {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the gear used for an activity
    Gear {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Download an activity file
    Download {
        id: u64,
        /// File format
        #[arg(short, long, value_enum, default_value_t = DownloadFormat::Fit)]
        format: DownloadFormat,
        /// Destination file (defaults to activity_<id>.<ext>)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Upload a .fit, .gpx or .tcx file
    Upload {
        file: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Summarize progress over a date range
    Progress {
        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        /// Metric to summarize
        #[arg(short, long, value_enum, default_value_t = ProgressMetric::Distance)]
        metric: ProgressMetric,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    /// Original FIT upload, zipped
    Fit,
    Tcx,
    Gpx,
    Kml,
    Csv,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMetric {
    Distance,
    Duration,
    Elevation,
}

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct HeartArgs {
    #[command(subcommand)]
    pub command: Option<HeartCommand>,
    #[command(flatten)]
    pub day: DayArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Subcommand, Debug)]
pub enum HeartCommand {
    /// Resting heart rate
    Resting {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct StressArgs {
    #[command(subcommand)]
    pub command: Option<StressCommand>,
    #[command(flatten)]
    pub day: DayArgs,
    #[command(flatten)]
    pub weekly: WeeklyArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Subcommand, Debug)]
pub enum StressCommand {
    /// Stress samples across the whole day
    AllDay {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct BodyArgs {
    #[command(subcommand)]
    pub command: Option<BodyCommand>,
    #[command(flatten)]
    pub span: SpanArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Subcommand, Debug)]
pub enum BodyCommand {
    /// Weigh-ins for a day or range
    Weighins {
        #[command(flatten)]
        span: SpanArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Parser, Debug)]
pub struct MetricsArgs {
    #[command(subcommand)]
    pub command: MetricsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MetricsCommand {
    /// VO2 max estimate
    Vo2max {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Heart rate variability
    Hrv {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Training readiness
    TrainingReadiness {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Training readiness computed after waking up
    MorningReadiness {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Training status
    TrainingStatus {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Fitness age
    FitnessAge {
        #[command(flatten)]
        day: DayArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Race time predictions, latest or over a range
    RacePredictions {
        /// Range start (YYYY-MM-DD)
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Range end (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// Aggregation for a range
        #[arg(short = 't', long = "type", value_enum, default_value_t = PredictionType::Daily)]
        prediction_type: PredictionType,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Endurance score for a day or range
    EnduranceScore {
        #[command(flatten)]
        span: SpanArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Hill score for a day or range
    HillScore {
        #[command(flatten)]
        span: SpanArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Lactate threshold, latest or over a range
    LactateThreshold {
        /// Range start (YYYY-MM-DD)
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Range end (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// Aggregation for a range
        #[arg(short, long, value_enum, default_value_t = Aggregation::Daily)]
        aggregation: Aggregation,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Latest cycling functional threshold power
    CyclingFtp {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionType {
    Daily,
    Monthly,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: Option<DevicesCommand>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Subcommand, Debug)]
pub enum DevicesCommand {
    /// The device that synced last
    LastUsed {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// The primary training device
    Primary {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Settings of one device
    Settings {
        device_id: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Alarms configured across all devices
    Alarms {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Solar charging data of one device
    Solar {
        device_id: String,
        #[command(flatten)]
        span: SpanArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Parser, Debug)]
pub struct GoalsArgs {
    /// Goal status
    #[arg(short, long, value_enum, default_value_t = GoalStatus::Active)]
    pub status: GoalStatus,

    /// Maximum number of goals
    #[arg(short, long, default_value_t = 30)]
    pub limit: u32,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    Active,
    Future,
    Past,
}

#[derive(Parser, Debug)]
pub struct BadgesArgs {
    #[command(subcommand)]
    pub command: BadgesCommand,
}

#[derive(Subcommand, Debug)]
pub enum BadgesCommand {
    /// Badges already earned
    Earned {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Badges that can still be earned
    Available {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Badges with progress towards the next level
    InProgress {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Parser, Debug)]
pub struct ChallengesArgs {
    #[command(subcommand)]
    pub command: ChallengesCommand,
}

#[derive(Subcommand, Debug)]
pub enum ChallengesCommand {
    /// Past ad-hoc challenges
    Adhoc {
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Completed badge challenges
    Badge {
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Badge challenges open to join
    Available {
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Badge challenges joined but not completed
    NonCompleted {
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Virtual challenges in progress
    Virtual {
        #[command(flatten)]
        page: PageArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct GearArgs {
    #[command(subcommand)]
    pub command: Option<GearCommand>,
    /// User profile number (defaults to the logged-in user)
    #[arg(value_name = "PROFILE")]
    pub profile: Option<u64>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Subcommand, Debug)]
pub enum GearCommand {
    /// Default gear per activity type
    Defaults {
        /// User profile number (defaults to the logged-in user)
        #[arg(value_name = "PROFILE")]
        profile: Option<u64>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Usage totals of one piece of gear
    Stats {
        uuid: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Activities recorded with one piece of gear
    Activities {
        uuid: String,
        /// Maximum number of activities
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct MenstrualArgs {
    #[command(subcommand)]
    pub command: Option<MenstrualCommand>,
    #[command(flatten)]
    pub day: DayArgs,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Subcommand, Debug)]
pub enum MenstrualCommand {
    /// Cycle calendar for a date range
    Calendar {
        /// Range start (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Range end (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Pregnancy summary
    Pregnancy {
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Parser, Debug)]
pub struct WorkoutsArgs {
    #[command(subcommand)]
    pub command: WorkoutsCommand,
}

/// Payload options shared by `workouts create` and `workouts update`.
#[derive(Args, Debug, Clone, Default)]
pub struct WorkoutPayloadArgs {
    /// Complete workout document as JSON; sent as is
    #[arg(
        long,
        value_name = "PATH",
        conflicts_with_all = ["name", "steps", "sport_key", "sport_id", "description"]
    )]
    pub file: Option<PathBuf>,

    /// Workout name
    #[arg(long)]
    pub name: Option<String>,

    /// JSON array of steps, e.g. '[{"type":"warmup","duration":600}]'
    #[arg(long)]
    pub steps: Option<String>,

    /// Sport key (e.g. running); resolved to an ID when --sport-id is absent
    #[arg(long)]
    pub sport_key: Option<String>,

    /// Sport ID; resolved to a key when --sport-key is absent
    #[arg(long)]
    pub sport_id: Option<i64>,

    /// Workout description
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum WorkoutsCommand {
    /// List saved workouts
    List {
        /// Index of the first workout
        #[arg(long, default_value_t = 0)]
        start: u32,
        /// Maximum number of workouts
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show one workout
    Get {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Download a workout as a FIT file
    Download {
        id: u64,
        /// Destination file (defaults to workout_<id>.fit)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Show a scheduled workout
    Scheduled {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Create a workout
    Create {
        #[command(flatten)]
        payload: WorkoutPayloadArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Replace an existing workout
    Update {
        id: u64,
        #[command(flatten)]
        payload: WorkoutPayloadArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Delete a workout
    Delete { id: u64 },
}

#[derive(Parser, Debug)]
pub struct TrainingPlansArgs {
    #[command(subcommand)]
    pub command: TrainingPlansCommand,
}

#[derive(Subcommand, Debug)]
pub enum TrainingPlansCommand {
    /// List available training plans
    List {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show a phased training plan
    Get {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show an adaptive training plan
    Adaptive {
        id: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Parser, Debug)]
pub struct ApiArgs {
    /// API path, e.g. /userprofile-service/socialProfile
    pub path: String,

    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Query parameters as a JSON object
    #[arg(long)]
    pub params: Option<String>,

    /// Request body as JSON
    #[arg(long)]
    pub body: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CompletionArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
