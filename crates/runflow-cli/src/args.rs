//! Command-line interface definitions using clap
//!
//! Argument structures carry the clap attributes and convert into the core
//! parameter types with `From`, so the core stays free of CLI concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Store / Coach / Generator
//! ```

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use runflow_core::{
    params::{
        AddShoe, History, LogShoeDistance, SessionRef, ToggleSession, TrainingLoad,
        UpdateProfile, WeekRef,
    },
    IntakeForm, MergePolicy, PerfKind,
};

/// Running training companion
///
/// RunFlow keeps a generated training program, lets you tick off sessions
/// with how they felt, and talks to an AI coach that can rewrite a week of
/// the plan. Running without a command shows the dashboard.
#[derive(Parser)]
#[command(version, about, name = "runflow")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/runflow/runflow.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the RunFlow CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Show, import, export or clear the training program
    #[command(alias = "p")]
    Program {
        #[command(subcommand)]
        command: ProgramCommands,
    },
    /// Inspect and complete sessions
    #[command(alias = "s")]
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Generate a new program with the model
    #[command(alias = "g")]
    Generate(GenerateArgs),
    /// Talk to the coach
    #[command(alias = "c")]
    Coach(CoachArgs),
    /// List completed sessions
    #[command(alias = "h")]
    History(HistoryArgs),
    /// Runner profile and VMA
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Shoe mileage tracking
    Gear {
        #[command(subcommand)]
        command: GearCommands,
    },
    /// Start the MCP server
    Serve,
}

// ============================================================================
// Program
// ============================================================================

/// Show one week of the program
#[derive(ClapArgs)]
pub struct WeekArgs {
    #[arg(help = "1-based week position in the program")]
    pub week: usize,
}

impl From<WeekArgs> for WeekRef {
    fn from(val: WeekArgs) -> Self {
        WeekRef { week: val.week }
    }
}

/// Import a program from a JSON file
#[derive(ClapArgs)]
pub struct ImportArgs {
    #[arg(help = "JSON file holding a program (an export, or raw model output)")]
    pub file: PathBuf,
}

/// Delete the current program
#[derive(ClapArgs)]
pub struct ClearArgs {
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Subcommand)]
pub enum ProgramCommands {
    /// Show the whole program
    Show,
    /// Show one week
    #[command(alias = "w")]
    Week(WeekArgs),
    /// Show the program summary
    Summary,
    /// Replace the program with one read from a JSON file
    Import(ImportArgs),
    /// Print the program as JSON
    Export,
    /// Delete the program
    #[command(aliases = ["rm"])]
    Clear(ClearArgs),
}

// ============================================================================
// Sessions
// ============================================================================

/// Show one session
#[derive(ClapArgs)]
pub struct ShowSessionArgs {
    #[arg(help = "1-based week position in the program")]
    pub week: usize,
    #[arg(help = "Session id, e.g. w0-s3")]
    pub session_id: String,
}

impl From<ShowSessionArgs> for SessionRef {
    fn from(val: ShowSessionArgs) -> Self {
        SessionRef {
            week: val.week,
            session_id: val.session_id,
        }
    }
}

/// Toggle a session between done and to do
///
/// RPE and feedback are recorded when the session becomes done.
#[derive(ClapArgs)]
pub struct ToggleArgs {
    #[arg(help = "1-based week position in the program")]
    pub week: usize,
    #[arg(help = "Session id, e.g. w0-s3")]
    pub session_id: String,
    #[arg(
        long,
        value_parser = clap::value_parser!(u8).range(1..=10),
        help = "Rate of perceived exertion, 1 to 10"
    )]
    pub rpe: Option<u8>,
    #[arg(short, long, help = "How the session felt")]
    pub feedback: Option<String>,
}

impl From<ToggleArgs> for ToggleSession {
    fn from(val: ToggleArgs) -> Self {
        ToggleSession {
            week: val.week,
            session_id: val.session_id,
            rpe: val.rpe,
            feedback: val.feedback,
        }
    }
}

/// Compute the training load of a session
#[derive(ClapArgs)]
pub struct LoadArgs {
    #[arg(help = "1-based week position in the program")]
    pub week: usize,
    #[arg(help = "Session id, e.g. w0-s3")]
    pub session_id: String,
    #[arg(
        long,
        value_parser = clap::value_parser!(u8).range(1..=10),
        help = "RPE to use instead of the recorded one"
    )]
    pub rpe: Option<u8>,
}

impl From<LoadArgs> for TrainingLoad {
    fn from(val: LoadArgs) -> Self {
        TrainingLoad {
            week: val.week,
            session_id: val.session_id,
            rpe: val.rpe,
        }
    }
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Show one session
    Show(ShowSessionArgs),
    /// Mark a session done, or back to do
    #[command(alias = "t")]
    Toggle(ToggleArgs),
    /// Training load (duration x RPE)
    Load(LoadArgs),
}

// ============================================================================
// Generation and coach
// ============================================================================

/// Kind of reference performance
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PerfKindArg {
    /// Maximal aerobic speed (km/h)
    Vma,
    /// Maximal heart rate (bpm)
    Fcm,
}

impl From<PerfKindArg> for PerfKind {
    fn from(val: PerfKindArg) -> Self {
        match val {
            PerfKindArg::Vma => PerfKind::Vma,
            PerfKindArg::Fcm => PerfKind::Fcm,
        }
    }
}

/// Generate a training program
///
/// Every answer is passed to the model as typed. The new program replaces
/// the current one only when generation succeeds.
#[derive(ClapArgs)]
pub struct GenerateArgs {
    #[arg(long, default_value = "")]
    pub age: String,
    #[arg(long, default_value = "Homme")]
    pub sex: String,
    #[arg(long, default_value = "Intermédiaire")]
    pub level: String,
    #[arg(long, value_enum, default_value_t = PerfKindArg::Vma)]
    pub perf_kind: PerfKindArg,
    #[arg(long, default_value = "", help = "Reference value, e.g. 14.5 or 190")]
    pub perf_value: String,
    #[arg(long, default_value = "10 km")]
    pub goal_distance: String,
    #[arg(long, help = "Target time, e.g. 45:00")]
    pub goal_time: Option<String>,
    #[arg(long, default_value = "3 séances")]
    pub sessions_per_week: String,
    #[arg(
        long,
        default_value_t = 8,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Program length in weeks"
    )]
    pub weeks: u32,
    #[arg(long)]
    pub unavailability: Option<String>,
    #[arg(long)]
    pub injuries: Option<String>,
}

impl From<GenerateArgs> for IntakeForm {
    fn from(val: GenerateArgs) -> Self {
        IntakeForm {
            age: val.age,
            sex: val.sex,
            level: val.level,
            perf_kind: val.perf_kind.into(),
            perf_value: val.perf_value,
            goal_distance: val.goal_distance,
            goal_time: val.goal_time,
            sessions_per_week: val.sessions_per_week,
            duration_weeks: val.weeks,
            unavailability: val.unavailability,
            injuries: val.injuries,
        }
    }
}

/// Talk to the coach
///
/// With a message, sends it and prints the answer. Without one, starts an
/// interactive conversation (type `exit` to leave).
#[derive(ClapArgs)]
pub struct CoachArgs {
    #[arg(help = "Message to send")]
    pub message: Option<String>,
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "1-based week the coach works on"
    )]
    pub week: u64,
    #[arg(long, help = "Forget the conversation and start over")]
    pub reset: bool,
    #[arg(
        long,
        help = "Apply week rewrites exactly as received, dropping completion history"
    )]
    pub replace: bool,
}

impl CoachArgs {
    pub fn week_index(&self) -> usize {
        self.week.saturating_sub(1) as usize
    }

    pub fn policy(&self) -> MergePolicy {
        if self.replace {
            MergePolicy::Replace
        } else {
            MergePolicy::Reconcile
        }
    }
}

/// List completed sessions, newest first
#[derive(ClapArgs)]
pub struct HistoryArgs {
    #[arg(long, help = "Only running sessions (run, interval, long)")]
    pub runs_only: bool,
}

impl From<HistoryArgs> for History {
    fn from(val: HistoryArgs) -> Self {
        History {
            runs_only: val.runs_only,
        }
    }
}

// ============================================================================
// Profile and gear
// ============================================================================

/// Update the runner profile
#[derive(ClapArgs)]
pub struct SetProfileArgs {
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub level: Option<String>,
    #[arg(long, help = "Maximal aerobic speed in km/h")]
    pub vma: Option<f64>,
}

impl From<SetProfileArgs> for UpdateProfile {
    fn from(val: SetProfileArgs) -> Self {
        UpdateProfile {
            name: val.name,
            level: val.level,
            vma: val.vma,
        }
    }
}

/// Estimate VMA from a race result
#[derive(ClapArgs)]
pub struct EstimateVmaArgs {
    #[arg(help = "Race distance in km")]
    pub distance_km: f64,
    #[arg(help = "Finishing time: hh:mm:ss, mm:ss or mm")]
    pub time: String,
    #[arg(long, help = "Store the estimate in the profile")]
    pub save: bool,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show the profile
    Show,
    /// Update profile fields
    Set(SetProfileArgs),
    /// Estimate VMA from a race
    EstimateVma(EstimateVmaArgs),
}

/// Add a pair of shoes
#[derive(ClapArgs)]
pub struct AddShoeArgs {
    pub brand: String,
    pub model: String,
    #[arg(long, help = "Kilometres before retirement (default 800)")]
    pub max_distance: Option<f64>,
}

impl From<AddShoeArgs> for AddShoe {
    fn from(val: AddShoeArgs) -> Self {
        AddShoe {
            brand: val.brand,
            model: val.model,
            max_distance: val.max_distance,
        }
    }
}

/// Add kilometres to a pair of shoes
#[derive(ClapArgs)]
pub struct LogShoeArgs {
    pub id: String,
    pub km: f64,
}

impl From<LogShoeArgs> for LogShoeDistance {
    fn from(val: LogShoeArgs) -> Self {
        LogShoeDistance {
            id: val.id,
            km: val.km,
        }
    }
}

#[derive(Subcommand)]
pub enum GearCommands {
    /// List shoes
    #[command(alias = "ls")]
    List,
    /// Add a pair
    Add(AddShoeArgs),
    /// Remove a pair
    #[command(alias = "rm")]
    Remove {
        id: String,
    },
    /// Add kilometres to a pair
    Log(LogShoeArgs),
}
