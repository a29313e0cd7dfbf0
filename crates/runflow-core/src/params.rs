//! Parameter structures for RunFlow operations
//!
//! Shared parameter structures used by every interface (CLI, MCP) without
//! framework-specific derives. Interface layers wrap them:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! CLI argument structs convert with `From`, MCP requests wrap the core type
//! transparently. JSON schemas are only derived with the `schema` feature.
//!
//! Weeks are addressed by their 1-based position in the program, which is
//! what the runner sees in the calendar.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunflowError};
use crate::models::Session;

/// Convert a 1-based week position to an index.
fn week_index(week: usize) -> Result<usize> {
    week.checked_sub(1).ok_or_else(|| {
        RunflowError::invalid_input("week").with_reason("Weeks are numbered from 1")
    })
}

/// Parameters for operations on one week.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct WeekRef {
    /// 1-based position of the week in the program
    pub week: usize,
}

impl WeekRef {
    /// 0-based index of the week.
    pub fn index(&self) -> Result<usize> {
        week_index(self.week)
    }
}

/// Parameters addressing a single session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SessionRef {
    /// 1-based position of the week in the program
    pub week: usize,
    /// Session id, e.g. "w0-s3"
    pub session_id: String,
}

impl SessionRef {
    pub fn index(&self) -> Result<usize> {
        week_index(self.week)
    }
}

/// Parameters for toggling a session's completion.
///
/// `rpe` and `feedback` are only attached when the session becomes complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ToggleSession {
    /// 1-based position of the week in the program
    pub week: usize,
    /// Session id, e.g. "w0-s3"
    pub session_id: String,
    /// Rate of perceived exertion, 1 to 10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<u8>,
    /// How the session felt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ToggleSession {
    /// Validate the parameters and return the week index.
    ///
    /// # Errors
    ///
    /// * `RunflowError::InvalidInput` - When the week is 0
    /// * `RunflowError::InvalidInput` - When the RPE is outside 1..=10
    ///
    /// # Examples
    ///
    /// ```rust
    /// use runflow_core::params::ToggleSession;
    ///
    /// let params = ToggleSession {
    ///     week: 2,
    ///     session_id: "w1-s0".to_string(),
    ///     rpe: Some(7),
    ///     feedback: None,
    /// };
    /// assert_eq!(params.validate().unwrap(), 1);
    ///
    /// let params = ToggleSession { rpe: Some(11), ..params };
    /// assert!(params.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<usize> {
        if let Some(rpe) = self.rpe {
            if !(1..=10).contains(&rpe) {
                return Err(RunflowError::invalid_input("rpe")
                    .with_reason(format!("RPE must be between 1 and 10, got {rpe}")));
            }
        }
        week_index(self.week)
    }
}

/// Parameters for computing a session's training load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct TrainingLoad {
    /// 1-based position of the week in the program
    pub week: usize,
    /// Session id, e.g. "w0-s3"
    pub session_id: String,
    /// RPE to use instead of the recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<u8>,
}

/// Parameters for the completed-sessions history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct History {
    /// Keep only run, interval and long sessions
    #[serde(default)]
    pub runs_only: bool,
}

/// Parameters for rewriting one week of the program.
///
/// Same contract as the coach's `update_week_schedule` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateWeekSchedule {
    /// Week number to rewrite
    pub week_number: u32,
    /// Short explanation shown to the runner
    pub reason: String,
    /// Full list of the week's sessions, Monday to Sunday
    pub sessions: Vec<Session>,
    /// Replace the sessions as given, dropping completion history
    #[serde(default)]
    pub replace: bool,
}

/// Parameters for updating the runner profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub level: Option<String>,
    /// Maximal aerobic speed in km/h
    pub vma: Option<f64>,
}

/// Parameters for adding a pair of shoes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AddShoe {
    pub brand: String,
    /// Model name
    pub model: String,
    /// Kilometres before retirement, 800 when omitted
    pub max_distance: Option<f64>,
}

/// Parameters for adding kilometres to a pair of shoes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct LogShoeDistance {
    pub id: String,
    pub km: f64,
}
