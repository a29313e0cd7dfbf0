//! Weekly plan model definition and related functionality.

use serde::{Deserialize, Serialize};

use super::Session;

/// Number of sessions a week is expected to hold, one per day.
pub const DAYS_PER_WEEK: usize = 7;

/// One week of the program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlan {
    /// 1-based number shown to the runner
    pub week_number: u32,

    /// Display label, e.g. "5 Sept - 11 Sept"
    #[serde(default)]
    pub dates: String,

    /// Sessions in day order
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl WeeklyPlan {
    /// Find a session by id.
    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Find a session by id for mutation.
    pub fn session_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Number of sessions marked complete.
    pub fn completed_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.is_completed()).count()
    }

    /// Summed training load of the completed sessions.
    pub fn training_load(&self) -> u32 {
        self.sessions
            .iter()
            .filter(|s| s.is_completed())
            .map(Session::training_load)
            .fold(0, u32::saturating_add)
    }
}
