//! Program summary types and functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ProgramDocument, WeeklyPlan};

/// Summary information about a program with session statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramSummary {
    pub goal: String,
    pub level: String,
    pub created_at: Timestamp,
    /// Number of weeks
    pub total_weeks: u32,
    /// Number of sessions, rest days included
    pub total_sessions: u32,
    /// Number of completed sessions
    pub completed_sessions: u32,
    /// Rounded completion percentage
    pub progress_percent: u32,
    /// Summed training load of completed sessions
    pub total_load: u32,
}

impl From<&ProgramDocument> for ProgramSummary {
    fn from(program: &ProgramDocument) -> Self {
        Self {
            goal: program.goal.clone(),
            level: program.level.clone(),
            created_at: program.created_at,
            total_weeks: program.weeks.len() as u32,
            total_sessions: program.session_count() as u32,
            completed_sessions: program.completed_sessions().count() as u32,
            progress_percent: crate::metrics::program_progress(program),
            total_load: program
                .weeks
                .iter()
                .map(WeeklyPlan::training_load)
                .fold(0, u32::saturating_add),
        }
    }
}
