//! Store operations that return display wrappers, shared by the CLI and the
//! MCP server.

use log::warn;

use super::{ProgramStore, WeekUpdate};
use crate::{
    display::{self, Dashboard, LoadReport, UpdateResult, VmaEstimate, WeekView},
    error::{Result, RunflowError},
    metrics::{self, HistoryFilter},
    models::{week::DAYS_PER_WEEK, ProgramSummary, Session, UserProfile},
    params::{self, SessionRef, ToggleSession, TrainingLoad, UpdateWeekSchedule, WeekRef},
    reconcile::MergePolicy,
};

impl ProgramStore {
    /// Handle the landing view.
    ///
    /// The current week is the one holding the first session not yet
    /// completed, or the last week once everything is done.
    pub async fn dashboard(&self) -> Result<Dashboard> {
        let profile = self.load_profile().await?;
        let program = self.load().await?;

        let (summary, next_session, current_week) = match &program {
            Some(program) => {
                let next = program
                    .weeks
                    .iter()
                    .enumerate()
                    .find_map(|(i, w)| {
                        w.sessions
                            .iter()
                            .find(|s| !s.is_completed())
                            .map(|s| (i, s.clone()))
                    });
                let week_index = next
                    .as_ref()
                    .map(|(i, _)| *i)
                    .unwrap_or_else(|| program.weeks.len().saturating_sub(1));
                (
                    Some(ProgramSummary::from(program)),
                    next.map(|(_, s)| s),
                    program.weeks.get(week_index).cloned(),
                )
            }
            None => (None, None, None),
        };

        Ok(Dashboard {
            name: profile.display_name().to_string(),
            summary,
            next_session,
            current_week,
        })
    }

    /// Handle showing one week.
    pub async fn show_week(&self, params: &WeekRef) -> Result<WeekView> {
        let index = params.index()?;
        let program = self.load().await?.ok_or(RunflowError::ProgramNotFound)?;
        let total_weeks = program.weeks.len();

        let week = program
            .weeks
            .into_iter()
            .nth(index)
            .ok_or_else(|| RunflowError::WeekNotFound {
                week: params.week.to_string(),
            })?;

        Ok(WeekView {
            position: params.week,
            total_weeks,
            week,
        })
    }

    /// Handle showing one session.
    pub async fn show_session(&self, params: &SessionRef) -> Result<Session> {
        let index = params.index()?;
        let program = self.load().await?.ok_or(RunflowError::ProgramNotFound)?;
        let week = program
            .week(index)
            .ok_or_else(|| RunflowError::WeekNotFound {
                week: params.week.to_string(),
            })?;

        week.session(&params.session_id)
            .cloned()
            .ok_or_else(|| RunflowError::SessionNotFound {
                week_index: index,
                id: params.session_id.clone(),
            })
    }

    /// Handle toggling a session, describing what changed.
    pub async fn toggle_session_result(
        &self,
        params: &ToggleSession,
    ) -> Result<UpdateResult<Session>> {
        let session = self.toggle_completion(params).await?;

        let mut changes = Vec::new();
        if session.is_completed() {
            changes.push("Séance validée".to_string());
            if let Some(rpe) = params.rpe {
                changes.push(format!("RPE {rpe}/10"));
            }
            if params.feedback.is_some() {
                changes.push("Ressenti enregistré".to_string());
            }
        } else {
            changes.push("Séance marquée à faire".to_string());
        }

        Ok(UpdateResult::with_changes(session, changes))
    }

    /// Handle computing a session's training load.
    ///
    /// Uses the RPE given in `params`, or the one recorded on the session.
    pub async fn training_load(&self, params: &TrainingLoad) -> Result<LoadReport> {
        let session = self
            .show_session(&SessionRef {
                week: params.week,
                session_id: params.session_id.clone(),
            })
            .await?;

        let rpe = params
            .rpe
            .or(session.rpe)
            .ok_or_else(|| {
                RunflowError::invalid_input("rpe")
                    .with_reason("The session has no recorded RPE; pass one explicitly")
            })?;
        if !(1..=10).contains(&rpe) {
            return Err(RunflowError::invalid_input("rpe")
                .with_reason(format!("RPE must be between 1 and 10, got {rpe}")));
        }

        let minutes = session
            .duration
            .as_deref()
            .map(metrics::duration_minutes)
            .unwrap_or(0);
        let load = metrics::training_load(session.duration.as_deref(), rpe);

        Ok(LoadReport {
            session,
            rpe,
            minutes,
            load,
        })
    }

    /// Handle the completed-sessions history.
    pub async fn history(&self, params: &params::History) -> Result<display::History> {
        let Some(program) = self.load().await? else {
            return Ok(display::History::new(Vec::new(), 0, 0.0));
        };

        let filter = if params.runs_only {
            HistoryFilter::RunsOnly
        } else {
            HistoryFilter::All
        };

        let sessions = metrics::completed_sessions(&program, filter)
            .into_iter()
            .cloned()
            .collect();

        Ok(display::History::new(
            sessions,
            program.completed_sessions().count(),
            metrics::total_distance(program.sessions()),
        ))
    }

    /// Handle a direct week rewrite (same contract as the coach tool).
    pub async fn update_week_schedule(&self, params: &UpdateWeekSchedule) -> Result<WeekUpdate> {
        if params.sessions.is_empty() {
            return Err(RunflowError::invalid_input("sessions")
                .with_reason("A week needs at least one session"));
        }
        if params.sessions.len() != DAYS_PER_WEEK {
            warn!(
                "Week rewrite carries {} sessions instead of {DAYS_PER_WEEK}",
                params.sessions.len()
            );
        }
        if let Some(bad) = params.sessions.iter().find_map(|s| s.rpe.filter(|r| !(1..=10).contains(r))) {
            return Err(RunflowError::invalid_input("rpe")
                .with_reason(format!("RPE must be between 1 and 10, got {bad}")));
        }

        let policy = if params.replace {
            MergePolicy::Replace
        } else {
            MergePolicy::Reconcile
        };
        let fallback_index = (params.week_number as usize).saturating_sub(1);

        self.replace_week_sessions(
            Some(params.week_number),
            fallback_index,
            params.sessions.clone(),
            policy,
        )
        .await
    }

    /// Handle estimating VMA from a race, optionally saving it to the profile.
    pub async fn estimate_vma(&self, distance_km: f64, time: &str, save: bool) -> Result<VmaEstimate> {
        let vma = metrics::estimate_vma(distance_km, time).ok_or_else(|| {
            RunflowError::invalid_input("time")
                .with_reason("Expected a positive distance and a time like hh:mm:ss, mm:ss or mm")
        })?;

        if save {
            // Stored with one decimal, as displayed
            let rounded = (vma * 10.0).round() / 10.0;
            let profile = self.load_profile().await?;
            self.save_profile(&UserProfile {
                vma: Some(rounded),
                ..profile
            })
            .await?;
        }

        Ok(VmaEstimate {
            distance_km,
            time: time.to_string(),
            vma,
            saved: save,
        })
    }
}
