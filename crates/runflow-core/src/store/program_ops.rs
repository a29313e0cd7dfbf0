//! Program operations for the ProgramStore.

use jiff::Timestamp;
use log::{debug, info, warn};
use serde_json::Value;

use super::{ProgramStore, StoreEvent, Versioned};
use crate::{
    db::{Database, PROGRAM_KEY},
    error::{Result, RunflowError},
    models::{ProgramDocument, ProgramSummary, Session},
    params::ToggleSession,
    reconcile::{merge_sessions, MergeOutcome, MergePolicy},
    validate,
};

/// Outcome of a week rewrite.
#[derive(Debug, Clone)]
pub struct WeekUpdate {
    /// 0-based index of the rewritten week
    pub week_index: usize,
    pub week_number: u32,
    pub merge: MergeOutcome,
    /// Program version after the write
    pub version: u64,
}

/// Read and parse the program, treating unreadable documents as absent.
fn read_program(db: &Database) -> Result<Option<Versioned<ProgramDocument>>> {
    let Some(stored) = db.get_document(PROGRAM_KEY)? else {
        return Ok(None);
    };
    let Some(body) = stored.body else {
        return Ok(None);
    };

    match serde_json::from_str::<ProgramDocument>(&body) {
        Ok(value) => Ok(Some(Versioned {
            value,
            version: stored.version,
        })),
        Err(e) => {
            warn!("Stored program is unreadable, treating it as absent: {e}");
            Ok(None)
        }
    }
}

/// Apply `mutate` to the stored program and write it back with
/// compare-and-set, all on one connection.
fn update_program<T>(
    db: &mut Database,
    mutate: impl FnOnce(&mut ProgramDocument) -> Result<T>,
) -> Result<(T, u64)> {
    let Versioned {
        value: mut program,
        version,
    } = read_program(db)?.ok_or(RunflowError::ProgramNotFound)?;

    let result = mutate(&mut program)?;
    let body = serde_json::to_string(&program)?;
    let version = db.put_document_if_version(PROGRAM_KEY, &body, version)?;
    Ok((result, version))
}

impl ProgramStore {
    /// Loads the current program, or `None` when there is none or it cannot
    /// be read.
    pub async fn load(&self) -> Result<Option<ProgramDocument>> {
        Ok(self.load_versioned().await?.map(|v| v.value))
    }

    /// Loads the current program together with its version.
    pub async fn load_versioned(&self) -> Result<Option<Versioned<ProgramDocument>>> {
        self.with_db(|db| read_program(db)).await
    }

    /// Persists the full program and notifies subscribers.
    pub async fn save(&self, program: &ProgramDocument) -> Result<u64> {
        let body = serde_json::to_string(program)?;

        let version = self
            .with_db(move |db| db.put_document(PROGRAM_KEY, &body))
            .await?;

        info!("Saved program ({} weeks, version {version})", program.weeks.len());
        self.notify(StoreEvent::ProgramChanged { version });
        Ok(version)
    }

    /// Persists the program only if the stored version is still `expected`.
    ///
    /// # Errors
    ///
    /// Returns `RunflowError::VersionConflict` when another writer saved first.
    pub async fn save_if_version(&self, program: &ProgramDocument, expected: u64) -> Result<u64> {
        let body = serde_json::to_string(program)?;

        let version = self
            .with_db(move |db| db.put_document_if_version(PROGRAM_KEY, &body, expected))
            .await?;

        self.notify(StoreEvent::ProgramChanged { version });
        Ok(version)
    }

    /// Validates a JSON program (e.g. an export of the web app) and saves it.
    pub async fn import_program(&self, json: &str) -> Result<ProgramDocument> {
        let value: Value = serde_json::from_str(validate::strip_code_fences(json))?;

        let created_at = value
            .get("createdAt")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<Timestamp>().ok())
            .unwrap_or_else(Timestamp::now);

        let program = validate::program_from_value(&value, created_at)?;
        self.save(&program).await?;
        Ok(program)
    }

    /// Deletes the current program.
    pub async fn clear_program(&self) -> Result<bool> {
        let cleared = self
            .with_db(|db| db.clear_document(PROGRAM_KEY))
            .await?
            .is_some();

        if cleared {
            info!("Cleared program");
            self.notify(StoreEvent::ProgramCleared);
        }
        Ok(cleared)
    }

    /// Flips a session's completion.
    ///
    /// When the session becomes complete, the supplied RPE and feedback are
    /// attached. Marking it incomplete again leaves them in place.
    pub async fn toggle_completion(&self, params: &ToggleSession) -> Result<Session> {
        let week_index = params.validate()?;
        let session_id = params.session_id.clone();
        let rpe = params.rpe;
        let feedback = params.feedback.clone();

        let (session, version) = self
            .with_db(move |db| {
                update_program(db, |program| {
                    let week = program.weeks.get_mut(week_index).ok_or_else(|| {
                        RunflowError::WeekNotFound {
                            week: (week_index + 1).to_string(),
                        }
                    })?;
                    let session = week.session_mut(&session_id).ok_or_else(|| {
                        RunflowError::SessionNotFound {
                            week_index,
                            id: session_id.clone(),
                        }
                    })?;

                    let completing = !session.is_completed();
                    session.completed = Some(completing);
                    if completing {
                        if rpe.is_some() {
                            session.rpe = rpe;
                        }
                        if feedback.is_some() {
                            session.feedback = feedback;
                        }
                    }
                    Ok(session.clone())
                })
            })
            .await?;

        debug!(
            "Session {} is now {}",
            session.id,
            if session.is_completed() { "complete" } else { "pending" }
        );
        self.notify(StoreEvent::ProgramChanged { version });
        Ok(session)
    }

    /// Replaces the sessions of one week.
    ///
    /// The week is found by `week_number`; when no week carries that number
    /// (or none was given) the week at `fallback_index` is used. Missing ids
    /// are assigned and every other week is left untouched.
    pub async fn replace_week_sessions(
        &self,
        week_number: Option<u32>,
        fallback_index: usize,
        sessions: Vec<Session>,
        policy: MergePolicy,
    ) -> Result<WeekUpdate> {
        let (update, version) = self
            .with_db(move |db| {
                update_program(db, |program| {
                    let week_index = week_number
                        .and_then(|n| program.week_index_by_number(n))
                        .or_else(|| {
                            if let Some(n) = week_number {
                                warn!("No week numbered {n}, using week index {fallback_index}");
                            }
                            (fallback_index < program.weeks.len()).then_some(fallback_index)
                        })
                        .ok_or_else(|| RunflowError::WeekNotFound {
                            week: week_number
                                .map(|n| n.to_string())
                                .unwrap_or_else(|| (fallback_index + 1).to_string()),
                        })?;

                    let mut merge =
                        merge_sessions(&program.weeks[week_index].sessions, sessions, policy);
                    program.weeks[week_index].sessions = std::mem::take(&mut merge.sessions);
                    program.assign_week_ids(week_index);
                    merge.sessions = program.weeks[week_index].sessions.clone();

                    Ok(WeekUpdate {
                        week_index,
                        week_number: program.weeks[week_index].week_number,
                        merge,
                        version: 0,
                    })
                })
            })
            .await?;

        info!(
            "Rewrote week {} ({} sessions, version {version})",
            update.week_number,
            update.merge.sessions.len()
        );
        self.notify(StoreEvent::ProgramChanged { version });
        Ok(WeekUpdate { version, ..update })
    }

    /// Summary of the current program.
    pub async fn summary(&self) -> Result<ProgramSummary> {
        let program = self.load().await?.ok_or(RunflowError::ProgramNotFound)?;
        Ok(ProgramSummary::from(&program))
    }
}
