//! Session-id reconciliation for week rewrites.
//!
//! When the coach rewrites a week it sends the complete list of sessions. A
//! blind substitution would lose completion marks and feedback already
//! recorded for that week; reconciliation matches incoming sessions to the
//! existing ones by id and carries that history over.

use std::collections::HashSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::Session;

/// How incoming sessions replace the sessions of a week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Match by id and keep completion history
    #[default]
    Reconcile,
    /// Substitute the sessions exactly as received
    Replace,
}

/// Result of merging a week.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub sessions: Vec<Session>,
    /// Incoming ids that matched an existing session
    pub kept: Vec<String>,
    /// Ids taken from the existing session at the same position
    pub adopted: Vec<String>,
    /// Existing ids absent from the result
    pub dropped: Vec<String>,
}

/// Merge `incoming` into a week currently holding `existing`.
///
/// # Examples
///
/// ```rust
/// use runflow_core::models::{Session, SessionType};
/// use runflow_core::reconcile::{merge_sessions, MergePolicy};
///
/// let mut done = Session::new("w0-s0", "LUN 1", SessionType::Run, "Footing");
/// done.completed = Some(true);
/// done.rpe = Some(6);
///
/// let moved = Session::new("w0-s0", "MAR 2", SessionType::Run, "Footing");
/// let outcome = merge_sessions(&[done], vec![moved], MergePolicy::Reconcile);
///
/// assert_eq!(outcome.sessions[0].day, "MAR 2");
/// assert_eq!(outcome.sessions[0].rpe, Some(6));
/// assert_eq!(outcome.kept, vec!["w0-s0".to_string()]);
/// ```
pub fn merge_sessions(
    existing: &[Session],
    incoming: Vec<Session>,
    policy: MergePolicy,
) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    match policy {
        MergePolicy::Replace => {
            for session in &incoming {
                if existing.iter().any(|e| !session.id.is_empty() && e.id == session.id) {
                    outcome.kept.push(session.id.clone());
                }
            }
            outcome.sessions = incoming;
        }
        MergePolicy::Reconcile => {
            let claimed: HashSet<String> = incoming
                .iter()
                .filter(|s| !s.id.is_empty())
                .map(|s| s.id.clone())
                .collect();

            for (position, mut session) in incoming.into_iter().enumerate() {
                if session.id.is_empty() {
                    if let Some(previous) = existing
                        .get(position)
                        .filter(|p| !p.id.is_empty() && !claimed.contains(&p.id))
                    {
                        session.id = previous.id.clone();
                        carry_history(&mut session, previous);
                        outcome.adopted.push(session.id.clone());
                    }
                } else if let Some(previous) = existing.iter().find(|e| e.id == session.id) {
                    carry_history(&mut session, previous);
                    outcome.kept.push(session.id.clone());
                }
                outcome.sessions.push(session);
            }
        }
    }

    let result_ids: HashSet<&str> = outcome.sessions.iter().map(|s| s.id.as_str()).collect();
    outcome.dropped = existing
        .iter()
        .filter(|e| !result_ids.contains(e.id.as_str()))
        .map(|e| e.id.clone())
        .collect();

    debug!(
        "Merged week ({policy:?}): {} kept, {} adopted, {} dropped",
        outcome.kept.len(),
        outcome.adopted.len(),
        outcome.dropped.len()
    );

    outcome
}

fn carry_history(session: &mut Session, previous: &Session) {
    if session.completed.is_none() {
        session.completed = previous.completed;
    }
    if session.rpe.is_none() {
        session.rpe = previous.rpe;
    }
    if session.feedback.is_none() {
        session.feedback = previous.feedback.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionType;

    fn session(id: &str, day: &str) -> Session {
        Session::new(id, day, SessionType::Run, "Footing")
    }

    fn done(id: &str, day: &str, rpe: u8, feedback: &str) -> Session {
        let mut s = session(id, day);
        s.completed = Some(true);
        s.rpe = Some(rpe);
        s.feedback = Some(feedback.to_string());
        s
    }

    #[test]
    fn test_reconcile_carries_history_by_id() {
        let existing = vec![done("a", "LUN 1", 7, "Bien"), session("b", "MAR 2")];
        let incoming = vec![session("b", "LUN 1"), session("a", "MAR 2")];

        let outcome = merge_sessions(&existing, incoming, MergePolicy::Reconcile);

        assert_eq!(outcome.sessions[1].id, "a");
        assert_eq!(outcome.sessions[1].day, "MAR 2");
        assert!(outcome.sessions[1].is_completed());
        assert_eq!(outcome.sessions[1].feedback.as_deref(), Some("Bien"));
        assert!(!outcome.sessions[0].is_completed());
        assert_eq!(outcome.kept, vec!["b".to_string(), "a".to_string()]);
        assert!(outcome.dropped.is_empty());
    }

    #[test]
    fn test_explicit_incoming_values_win() {
        let existing = vec![done("a", "LUN 1", 7, "Bien")];
        let mut incoming = session("a", "LUN 1");
        incoming.completed = Some(false);

        let outcome = merge_sessions(&existing, vec![incoming], MergePolicy::Reconcile);
        assert_eq!(outcome.sessions[0].completed, Some(false));
        assert_eq!(outcome.sessions[0].rpe, Some(7));
    }

    #[test]
    fn test_missing_id_adopts_position() {
        let existing = vec![done("a", "LUN 1", 5, "Ok"), session("b", "MAR 2")];
        let incoming = vec![session("", "LUN 1"), session("b", "MAR 2")];

        let outcome = merge_sessions(&existing, incoming, MergePolicy::Reconcile);
        assert_eq!(outcome.sessions[0].id, "a");
        assert_eq!(outcome.sessions[0].rpe, Some(5));
        assert_eq!(outcome.adopted, vec!["a".to_string()]);
    }

    #[test]
    fn test_missing_id_does_not_adopt_claimed_id() {
        let existing = vec![session("a", "LUN 1"), session("b", "MAR 2")];
        let incoming = vec![session("", "LUN 1"), session("a", "MAR 2")];

        let outcome = merge_sessions(&existing, incoming, MergePolicy::Reconcile);
        assert_eq!(outcome.sessions[0].id, "");
        assert_eq!(outcome.dropped, vec!["b".to_string()]);
    }

    #[test]
    fn test_replace_discards_history() {
        let existing = vec![done("a", "LUN 1", 7, "Bien"), session("b", "MAR 2")];
        let incoming = vec![session("a", "LUN 1"), session("c", "MAR 2")];

        let outcome = merge_sessions(&existing, incoming, MergePolicy::Replace);
        assert!(!outcome.sessions[0].is_completed());
        assert_eq!(outcome.sessions[0].rpe, None);
        assert_eq!(outcome.kept, vec!["a".to_string()]);
        assert_eq!(outcome.dropped, vec!["b".to_string()]);
    }
}
