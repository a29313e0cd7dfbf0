//! Program document definition and related functionality.

use std::collections::HashSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Session, WeeklyPlan};

/// The canonical training program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDocument {
    /// Target race, e.g. "10 km en 45:00"
    #[serde(default)]
    pub goal: String,

    /// Runner level at creation time
    #[serde(default)]
    pub level: String,

    /// Timestamp when the program was generated (UTC)
    pub created_at: Timestamp,

    /// Weeks in calendar order
    #[serde(default)]
    pub weeks: Vec<WeeklyPlan>,
}

impl ProgramDocument {
    /// Week at the given 0-based position.
    pub fn week(&self, index: usize) -> Option<&WeeklyPlan> {
        self.weeks.get(index)
    }

    /// Position of the week carrying the given week number.
    pub fn week_index_by_number(&self, week_number: u32) -> Option<usize> {
        self.weeks.iter().position(|w| w.week_number == week_number)
    }

    /// All sessions, in program order.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.weeks.iter().flat_map(|w| w.sessions.iter())
    }

    /// Completed sessions, in program order.
    pub fn completed_sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions().filter(|s| s.is_completed())
    }

    /// Total number of sessions across all weeks.
    pub fn session_count(&self) -> usize {
        self.weeks.iter().map(|w| w.sessions.len()).sum()
    }

    /// Assign `w{week}-s{session}` ids to sessions that have none, and
    /// suffix duplicated ids so that every id is unique in the program.
    ///
    /// Returns the number of ids that were assigned or rewritten.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jiff::Timestamp;
    /// use runflow_core::models::{ProgramDocument, Session, SessionType, WeeklyPlan};
    ///
    /// let mut program = ProgramDocument {
    ///     goal: "10 km".to_string(),
    ///     level: "Débutant".to_string(),
    ///     created_at: Timestamp::UNIX_EPOCH,
    ///     weeks: vec![WeeklyPlan {
    ///         week_number: 1,
    ///         dates: "Semaine 1".to_string(),
    ///         sessions: vec![Session::new("", "LUN 1", SessionType::Rest, "Repos")],
    ///     }],
    /// };
    ///
    /// assert_eq!(program.assign_missing_ids(), 1);
    /// assert_eq!(program.weeks[0].sessions[0].id, "w0-s0");
    /// ```
    pub fn assign_missing_ids(&mut self) -> usize {
        let mut seen: HashSet<String> = HashSet::new();
        let mut changed = 0;

        for (week_index, week) in self.weeks.iter_mut().enumerate() {
            for (session_index, session) in week.sessions.iter_mut().enumerate() {
                if session.id.trim().is_empty() {
                    session.id = format!("w{week_index}-s{session_index}");
                    changed += 1;
                }
                if !seen.insert(session.id.clone()) {
                    session.id = unique_id(&session.id, &seen);
                    seen.insert(session.id.clone());
                    changed += 1;
                }
            }
        }

        changed
    }

    /// Assign ids within one week only, treating every other week's ids as
    /// taken. Sessions outside the week are never touched.
    pub fn assign_week_ids(&mut self, week_index: usize) -> usize {
        let mut seen: HashSet<String> = self
            .weeks
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != week_index)
            .flat_map(|(_, w)| w.sessions.iter().map(|s| s.id.clone()))
            .collect();

        let Some(week) = self.weeks.get_mut(week_index) else {
            return 0;
        };

        let mut changed = 0;
        for (session_index, session) in week.sessions.iter_mut().enumerate() {
            if session.id.trim().is_empty() {
                session.id = format!("w{week_index}-s{session_index}");
                changed += 1;
            }
            if !seen.insert(session.id.clone()) {
                session.id = unique_id(&session.id, &seen);
                seen.insert(session.id.clone());
                changed += 1;
            }
        }
        changed
    }
}

fn unique_id(base: &str, taken: &HashSet<String>) -> String {
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProgramSummary, SessionType};

    fn session(id: &str) -> Session {
        Session::new(id, "LUN 1", SessionType::Run, "Footing")
    }

    fn program(weeks: Vec<Vec<Session>>) -> ProgramDocument {
        ProgramDocument {
            goal: "10 km".to_string(),
            level: "Intermédiaire".to_string(),
            created_at: Timestamp::from_second(1_700_000_000).unwrap(),
            weeks: weeks
                .into_iter()
                .enumerate()
                .map(|(i, sessions)| WeeklyPlan {
                    week_number: i as u32 + 1,
                    dates: format!("Semaine {}", i + 1),
                    sessions,
                })
                .collect(),
        }
    }

    #[test]
    fn test_assign_missing_ids_uses_position() {
        let mut doc = program(vec![
            vec![session(""), session("keep")],
            vec![session(""), session(""), session("")],
        ]);

        assert_eq!(doc.assign_missing_ids(), 4);
        assert_eq!(doc.weeks[0].sessions[0].id, "w0-s0");
        assert_eq!(doc.weeks[0].sessions[1].id, "keep");
        assert_eq!(doc.weeks[1].sessions[2].id, "w1-s2");
    }

    #[test]
    fn test_assign_missing_ids_deduplicates() {
        let mut doc = program(vec![vec![session("a"), session("a")], vec![session("a")]]);

        doc.assign_missing_ids();
        let ids: Vec<_> = doc.sessions().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a-2", "a-3"]);
    }

    #[test]
    fn test_assign_week_ids_leaves_other_weeks() {
        let mut doc = program(vec![
            vec![session("x")],
            vec![session(""), session("x")],
        ]);

        assert_eq!(doc.assign_week_ids(1), 2);
        assert_eq!(doc.weeks[0].sessions[0].id, "x");
        assert_eq!(doc.weeks[1].sessions[0].id, "w1-s0");
        assert_eq!(doc.weeks[1].sessions[1].id, "x-2");
    }

    #[test]
    fn test_huge_loads_saturate() {
        let heavy = |id: &str| {
            let mut s = session(id);
            s.duration = Some("99999999h".to_string());
            s.completed = Some(true);
            s.rpe = Some(9);
            s
        };
        let doc = program(vec![
            vec![heavy("a"), heavy("b")],
            vec![heavy("c")],
        ]);

        assert_eq!(doc.weeks[0].training_load(), u32::MAX);
        assert_eq!(ProgramSummary::from(&doc).total_load, u32::MAX);
    }

    #[test]
    fn test_week_lookup_by_number() {
        let mut doc = program(vec![vec![], vec![], vec![]]);
        doc.weeks[2].week_number = 9;

        assert_eq!(doc.week_index_by_number(2), Some(1));
        assert_eq!(doc.week_index_by_number(9), Some(2));
        assert_eq!(doc.week_index_by_number(3), None);
    }

    #[test]
    fn test_deserializes_web_app_document() {
        let json = r#"{
            "goal": "Semi-marathon",
            "level": "Avancé",
            "createdAt": "2024-09-05T08:30:00.000Z",
            "weeks": [{
                "weekNumber": 1,
                "dates": "5 Sept - 11 Sept",
                "sessions": [{
                    "id": "w0-s0",
                    "day": "LUN 5",
                    "type": "interval",
                    "title": "VMA courte",
                    "description": "10 x 400m",
                    "duration": "1h",
                    "details": {"warmup": "20min", "main": "10x400", "cooldown": ""},
                    "completed": true,
                    "rpe": 8,
                    "feedback": "Dur"
                }]
            }]
        }"#;

        let doc: ProgramDocument = serde_json::from_str(json).unwrap();
        let s = &doc.weeks[0].sessions[0];
        assert_eq!(s.kind, SessionType::Interval);
        assert!(s.is_completed());
        assert_eq!(s.rpe, Some(8));
        assert_eq!(doc.completed_sessions().count(), 1);

        let round = serde_json::to_value(&doc).unwrap();
        assert_eq!(round["weeks"][0]["sessions"][0]["type"], "interval");
        assert_eq!(round["weeks"][0]["weekNumber"], 1);
    }
}
