//! Conversion of model output into typed documents.
//!
//! The language model answers with JSON that usually, but not always, matches
//! the declared schema. Nothing it returns is trusted: values are walked as
//! [`serde_json::Value`] and turned into [`ProgramDocument`] / [`Session`]
//! values, repairing what can be repaired and rejecting the rest with
//! [`RunflowError::InvalidModelOutput`] naming the offending path.

use jiff::Timestamp;
use log::warn;
use serde_json::{Map, Value};

use crate::error::{Result, RunflowError};
use crate::models::week::DAYS_PER_WEEK;
use crate::models::{ProgramDocument, Session, SessionDetails, SessionType, WeeklyPlan};

const DEFAULT_REASON: &str = "Semaine mise à jour";

/// Arguments of an `update_week_schedule` call after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekRewrite {
    /// Week number named by the model, if it gave a readable one
    pub week_number: Option<u32>,
    pub reason: String,
    /// Replacement sessions; ids may be empty
    pub sessions: Vec<Session>,
}

/// Remove a surrounding Markdown code fence (```` ```json ```` or ```` ``` ````).
///
/// # Examples
///
/// ```rust
/// use runflow_core::validate::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
/// assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
/// ```
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse the text of a generation response into a program.
pub fn program_from_model_text(text: &str, created_at: Timestamp) -> Result<ProgramDocument> {
    let value: Value = serde_json::from_str(strip_code_fences(text)).map_err(|e| {
        RunflowError::invalid_output("$", format!("response is not valid JSON: {e}"))
    })?;
    program_from_value(&value, created_at)
}

/// Validate a generated program document.
pub fn program_from_value(value: &Value, created_at: Timestamp) -> Result<ProgramDocument> {
    let root = value
        .as_object()
        .ok_or_else(|| RunflowError::invalid_output("$", "expected an object"))?;

    let weeks = match root.get("weeks") {
        Some(Value::Array(weeks)) if !weeks.is_empty() => weeks,
        Some(Value::Array(_)) => return Err(RunflowError::invalid_output("weeks", "no weeks")),
        _ => return Err(RunflowError::invalid_output("weeks", "missing weeks array")),
    };

    let weeks = weeks
        .iter()
        .enumerate()
        .map(|(index, week)| week_from_value(week, index))
        .collect::<Result<Vec<_>>>()?;

    let mut program = ProgramDocument {
        goal: string_field(root, "goal").unwrap_or_default(),
        level: string_field(root, "level").unwrap_or_default(),
        created_at,
        weeks,
    };

    let repaired = program.assign_missing_ids();
    if repaired > 0 {
        warn!("Assigned or rewrote {repaired} session ids in generated program");
    }

    Ok(program)
}

fn week_from_value(value: &Value, index: usize) -> Result<WeeklyPlan> {
    let path = format!("weeks[{index}]");
    let week = value
        .as_object()
        .ok_or_else(|| RunflowError::invalid_output(&path, "expected an object"))?;

    let week_number = week
        .get("weekNumber")
        .and_then(number_like)
        .unwrap_or(index as u32 + 1);

    let dates = string_field(week, "dates")
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| format!("Semaine {week_number}"));

    let sessions = match week.get("sessions") {
        Some(Value::Array(items)) => sessions_from_values(items, &path)?,
        _ => {
            warn!("{path}.sessions is missing or not an array; using an empty week");
            Vec::new()
        }
    };

    if !sessions.is_empty() && sessions.len() != DAYS_PER_WEEK {
        warn!(
            "{path} has {} sessions instead of {DAYS_PER_WEEK}",
            sessions.len()
        );
    }

    Ok(WeeklyPlan {
        week_number,
        dates,
        sessions,
    })
}

fn sessions_from_values(items: &[Value], parent: &str) -> Result<Vec<Session>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| session_from_value(item, &format!("{parent}.sessions[{i}]")))
        .collect()
}

/// Validate a single session object.
pub fn session_from_value(value: &Value, path: &str) -> Result<Session> {
    let obj = value
        .as_object()
        .ok_or_else(|| RunflowError::invalid_output(path, "expected an object"))?;

    let kind = match obj.get("type") {
        Some(Value::String(raw)) => raw.parse::<SessionType>().map_err(|_| {
            RunflowError::invalid_output(format!("{path}.type"), format!("unknown type '{raw}'"))
        })?,
        _ => {
            return Err(RunflowError::invalid_output(
                format!("{path}.type"),
                "missing session type",
            ))
        }
    };

    let id = match obj.get("id") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let title = string_field(obj, "title")
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| kind.label().to_string());

    let rpe = match obj.get("rpe") {
        None | Some(Value::Null) => None,
        Some(raw) => {
            let rpe = number_like(raw).filter(|r| (1..=10).contains(r));
            if rpe.is_none() {
                warn!("{path}.rpe out of range ({raw}); dropping it");
            }
            rpe.map(|r| r as u8)
        }
    };

    Ok(Session {
        id,
        day: string_field(obj, "day").unwrap_or_default(),
        date: string_field(obj, "date").filter(|d| !d.is_empty()),
        kind,
        title,
        description: string_field(obj, "description").unwrap_or_default(),
        distance: text_like(obj.get("distance")),
        duration: text_like(obj.get("duration")),
        details: obj.get("details").and_then(Value::as_object).map(|d| SessionDetails {
            warmup: string_field(d, "warmup"),
            main: string_field(d, "main"),
            cooldown: string_field(d, "cooldown"),
        }),
        completed: obj.get("completed").and_then(Value::as_bool),
        rpe,
        feedback: string_field(obj, "feedback"),
    })
}

/// Validate the arguments of an `update_week_schedule` call.
pub fn week_rewrite_from_args(args: &Value) -> Result<WeekRewrite> {
    let obj = args
        .as_object()
        .ok_or_else(|| RunflowError::invalid_output("args", "expected an object"))?;

    let week_number = obj.get("weekNumber").and_then(number_like);
    if week_number.is_none() {
        warn!("update_week_schedule called without a readable weekNumber");
    }

    let sessions = match obj.get("sessions") {
        Some(Value::Array(items)) if !items.is_empty() => sessions_from_values(items, "args")?,
        Some(Value::Array(_)) => {
            return Err(RunflowError::invalid_output("args.sessions", "no sessions"))
        }
        _ => {
            return Err(RunflowError::invalid_output(
                "args.sessions",
                "missing sessions array",
            ))
        }
    };

    if sessions.len() != DAYS_PER_WEEK {
        warn!(
            "Week rewrite carries {} sessions instead of {DAYS_PER_WEEK}",
            sessions.len()
        );
    }

    let reason = string_field(obj, "reason")
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REASON.to_string());

    Ok(WeekRewrite {
        week_number,
        reason,
        sessions,
    })
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Strings as-is, numbers rendered as text.
fn text_like(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-negative integers given as a number or a numeric string.
fn number_like(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ts() -> Timestamp {
        Timestamp::UNIX_EPOCH
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  ```json{\"x\":2}```  "), "{\"x\":2}");
    }

    #[test]
    fn test_program_repairs_missing_fields() {
        let value = json!({
            "goal": "10 km",
            "weeks": [
                {"sessions": [{"type": "run", "distance": 8, "duration": 45}]},
                {"weekNumber": "2", "dates": "", "sessions": "oops"}
            ]
        });

        let program = program_from_value(&value, ts()).unwrap();
        assert_eq!(program.level, "");
        assert_eq!(program.weeks[0].week_number, 1);
        assert_eq!(program.weeks[0].dates, "Semaine 1");

        let s = &program.weeks[0].sessions[0];
        assert_eq!(s.id, "w0-s0");
        assert_eq!(s.title, "Footing");
        assert_eq!(s.distance.as_deref(), Some("8"));
        assert_eq!(s.duration.as_deref(), Some("45"));

        assert_eq!(program.weeks[1].week_number, 2);
        assert_eq!(program.weeks[1].dates, "Semaine 2");
        assert!(program.weeks[1].sessions.is_empty());
    }

    #[test]
    fn test_program_rejects_missing_weeks() {
        let err = program_from_value(&json!({"goal": "10 km"}), ts()).unwrap_err();
        assert!(matches!(err, RunflowError::InvalidModelOutput { .. }));

        let err = program_from_value(&json!({"weeks": []}), ts()).unwrap_err();
        assert!(matches!(err, RunflowError::InvalidModelOutput { .. }));
    }

    #[test]
    fn test_unknown_session_type_is_rejected_with_path() {
        let value = json!({"weeks": [{"weekNumber": 1, "sessions": [
            {"type": "run"}, {"type": "swim"}
        ]}]});

        match program_from_value(&value, ts()).unwrap_err() {
            RunflowError::InvalidModelOutput { path, .. } => {
                assert_eq!(path, "weeks[0].sessions[1].type")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_rpe_is_dropped() {
        let s = session_from_value(&json!({"type": "run", "rpe": 14}), "s").unwrap();
        assert_eq!(s.rpe, None);

        let s = session_from_value(&json!({"type": "run", "rpe": 6}), "s").unwrap();
        assert_eq!(s.rpe, Some(6));
    }

    #[test]
    fn test_program_from_fenced_text() {
        let text = "```json\n{\"goal\":\"Semi\",\"weeks\":[{\"weekNumber\":1,\"dates\":\"S1\",\"sessions\":[]}]}\n```";
        let program = program_from_model_text(text, ts()).unwrap();
        assert_eq!(program.goal, "Semi");
        assert_eq!(program.weeks.len(), 1);

        assert!(program_from_model_text("pas du json", ts()).is_err());
    }

    #[test]
    fn test_week_rewrite_accepts_string_week_number() {
        let args = json!({
            "weekNumber": "3",
            "reason": "Séance déplacée",
            "sessions": [{"id": "w2-s0", "type": "rest", "day": "LUN 1"}]
        });

        let rewrite = week_rewrite_from_args(&args).unwrap();
        assert_eq!(rewrite.week_number, Some(3));
        assert_eq!(rewrite.reason, "Séance déplacée");
        assert_eq!(rewrite.sessions[0].title, "Repos");
    }

    #[test]
    fn test_week_rewrite_rejects_empty_sessions() {
        let args = json!({"weekNumber": 1, "reason": "x", "sessions": []});
        assert!(week_rewrite_from_args(&args).is_err());

        let args = json!({"weekNumber": 1, "reason": "x"});
        assert!(week_rewrite_from_args(&args).is_err());
    }
}
