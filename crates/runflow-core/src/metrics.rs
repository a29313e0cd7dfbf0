//! Derived running metrics.
//!
//! Everything here is a pure function over strings and documents: training
//! load from a free-form duration, VO2max and its tier, VMA estimation from a
//! race result, the history distance aggregate and program progress.
//!
//! Durations and distances are stored as whatever the model or the runner
//! typed ("45", "1h30", "8 km"), so parsing follows the lenient rules of
//! leading-number extraction. Inputs that cannot be read yield `None` (or 0
//! where a count is expected) and never NaN.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{ProgramDocument, Session};

/// Extract the leading integer of a string, like `parseInt`.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Parse a free-form duration into minutes.
///
/// Whitespace is removed and the text lowercased. A value containing `h` is
/// read as hours and minutes (`"1h30"` is 90); otherwise the leading integer
/// is taken as minutes. Unreadable parts count as zero.
///
/// # Examples
///
/// ```rust
/// use runflow_core::metrics::duration_minutes;
///
/// assert_eq!(duration_minutes("45"), 45);
/// assert_eq!(duration_minutes("1h30"), 90);
/// assert_eq!(duration_minutes("1 H 05"), 65);
/// assert_eq!(duration_minutes("n/a"), 0);
/// ```
pub fn duration_minutes(duration: &str) -> u32 {
    let normalized: String = duration
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    let minutes = match normalized.split_once('h') {
        Some((hours, rest)) => leading_int(hours)
            .unwrap_or(0)
            .saturating_mul(60)
            .saturating_add(leading_int(rest).unwrap_or(0)),
        None => leading_int(&normalized).unwrap_or(0),
    };

    u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
}

/// Training load of a session: duration in minutes times RPE.
pub fn training_load(duration: Option<&str>, rpe: u8) -> u32 {
    let minutes = duration.map(duration_minutes).unwrap_or(0);
    minutes.saturating_mul(u32::from(rpe))
}

/// VO2max (ml/kg/min) estimated from a VMA in km/h.
pub fn vo2max(vma_kmh: f64) -> Option<f64> {
    if !vma_kmh.is_finite() || vma_kmh <= 0.0 {
        return None;
    }
    Some(vma_kmh * 3.5)
}

/// Fitness tier for a VO2max value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vo2Tier {
    Beginner,
    Average,
    Good,
    Excellent,
    Elite,
}

impl Vo2Tier {
    pub fn from_vo2max(vo2max: f64) -> Self {
        if vo2max < 35.0 {
            Vo2Tier::Beginner
        } else if vo2max < 45.0 {
            Vo2Tier::Average
        } else if vo2max < 55.0 {
            Vo2Tier::Good
        } else if vo2max < 65.0 {
            Vo2Tier::Excellent
        } else {
            Vo2Tier::Elite
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Vo2Tier::Beginner => "Débutant",
            Vo2Tier::Average => "Moyen",
            Vo2Tier::Good => "Bon",
            Vo2Tier::Excellent => "Excellent",
            Vo2Tier::Elite => "Élite",
        }
    }
}

impl fmt::Display for Vo2Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse a race time (`hh:mm:ss`, `mm:ss` or `mm`) into hours.
///
/// Each part is read like [`parse_leading_float`], so `"50min"` is 50
/// minutes.
pub fn parse_race_time(time: &str) -> Option<f64> {
    let parts: Vec<f64> = time
        .trim()
        .split(':')
        .map(|p| parse_leading_float(p).filter(|v| v.is_finite()))
        .collect::<Option<Vec<_>>>()?;

    let hours = match parts.as_slice() {
        [h, m, s] => h + m / 60.0 + s / 3600.0,
        [m, s] => m / 60.0 + s / 3600.0,
        [m] => m / 60.0,
        _ => return None,
    };

    Some(hours)
}

/// Coefficient turning race speed into VMA, by race distance.
fn vma_coefficient(distance_km: f64) -> f64 {
    if distance_km <= 5.0 {
        0.95
    } else if distance_km <= 15.0 {
        0.90
    } else if distance_km <= 22.0 {
        0.85
    } else {
        0.80
    }
}

/// Estimate VMA (km/h) from a race distance and finishing time.
///
/// # Examples
///
/// ```rust
/// use runflow_core::metrics::estimate_vma;
///
/// let vma = estimate_vma(10.0, "50:00").unwrap();
/// assert_eq!(format!("{vma:.1}"), "13.3");
/// assert!(estimate_vma(10.0, "0:00").is_none());
/// ```
pub fn estimate_vma(distance_km: f64, time: &str) -> Option<f64> {
    if !distance_km.is_finite() || distance_km <= 0.0 {
        return None;
    }
    let hours = parse_race_time(time)?;
    if hours <= 0.0 {
        return None;
    }

    Some(distance_km / hours / vma_coefficient(distance_km))
}

/// Leading decimal number of a string, like `parseFloat`.
///
/// ```rust
/// use runflow_core::metrics::parse_leading_float;
///
/// assert_eq!(parse_leading_float("5km"), Some(5.0));
/// assert_eq!(parse_leading_float(" 3.5 km"), Some(3.5));
/// assert_eq!(parse_leading_float("km"), None);
/// ```
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    s[..end].trim_end_matches('.').parse::<f64>().ok()
}

/// Summed distance (km) of the completed sessions.
pub fn total_distance<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> f64 {
    sessions
        .into_iter()
        .filter(|s| s.is_completed())
        .filter_map(|s| s.distance.as_deref())
        .filter_map(parse_leading_float)
        .sum()
}

/// Which completed sessions the history shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryFilter {
    #[default]
    All,
    /// Only run, interval and long sessions
    RunsOnly,
}

impl HistoryFilter {
    pub fn matches(&self, session: &Session) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::RunsOnly => session.kind.is_run(),
        }
    }
}

/// Completed sessions, newest first.
pub fn completed_sessions(program: &ProgramDocument, filter: HistoryFilter) -> Vec<&Session> {
    let mut sessions: Vec<&Session> = program
        .completed_sessions()
        .filter(|s| filter.matches(s))
        .collect();
    sessions.reverse();
    sessions
}

/// Rounded percentage of completed sessions.
pub fn program_progress(program: &ProgramDocument) -> u32 {
    let total = program.session_count();
    if total == 0 {
        return 0;
    }
    let done = program.completed_sessions().count();
    (done as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{SessionType, WeeklyPlan};

    fn completed(id: &str, kind: SessionType, distance: Option<&str>) -> Session {
        let mut s = Session::new(id, "LUN 1", kind, kind.label());
        s.completed = Some(true);
        s.distance = distance.map(str::to_string);
        s
    }

    fn program(sessions: Vec<Session>) -> ProgramDocument {
        ProgramDocument {
            goal: "10 km".to_string(),
            level: "Débutant".to_string(),
            created_at: Timestamp::UNIX_EPOCH,
            weeks: vec![WeeklyPlan {
                week_number: 1,
                dates: "Semaine 1".to_string(),
                sessions,
            }],
        }
    }

    #[test]
    fn test_training_load() {
        assert_eq!(training_load(Some("45"), 7), 315);
        assert_eq!(training_load(Some("1h30"), 4), 360);
        assert_eq!(training_load(None, 8), 0);
        assert_eq!(training_load(Some("45 min"), 2), 90);
        assert_eq!(training_load(Some("1h"), 5), 300);
    }

    #[test]
    fn test_vo2max_and_tier() {
        let v = vo2max(14.3).unwrap();
        assert!((v - 50.05).abs() < 1e-9);
        assert_eq!(Vo2Tier::from_vo2max(v), Vo2Tier::Good);
        assert_eq!(Vo2Tier::from_vo2max(v).label(), "Bon");

        assert_eq!(Vo2Tier::from_vo2max(34.9), Vo2Tier::Beginner);
        assert_eq!(Vo2Tier::from_vo2max(45.0), Vo2Tier::Good);
        assert_eq!(Vo2Tier::from_vo2max(70.0), Vo2Tier::Elite);

        assert!(vo2max(0.0).is_none());
        assert!(vo2max(f64::NAN).is_none());
    }

    #[test]
    fn test_parse_race_time() {
        assert_eq!(parse_race_time("1:30:00"), Some(1.5));
        assert_eq!(parse_race_time("45:00"), Some(0.75));
        assert_eq!(parse_race_time("30"), Some(0.5));
        assert!(parse_race_time("abc").is_none());
        assert!(parse_race_time("1:2:3:4").is_none());
        assert_eq!(parse_race_time("50min"), parse_race_time("50"));
        assert_eq!(parse_race_time("3:30:00 "), Some(3.5));
        assert_eq!(parse_race_time("45:00s"), Some(0.75));
        assert!(parse_race_time("45:abc").is_none());
    }

    #[test]
    fn test_duration_minutes_saturates_on_huge_values() {
        assert_eq!(duration_minutes("999999999999999999h"), u32::MAX);
        assert_eq!(duration_minutes("99999999999999999999999"), 0);
        assert_eq!(duration_minutes("-5h"), 0);
        assert_eq!(training_load(Some("99999999h"), 9), u32::MAX);
    }

    #[test]
    fn test_estimate_vma() {
        let vma = estimate_vma(10.0, "50:00").unwrap();
        assert!((vma - 12.0 / 0.90).abs() < 1e-9);

        let vma = estimate_vma(5.0, "20:00").unwrap();
        assert!((vma - 15.0 / 0.95).abs() < 1e-9);

        let vma = estimate_vma(42.195, "3:30:00").unwrap();
        assert!((vma - 42.195 / 3.5 / 0.80).abs() < 1e-9);

        assert!(estimate_vma(10.0, "00:00").is_none());
        assert!(estimate_vma(0.0, "50:00").is_none());
    }

    #[test]
    fn test_total_distance_skips_non_numeric() {
        let sessions = vec![
            completed("a", SessionType::Run, Some("5km")),
            completed("b", SessionType::Long, Some("3.5")),
            completed("c", SessionType::Run, Some("x")),
            Session::new("d", "JEU 4", SessionType::Run, "Footing"),
        ];
        assert_eq!(total_distance(&sessions), 8.5);
    }

    #[test]
    fn test_history_is_newest_first_and_filtered() {
        let doc = program(vec![
            completed("a", SessionType::Run, None),
            completed("b", SessionType::Rest, None),
            completed("c", SessionType::Interval, None),
            Session::new("d", "JEU 4", SessionType::Run, "Footing"),
        ]);

        let all: Vec<_> = completed_sessions(&doc, HistoryFilter::All)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(all, vec!["c", "b", "a"]);

        let runs: Vec<_> = completed_sessions(&doc, HistoryFilter::RunsOnly)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(runs, vec!["c", "a"]);
    }

    #[test]
    fn test_program_progress() {
        let doc = program(vec![
            completed("a", SessionType::Run, None),
            Session::new("b", "MAR 2", SessionType::Rest, "Repos"),
            Session::new("c", "MER 3", SessionType::Run, "Footing"),
        ]);
        assert_eq!(program_progress(&doc), 33);
        assert_eq!(program_progress(&program(vec![])), 0);
    }
}
