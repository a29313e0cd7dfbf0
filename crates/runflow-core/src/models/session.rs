//! Session model definition and related functionality.

use serde::{Deserialize, Serialize};

use super::SessionType;

/// Warm-up text shown when the model left the warm-up empty.
pub const DEFAULT_WARMUP: &str = "Standard : 15min footing lent";

/// Cool-down text shown when the model left the cool-down empty.
pub const DEFAULT_COOLDOWN: &str = "5min marche + étirements";

/// Structured breakdown of a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct SessionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<String>,
}

impl SessionDetails {
    /// Warm-up, or the standard warm-up when missing or blank.
    pub fn warmup_or_default(&self) -> &str {
        non_blank(self.warmup.as_deref()).unwrap_or(DEFAULT_WARMUP)
    }

    /// Cool-down, or the standard cool-down when missing or blank.
    pub fn cooldown_or_default(&self) -> &str {
        non_blank(self.cooldown.as_deref()).unwrap_or(DEFAULT_COOLDOWN)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A single day of a weekly plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Stable key, unique within the program
    #[serde(default)]
    pub id: String,

    /// Day label, e.g. "LUN 5"
    #[serde(default)]
    pub day: String,

    /// Calendar date (ISO string) when the model provided one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Kind of session
    #[serde(rename = "type")]
    pub kind: SessionType,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Free-form distance, e.g. "8 km"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,

    /// Free-form duration, e.g. "45" or "1h30"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<SessionDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,

    /// Rate of perceived exertion, 1 to 10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Session {
    /// Create a session with only the required fields set.
    pub fn new(
        id: impl Into<String>,
        day: impl Into<String>,
        kind: SessionType,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            day: day.into(),
            date: None,
            kind,
            title: title.into(),
            description: String::new(),
            distance: None,
            duration: None,
            details: None,
            completed: None,
            rpe: None,
            feedback: None,
        }
    }

    /// Whether the session has been marked complete.
    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(false)
    }

    /// Training load (duration in minutes times RPE) of this session.
    ///
    /// Returns 0 when the session carries no RPE.
    pub fn training_load(&self) -> u32 {
        self.rpe
            .map(|rpe| crate::metrics::training_load(self.duration.as_deref(), rpe))
            .unwrap_or(0)
    }
}
