//! Session type enumeration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of the kinds of session a week can contain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// Easy or moderate continuous run
    Run,
    /// Day off
    Rest,
    /// Interval / fractional work
    Interval,
    /// Long run
    Long,
    /// Test session (VMA test, time trial)
    Test,
    /// Recovery jog
    Recovery,
    /// Tempo / threshold run
    Tempo,
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "run" => Ok(SessionType::Run),
            "rest" => Ok(SessionType::Rest),
            "interval" => Ok(SessionType::Interval),
            "long" => Ok(SessionType::Long),
            "test" => Ok(SessionType::Test),
            "recovery" => Ok(SessionType::Recovery),
            "tempo" => Ok(SessionType::Tempo),
            _ => Err(format!("Invalid session type: {s}")),
        }
    }
}

impl SessionType {
    /// Every accepted value, in the order declared to the model.
    pub const ALL: [SessionType; 7] = [
        SessionType::Run,
        SessionType::Rest,
        SessionType::Interval,
        SessionType::Long,
        SessionType::Test,
        SessionType::Recovery,
        SessionType::Tempo,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Run => "run",
            SessionType::Rest => "rest",
            SessionType::Interval => "interval",
            SessionType::Long => "long",
            SessionType::Test => "test",
            SessionType::Recovery => "recovery",
            SessionType::Tempo => "tempo",
        }
    }

    /// Label shown to the runner, also used as a fallback session title.
    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Run => "Footing",
            SessionType::Rest => "Repos",
            SessionType::Interval => "Fractionné",
            SessionType::Long => "Sortie longue",
            SessionType::Test => "Test",
            SessionType::Recovery => "Récupération",
            SessionType::Tempo => "Tempo",
        }
    }

    /// Whether the history "runs only" filter keeps this type.
    pub fn is_run(&self) -> bool {
        matches!(
            self,
            SessionType::Run | SessionType::Interval | SessionType::Long
        )
    }

    /// Get the type with a leading marker for calendar display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use runflow_core::models::SessionType;
    ///
    /// assert_eq!(SessionType::Rest.with_icon(), "○ Repos");
    /// assert_eq!(SessionType::Interval.with_icon(), "⚡ Fractionné");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            SessionType::Run => "➤ Footing",
            SessionType::Rest => "○ Repos",
            SessionType::Interval => "⚡ Fractionné",
            SessionType::Long => "➤➤ Sortie longue",
            SessionType::Test => "◆ Test",
            SessionType::Recovery => "~ Récupération",
            SessionType::Tempo => "» Tempo",
        }
    }
}
