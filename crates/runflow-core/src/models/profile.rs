//! Runner profile model.

use serde::{Deserialize, Deserializer, Serialize};

const DEFAULT_NAME: &str = "Coureur";
const DEFAULT_LEVEL: &str = "Intermédiaire";
const DEFAULT_AVATAR: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=Felix";

/// The runner's profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub level: String,

    #[serde(default)]
    pub avatar: String,

    /// Maximal aerobic speed in km/h
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub vma: Option<f64>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            level: DEFAULT_LEVEL.to_string(),
            avatar: DEFAULT_AVATAR.to_string(),
            vma: None,
        }
    }
}

impl UserProfile {
    /// Name to address the runner with.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Athlète"
        } else {
            &self.name
        }
    }

    /// VO2max estimated from the stored VMA.
    pub fn vo2max(&self) -> Option<f64> {
        self.vma.and_then(crate::metrics::vo2max)
    }
}

/// Accepts `13.3`, `"13.3"`, `""` and `null`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    Ok(
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::Number(n)) => Some(n),
            Some(NumberOrString::Text(s)) => s.trim().replace(',', ".").parse::<f64>().ok(),
            None => None,
        }
        .filter(|v| v.is_finite() && *v > 0.0),
    )
}
