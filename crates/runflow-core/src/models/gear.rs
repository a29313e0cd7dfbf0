//! Running shoe (gear) model.

use serde::{Deserialize, Serialize};

/// Default lifetime of a pair of shoes, in kilometres.
pub const DEFAULT_MAX_DISTANCE: f64 = 800.0;

/// A pair of running shoes and its mileage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shoe {
    pub id: String,
    /// Model name, e.g. "Pegasus 40"
    pub name: String,
    pub brand: String,
    /// Kilometres run so far
    #[serde(default)]
    pub distance: f64,
    /// Kilometres after which the pair should be retired
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,
    #[serde(default)]
    pub is_active: bool,
}

fn default_max_distance() -> f64 {
    DEFAULT_MAX_DISTANCE
}

impl Shoe {
    /// Wear as a percentage of the maximum distance, capped at 100.
    pub fn wear_percent(&self) -> f64 {
        if self.max_distance <= 0.0 {
            return 100.0;
        }
        (self.distance / self.max_distance * 100.0).min(100.0)
    }
}
