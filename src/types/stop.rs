//! Stop types

use serde::{Deserialize, Serialize};

use super::Coordinates;
use crate::defaults::DEPOT_PREFIX;

/// A bus stop as exchanged with the optimization service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub demand: i64,
    pub lat: f64,
    pub lon: f64,
    /// Estimated arrival in minutes since midnight
    #[serde(default)]
    pub arrival_time: i64,
    #[serde(default)]
    pub current_load: i64,
}

impl Stop {
    pub fn position(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Identifies depot stops by their id prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepotRule {
    prefix: String,
}

impl Default for DepotRule {
    fn default() -> Self {
        Self::new(DEPOT_PREFIX)
    }
}

impl DepotRule {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_depot(&self, stop: &Stop) -> bool {
        stop.id.starts_with(&self.prefix)
    }
}
