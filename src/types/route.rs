//! Route and solution types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Coordinates, Stop};

/// Bus identifier assigned by the optimizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(pub u32);

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BusId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(BusId)
    }
}

/// One bus's route in a solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusRoute {
    pub bus_id: BusId,
    #[serde(default)]
    pub color: String,
    /// Stops in visiting order, depot departure/arrival included
    #[serde(rename = "route", default)]
    pub stops: Vec<Stop>,
    #[serde(rename = "routeTime", default)]
    pub route_time_minutes: i64,
    #[serde(default)]
    pub final_load: i64,
    /// Road geometry, one polyline per leg
    #[serde(default)]
    pub detailed_path: Option<Vec<Vec<Coordinates>>>,
}

impl BusRoute {
    pub fn path_segments(&self) -> &[Vec<Coordinates>] {
        self.detailed_path.as_deref().unwrap_or_default()
    }
}

/// Result of one optimization or re-optimization call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub used_bus_count: u32,
    pub total_objective_cost: i64,
    /// Routes in optimizer order; bus ids are unique
    pub routes: Vec<BusRoute>,
}

impl Solution {
    pub fn route(&self, bus_id: BusId) -> Option<&BusRoute> {
        self.routes.iter().find(|r| r.bus_id == bus_id)
    }
}
