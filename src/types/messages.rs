//! Optimization service request and response types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BusId, BusRoute, Stop};

/// Parameters shared by optimize and re-optimize requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizeParams {
    /// Solver time limit in seconds
    pub time_limit: u64,
    /// Seats per bus
    pub capacity: u32,
    /// Dwell time per stop in minutes
    pub service_time: u64,
    /// Stop data set on the server
    pub db_name: String,
}

/// A user-supplied route the re-optimization must keep verbatim
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockEntry {
    pub bus_id: BusId,
    #[serde(rename = "newRoute")]
    pub stops: Vec<Stop>,
}

/// Body of `POST /api/re-optimize` and `POST /api/apply-edits`
#[derive(Debug, Clone, Serialize)]
pub struct ModificationRequest {
    pub modifications: Vec<LockEntry>,
    pub params: WireParams,
}

/// Parameters as the server's string map expects them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireParams {
    pub time_limit: String,
    pub capacity: String,
    pub service_time: String,
    pub db_name: String,
}

impl From<&OptimizeParams> for WireParams {
    fn from(params: &OptimizeParams) -> Self {
        Self {
            time_limit: params.time_limit.to_string(),
            capacity: params.capacity.to_string(),
            service_time: params.service_time.to_string(),
            db_name: params.db_name.clone(),
        }
    }
}

impl ModificationRequest {
    pub fn new(modifications: Vec<LockEntry>, params: &OptimizeParams) -> Self {
        Self {
            modifications,
            params: params.into(),
        }
    }
}

/// Solution as it arrives on the wire, before the empty-result check
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionResponse {
    #[serde(default)]
    pub used_buses: u32,
    #[serde(default)]
    pub total_objective_time: i64,
    #[serde(default)]
    pub bus_routes: Option<Vec<BusRoute>>,
}

/// Kinds of network request the desk can have outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    LoadStops,
    Optimize,
    Reoptimize,
    SubmitEdits,
}

impl RequestKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            RequestKind::LoadStops => "load-stops",
            RequestKind::Optimize => "optimize",
            RequestKind::Reoptimize => "re-optimize",
            RequestKind::SubmitEdits => "apply-edits",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
