//! Local checks on a user-edited route before it is sent for re-optimization

use crate::types::{BusId, DepotRule, Stop};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCheck {
    pub bus_id: BusId,
    /// Total demand picked up over the route
    pub final_load: i64,
    /// False if the running load exceeds capacity at any stop
    pub capacity_valid: bool,
    pub message: String,
}

/// Accumulate demand over the non-depot stops and compare the running load
/// against `capacity`.
pub fn validate_override(bus_id: BusId, stops: &[Stop], capacity: u32, depot: &DepotRule) -> RouteCheck {
    let mut load = 0i64;
    let mut capacity_valid = true;

    for stop in stops.iter().filter(|s| !depot.is_depot(s)) {
        load += stop.demand;
        if load > i64::from(capacity) {
            capacity_valid = false;
        }
    }

    let message = if capacity_valid {
        format!("Bus #{}: load {} of {} seats", bus_id, load, capacity)
    } else {
        format!("Bus #{}: load {} exceeds capacity of {} seats", bus_id, load, capacity)
    };

    RouteCheck {
        bus_id,
        final_load: load,
        capacity_valid,
        message,
    }
}
