//! Arrival time formatting for route listings

use crate::types::BusRoute;

/// Minutes since midnight as `HH:MM`. Hours are not wrapped at 24.
pub fn format_minutes(total_minutes: i64) -> String {
    if total_minutes < 0 {
        return "N/A".to_string();
    }
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Depot departure time, derived from the first arrival and the route time
/// not covered by the first-to-last arrival span.
pub fn departure_minutes(route: &BusRoute) -> i64 {
    match (route.stops.first(), route.stops.last()) {
        (Some(first), Some(last)) if route.stops.len() > 1 => {
            let span = last.arrival_time - first.arrival_time;
            first.arrival_time - (route.route_time_minutes - span)
        }
        _ => 0,
    }
}

/// One-line header for a route listing
pub fn route_summary(route: &BusRoute) -> String {
    format!(
        "Bus #{} ({}): {} stops, service time {} min, load {}, departs {}",
        route.bus_id,
        route.color,
        route.stops.len(),
        route.route_time_minutes,
        route.final_load,
        format_minutes(departure_minutes(route)),
    )
}
