//! Drawing stop sets and solutions through the overlay registry
//!
//! Every render starts from an empty map.

use tracing::debug;

use super::geo::Bounds;
use super::overlay::{MapSurface, MarkerStyle, Overlay, OverlayRegistry};
use crate::types::{Coordinates, DepotRule, Solution, Stop};

/// One marker per stop, view fitted to all of them
pub fn draw_baseline<M: MapSurface>(registry: &mut OverlayRegistry<M>, stops: &[Stop], depot: &DepotRule) {
    registry.clear_all();

    for stop in stops {
        let style = if depot.is_depot(stop) {
            MarkerStyle::Depot
        } else {
            MarkerStyle::Stop
        };
        registry.register(Overlay::marker(stop.position(), stop.name.clone(), style));
    }

    if let Some(bounds) = Bounds::from_points(stops.iter().map(Stop::position)) {
        registry.fit_bounds(bounds);
    }
    debug!("Drew baseline view with {} stops", stops.len());
}

/// Draw every route of `solution`:
/// - a numbered label on the first stop when it is not a depot
/// - a depot marker for a final depot
/// - a small marker for each intermediate stop
/// - one polyline per path segment, stacked by route order
pub fn draw_solution<M: MapSurface>(registry: &mut OverlayRegistry<M>, solution: &Solution, depot: &DepotRule) {
    registry.clear_all();
    let mut bounds: Option<Bounds> = None;

    for (route_index, route) in solution.routes.iter().enumerate() {
        if route.stops.is_empty() {
            continue;
        }
        let last_index = route.stops.len() - 1;

        for (index, stop) in route.stops.iter().enumerate() {
            let position = stop.position();
            match bounds.as_mut() {
                Some(b) => b.extend(position),
                None => bounds = Bounds::from_points([position]),
            }

            let is_depot = depot.is_depot(stop);
            let overlay = if index == 0 && !is_depot {
                Some(Overlay::label(position, route.bus_id.to_string()))
            } else if index == last_index && is_depot {
                Some(Overlay::marker(position, stop.name.clone(), MarkerStyle::Depot))
            } else if !is_depot {
                Some(Overlay::marker(position, stop.name.clone(), MarkerStyle::Waypoint))
            } else {
                None
            };

            if let Some(overlay) = overlay {
                registry.register(overlay.for_route(route.bus_id));
            }
        }

        for segment in route.path_segments().iter().filter(|s| !s.is_empty()) {
            registry.register(
                Overlay::polyline(segment.clone(), route.color.clone(), route_index as i32)
                    .for_route(route.bus_id),
            );
        }
    }

    if let Some(bounds) = bounds {
        registry.fit_bounds(bounds);
    }
    debug!("Drew {} routes ({} overlays)", solution.routes.len(), registry.len());
}

/// Leg-by-leg straight lines between consecutive stops, for routes whose
/// road geometry is unknown
pub fn straight_path(stops: &[Stop]) -> Vec<Vec<Coordinates>> {
    stops
        .windows(2)
        .map(|pair| vec![pair[0].position(), pair[1].position()])
        .collect()
}
