//! Overlay lifecycle tracking
//!
//! Every visual element drawn on the map goes through `OverlayRegistry`, so
//! a redraw can always start from an empty map.

use tracing::debug;

use crate::services::geo::Bounds;
use crate::types::{BusId, Coordinates};

/// Handle of an overlay attached to the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// Plain stop marker in the baseline view
    Stop,
    /// Depot marker (baseline view and final depot of a route)
    Depot,
    /// Small dot for intermediate stops of a route
    Waypoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayKind {
    Marker {
        position: Coordinates,
        title: String,
        style: MarkerStyle,
    },
    Polyline {
        path: Vec<Coordinates>,
        color: String,
        z_index: i32,
    },
    /// Text badge anchored at a position (route number on its first stop)
    Label {
        position: Coordinates,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub kind: OverlayKind,
    /// Route the overlay belongs to, if any
    pub route: Option<BusId>,
}

impl Overlay {
    pub fn marker(position: Coordinates, title: impl Into<String>, style: MarkerStyle) -> Self {
        Self {
            kind: OverlayKind::Marker {
                position,
                title: title.into(),
                style,
            },
            route: None,
        }
    }

    pub fn polyline(path: Vec<Coordinates>, color: impl Into<String>, z_index: i32) -> Self {
        Self {
            kind: OverlayKind::Polyline {
                path,
                color: color.into(),
                z_index,
            },
            route: None,
        }
    }

    pub fn label(position: Coordinates, text: impl Into<String>) -> Self {
        Self {
            kind: OverlayKind::Label {
                position,
                text: text.into(),
            },
            route: None,
        }
    }

    pub fn for_route(mut self, bus_id: BusId) -> Self {
        self.route = Some(bus_id);
        self
    }
}

/// Capabilities required from the mapping layer
pub trait MapSurface {
    fn attach(&mut self, id: OverlayId, overlay: &Overlay);
    fn detach(&mut self, id: OverlayId);
    fn set_visible(&mut self, id: OverlayId, visible: bool);
    fn fit_bounds(&mut self, bounds: Bounds);
}

/// Tracks every overlay currently on the map
pub struct OverlayRegistry<M: MapSurface> {
    map: M,
    tracked: Vec<(OverlayId, Overlay)>,
    next_id: u64,
}

impl<M: MapSurface> OverlayRegistry<M> {
    pub fn new(map: M) -> Self {
        Self {
            map,
            tracked: Vec::new(),
            next_id: 0,
        }
    }

    /// Attach `overlay` to the map and start tracking it
    pub fn register(&mut self, overlay: Overlay) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        self.map.attach(id, &overlay);
        self.tracked.push((id, overlay));
        id
    }

    /// Detach every tracked overlay and reset the arena.
    pub fn clear_all(&mut self) {
        let tracked = std::mem::take(&mut self.tracked);
        if tracked.is_empty() {
            return;
        }
        debug!("Clearing {} overlays", tracked.len());
        for (id, _) in tracked {
            self.map.detach(id);
        }
    }

    /// Show or hide the polylines of one route. Returns how many changed.
    pub fn set_route_visible(&mut self, bus_id: BusId, visible: bool) -> usize {
        self.set_polylines_visible(|route| route == Some(bus_id), visible)
    }

    /// Show or hide the polylines of every route
    pub fn set_all_routes_visible(&mut self, visible: bool) -> usize {
        self.set_polylines_visible(|route| route.is_some(), visible)
    }

    fn set_polylines_visible(&mut self, selects: impl Fn(Option<BusId>) -> bool, visible: bool) -> usize {
        let mut changed = 0;
        for (id, overlay) in &self.tracked {
            if matches!(overlay.kind, OverlayKind::Polyline { .. }) && selects(overlay.route) {
                self.map.set_visible(*id, visible);
                changed += 1;
            }
        }
        changed
    }

    pub fn fit_bounds(&mut self, bounds: Bounds) {
        self.map.fit_bounds(bounds);
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn map(&self) -> &M {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::map::HeadlessMap;

    fn point(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng)
    }

    #[test]
    fn test_register_attaches() {
        let mut registry = OverlayRegistry::new(HeadlessMap::default());
        let a = registry.register(Overlay::marker(point(1.0, 1.0), "A", MarkerStyle::Stop));
        let b = registry.register(Overlay::label(point(2.0, 2.0), "7"));

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.map().attached_count(), 2);
        assert!(registry.map().is_attached(a));
    }

    #[test]
    fn test_clear_all_detaches_everything() {
        let mut registry = OverlayRegistry::new(HeadlessMap::default());
        for i in 0..5 {
            registry.register(Overlay::marker(point(i as f64, 0.0), format!("S{}", i), MarkerStyle::Stop));
        }
        registry.register(Overlay::polyline(vec![point(0.0, 0.0), point(1.0, 1.0)], "#ff0000", 0));

        registry.clear_all();

        assert!(registry.is_empty());
        assert_eq!(registry.map().attached_count(), 0);
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let mut registry = OverlayRegistry::new(HeadlessMap::default());
        registry.clear_all();
        registry.register(Overlay::label(point(0.0, 0.0), "1"));
        registry.clear_all();
        registry.clear_all();

        assert!(registry.is_empty());
        assert_eq!(registry.map().attached_count(), 0);
        assert_eq!(registry.map().detach_calls(), 1);
    }

    #[test]
    fn test_ids_are_not_reused_after_clear() {
        let mut registry = OverlayRegistry::new(HeadlessMap::default());
        let first = registry.register(Overlay::label(point(0.0, 0.0), "1"));
        registry.clear_all();
        let second = registry.register(Overlay::label(point(0.0, 0.0), "1"));
        assert!(second > first);
    }

    #[test]
    fn test_route_visibility_only_touches_that_routes_polylines() {
        let mut registry = OverlayRegistry::new(HeadlessMap::default());
        let line_7 = registry.register(
            Overlay::polyline(vec![point(0.0, 0.0), point(1.0, 1.0)], "#111111", 0).for_route(BusId(7)),
        );
        let marker_7 = registry.register(
            Overlay::marker(point(0.0, 0.0), "A", MarkerStyle::Waypoint).for_route(BusId(7)),
        );
        let line_8 = registry.register(
            Overlay::polyline(vec![point(2.0, 2.0), point(3.0, 3.0)], "#222222", 1).for_route(BusId(8)),
        );

        assert_eq!(registry.set_route_visible(BusId(7), false), 1);
        assert!(!registry.map().is_visible(line_7));
        assert!(registry.map().is_visible(marker_7));
        assert!(registry.map().is_visible(line_8));

        assert_eq!(registry.set_all_routes_visible(false), 2);
        assert!(!registry.map().is_visible(line_8));

        // Hidden overlays are still detached on clear
        registry.clear_all();
        assert_eq!(registry.map().attached_count(), 0);
    }
}
