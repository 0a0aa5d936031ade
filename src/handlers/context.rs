//! Application state shared by every handler

use indexmap::IndexMap;
use tracing::debug;

use crate::services::edit_session::RouteEditor;
use crate::services::ledger::RouteLockLedger;
use crate::services::overlay::{MapSurface, OverlayRegistry};
use crate::services::render::{self, straight_path};
use crate::services::requests::RequestTracker;
use crate::types::{BusId, DepotRule, OptimizeParams, Polygon, Solution, Stop};

/// What the map currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Baseline,
    Solution,
}

pub struct AppContext<M: MapSurface> {
    pub overlays: OverlayRegistry<M>,
    pub ledger: RouteLockLedger,
    pub editor: RouteEditor,
    pub requests: RequestTracker,
    pub params: OptimizeParams,
    pub depot: DepotRule,
    /// Last stop set loaded from the data source
    pub baseline: Vec<Stop>,
    pub solution: Option<Solution>,
    /// Stop sequence currently shown per route (committed edits included)
    pub displayed: IndexMap<BusId, Vec<Stop>>,
    /// User-drawn polygons in draw order
    pub polygons: Vec<Polygon>,
    view: View,
}

impl<M: MapSurface> AppContext<M> {
    pub fn new(map: M, params: OptimizeParams, depot: DepotRule) -> Self {
        Self {
            overlays: OverlayRegistry::new(map),
            ledger: RouteLockLedger::new(),
            editor: RouteEditor::new(),
            requests: RequestTracker::new(),
            params,
            depot,
            baseline: Vec::new(),
            solution: None,
            displayed: IndexMap::new(),
            polygons: Vec::new(),
            view: View::Baseline,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn show_baseline(&mut self) {
        render::draw_baseline(&mut self.overlays, &self.baseline, &self.depot);
        self.view = View::Baseline;
    }

    /// Draw the displayed routes, or the baseline when there is no solution
    pub fn show_solution(&mut self) {
        match self.view_solution() {
            Some(solution) => {
                render::draw_solution(&mut self.overlays, &solution, &self.depot);
                self.view = View::Solution;
            }
            None => self.show_baseline(),
        }
    }

    /// Install a fresh solution. Locks and displayed sequences from the
    /// previous one no longer apply.
    pub fn replace_solution(&mut self, solution: Solution) {
        self.ledger.clear();
        self.displayed = solution
            .routes
            .iter()
            .map(|r| (r.bus_id, r.stops.clone()))
            .collect();
        debug!("Installed solution with {} routes", solution.routes.len());
        self.solution = Some(solution);
    }

    /// The solution as it should be drawn: routes whose displayed sequence
    /// differs from the optimizer's get straight-line geometry.
    pub fn view_solution(&self) -> Option<Solution> {
        let mut solution = self.solution.clone()?;
        for route in &mut solution.routes {
            if let Some(stops) = self.displayed.get(&route.bus_id) {
                if *stops != route.stops {
                    route.detailed_path = Some(straight_path(stops));
                    route.stops = stops.clone();
                }
            }
        }
        Some(solution)
    }

    pub fn displayed_stops(&self, bus_id: BusId) -> Option<&[Stop]> {
        self.displayed.get(&bus_id).map(Vec::as_slice)
    }

    /// Stops behind the overlays currently drawn. Stops shared by several
    /// routes (depots) appear once.
    pub fn stops_on_screen(&self) -> Vec<&Stop> {
        match self.view {
            View::Baseline => self.baseline.iter().collect(),
            View::Solution => {
                let mut seen: Vec<&Stop> = Vec::new();
                for stop in self.displayed.values().flatten() {
                    if !seen.iter().any(|s| s.id == stop.id) {
                        seen.push(stop);
                    }
                }
                seen
            }
        }
    }

    /// Look a stop up by id in the solution first, then the baseline
    pub fn find_stop(&self, stop_id: &str) -> Option<Stop> {
        self.solution
            .iter()
            .flat_map(|s| s.routes.iter())
            .flat_map(|r| r.stops.iter())
            .chain(self.baseline.iter())
            .find(|s| s.id == stop_id)
            .cloned()
    }
}
