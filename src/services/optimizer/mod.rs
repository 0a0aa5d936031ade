//! Optimization service client
//!
//! Talks to the remote optimizer over HTTP in production; a mock with demo
//! data is used when no optimizer URL is configured and in tests.

mod http;

pub use http::{HttpOptimizationClient, OptimizerConfig};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::warn;

use crate::services::render::straight_path;
use crate::types::{
    BusId, BusRoute, EditorError, LockEntry, OptimizeParams, Solution,
    SolutionResponse, Stop,
};

/// Operations offered by the optimization service. All calls are
/// single-shot: no retries happen inside an implementation.
#[async_trait]
pub trait OptimizationService: Send + Sync {
    /// Every stop of a data set, used for the baseline view
    async fn fetch_all_stops(&self, db_name: &str) -> Result<Vec<Stop>, EditorError>;

    async fn request_optimize(&self, params: &OptimizeParams) -> Result<Solution, EditorError>;

    /// Re-optimize while keeping every override verbatim
    async fn request_reoptimize(
        &self,
        overrides: &[LockEntry],
        params: &OptimizeParams,
    ) -> Result<Solution, EditorError>;

    /// Submit overrides for server-side validation; returns the server's
    /// acknowledgement text
    async fn submit_edits(
        &self,
        overrides: &[LockEntry],
        params: &OptimizeParams,
    ) -> Result<String, EditorError>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

/// Turn a wire response into a `Solution`. An absent or empty route list is
/// a logical failure, not an empty result. Duplicate bus ids keep the first
/// route.
pub fn into_solution(response: SolutionResponse) -> Result<Solution, EditorError> {
    let routes = match response.bus_routes {
        Some(routes) if !routes.is_empty() => routes,
        _ => return Err(EditorError::NoSolution),
    };

    let mut unique: Vec<BusRoute> = Vec::with_capacity(routes.len());
    for route in routes {
        if unique.iter().any(|r| r.bus_id == route.bus_id) {
            warn!("Optimizer returned bus #{} twice; keeping the first route", route.bus_id);
            continue;
        }
        unique.push(route);
    }

    Ok(Solution {
        used_bus_count: response.used_buses,
        total_objective_cost: response.total_objective_time,
        routes: unique,
    })
}

fn ensure_overrides(overrides: &[LockEntry]) -> Result<(), EditorError> {
    if overrides.is_empty() {
        return Err(EditorError::EmptyLedger);
    }
    Ok(())
}

/// A call received by `MockOptimizationService`
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    AllStops { db_name: String },
    Optimize(OptimizeParams),
    Reoptimize { overrides: Vec<LockEntry>, params: OptimizeParams },
    SubmitEdits { overrides: Vec<LockEntry>, params: OptimizeParams },
}

/// In-process optimizer with canned data.
///
/// `request_optimize` returns the configured solution; `request_reoptimize`
/// returns it with every overridden route replaced verbatim.
pub struct MockOptimizationService {
    stops: Vec<Stop>,
    solution: Option<Solution>,
    failure: Mutex<Option<EditorError>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockOptimizationService {
    /// `solution: None` makes every optimize call a `NoSolution`
    pub fn new(stops: Vec<Stop>, solution: Option<Solution>) -> Self {
        Self {
            stops,
            solution,
            failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Two buses serving six stops around Seoul City Hall
    pub fn demo() -> Self {
        let depot = demo_stop("DEPOT", "Seoul City Hall Garage", 0, 37.566826, 126.9786567);
        let stops = vec![
            depot.clone(),
            demo_stop("S01", "Gwanghwamun", 8, 37.5759, 126.9769),
            demo_stop("S02", "Anguk", 5, 37.5765, 126.9854),
            demo_stop("S03", "Jongno 3-ga", 11, 37.5704, 126.9921),
            demo_stop("S04", "Seoul Station", 14, 37.5547, 126.9707),
            demo_stop("S05", "Namdaemun Market", 6, 37.5591, 126.9776),
            demo_stop("S06", "Myeongdong", 9, 37.5636, 126.9827),
        ];

        let routes = vec![
            demo_route(BusId(1), "#e63946", vec![depot.clone(), stops[1].clone(), stops[2].clone(), stops[3].clone(), depot.clone()]),
            demo_route(BusId(2), "#457b9d", vec![depot.clone(), stops[4].clone(), stops[5].clone(), stops[6].clone(), depot]),
        ];
        let total = routes.iter().map(|r| r.route_time_minutes).sum();

        Self::new(
            stops,
            Some(Solution {
                used_bus_count: 2,
                total_objective_cost: total,
                routes,
            }),
        )
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: EditorError) {
        *self.failure.lock() = Some(error);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: RecordedCall) -> Result<(), EditorError> {
        self.calls.lock().push(call);
        match self.failure.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn current_solution(&self) -> Result<Solution, EditorError> {
        match &self.solution {
            Some(solution) if !solution.routes.is_empty() => Ok(solution.clone()),
            _ => Err(EditorError::NoSolution),
        }
    }
}

#[async_trait]
impl OptimizationService for MockOptimizationService {
    async fn fetch_all_stops(&self, db_name: &str) -> Result<Vec<Stop>, EditorError> {
        self.record(RecordedCall::AllStops {
            db_name: db_name.to_string(),
        })?;
        Ok(self.stops.clone())
    }

    async fn request_optimize(&self, params: &OptimizeParams) -> Result<Solution, EditorError> {
        self.record(RecordedCall::Optimize(params.clone()))?;
        self.current_solution()
    }

    async fn request_reoptimize(
        &self,
        overrides: &[LockEntry],
        params: &OptimizeParams,
    ) -> Result<Solution, EditorError> {
        self.record(RecordedCall::Reoptimize {
            overrides: overrides.to_vec(),
            params: params.clone(),
        })?;
        ensure_overrides(overrides)?;

        let mut solution = self.current_solution()?;
        for entry in overrides {
            match solution.routes.iter_mut().find(|r| r.bus_id == entry.bus_id) {
                Some(route) => {
                    route.stops = entry.stops.clone();
                    route.detailed_path = Some(straight_path(&entry.stops));
                }
                None => solution.routes.push(demo_route(entry.bus_id, "#2a9d8f", entry.stops.clone())),
            }
        }
        solution.used_bus_count = solution.routes.len() as u32;
        Ok(solution)
    }

    async fn submit_edits(
        &self,
        overrides: &[LockEntry],
        params: &OptimizeParams,
    ) -> Result<String, EditorError> {
        self.record(RecordedCall::SubmitEdits {
            overrides: overrides.to_vec(),
            params: params.clone(),
        })?;
        ensure_overrides(overrides)?;
        Ok(format!("Received {} modified routes", overrides.len()))
    }

    fn name(&self) -> &str {
        "MockOptimizer"
    }
}

fn demo_stop(id: &str, name: &str, demand: i64, lat: f64, lon: f64) -> Stop {
    Stop {
        id: id.to_string(),
        name: name.to_string(),
        demand,
        lat,
        lon,
        arrival_time: 0,
        current_load: 0,
    }
}

/// Ten minutes per leg, arriving back at the depot at 09:00
fn demo_route(bus_id: BusId, color: &str, mut stops: Vec<Stop>) -> BusRoute {
    const LEG_MINUTES: i64 = 10;
    const FINAL_ARRIVAL: i64 = 9 * 60;

    let route_time = LEG_MINUTES * stops.len().saturating_sub(1) as i64;
    let mut load = 0;
    for (i, stop) in stops.iter_mut().enumerate() {
        stop.arrival_time = FINAL_ARRIVAL - route_time + LEG_MINUTES * i as i64;
        load += stop.demand;
        stop.current_load = load;
    }

    BusRoute {
        bus_id,
        color: color.to_string(),
        detailed_path: Some(straight_path(&stops)),
        stops,
        route_time_minutes: route_time,
        final_load: load,
    }
}

/// Create the optimization service based on configuration
pub fn create_optimization_service(
    config: Option<OptimizerConfig>,
) -> Result<Box<dyn OptimizationService>, EditorError> {
    match config {
        Some(cfg) => Ok(Box::new(HttpOptimizationClient::new(cfg)?)),
        None => Ok(Box::new(MockOptimizationService::demo())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> OptimizeParams {
        OptimizeParams {
            time_limit: 30,
            capacity: 45,
            service_time: 1,
            db_name: "INC4.csv".to_string(),
        }
    }

    fn route(bus: u32) -> BusRoute {
        BusRoute {
            bus_id: BusId(bus),
            color: String::new(),
            stops: vec![],
            route_time_minutes: 0,
            final_load: 0,
            detailed_path: None,
        }
    }

    #[test]
    fn test_into_solution_missing_routes_is_no_solution() {
        let response = SolutionResponse {
            used_buses: 0,
            total_objective_time: 0,
            bus_routes: None,
        };
        assert_eq!(into_solution(response), Err(EditorError::NoSolution));
    }

    #[test]
    fn test_into_solution_empty_routes_is_no_solution() {
        let response = SolutionResponse {
            used_buses: 3,
            total_objective_time: 10,
            bus_routes: Some(vec![]),
        };
        assert_eq!(into_solution(response), Err(EditorError::NoSolution));
    }

    #[test]
    fn test_into_solution_dedupes_bus_ids() {
        let mut first = route(1);
        first.color = "#first".to_string();
        let mut dup = route(1);
        dup.color = "#dup".to_string();
        let response = SolutionResponse {
            used_buses: 2,
            total_objective_time: 99,
            bus_routes: Some(vec![first, route(2), dup]),
        };

        let solution = into_solution(response).unwrap();
        assert_eq!(solution.routes.len(), 2);
        assert_eq!(solution.route(BusId(1)).unwrap().color, "#first");
        assert_eq!(solution.total_objective_cost, 99);
        assert_eq!(solution.used_bus_count, 2);
    }

    #[tokio::test]
    async fn test_mock_demo_optimize() {
        let service = MockOptimizationService::demo();
        let solution = service.request_optimize(&params()).await.unwrap();

        assert_eq!(solution.routes.len(), 2);
        for route in &solution.routes {
            assert_eq!(route.stops.first().unwrap().id, "DEPOT");
            assert_eq!(route.stops.last().unwrap().id, "DEPOT");
            assert_eq!(route.stops.last().unwrap().arrival_time, 540);
            assert_eq!(route.path_segments().len(), route.stops.len() - 1);
        }
        assert_eq!(service.calls(), vec![RecordedCall::Optimize(params())]);
    }

    #[tokio::test]
    async fn test_mock_without_solution_reports_no_solution() {
        let service = MockOptimizationService::new(vec![], None);
        let err = service.request_optimize(&params()).await.unwrap_err();
        assert_eq!(err, EditorError::NoSolution);
    }

    #[tokio::test]
    async fn test_mock_fail_next_only_fails_once() {
        let service = MockOptimizationService::demo();
        service.fail_next(EditorError::Transport("boom".into()));

        assert!(service.fetch_all_stops("INC4.csv").await.is_err());
        assert_eq!(service.fetch_all_stops("INC4.csv").await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_mock_reoptimize_keeps_overrides_verbatim() {
        let service = MockOptimizationService::demo();
        let original = service.request_optimize(&params()).await.unwrap();
        let mut stops = original.route(BusId(2)).unwrap().stops.clone();
        stops.remove(2);

        let solution = service
            .request_reoptimize(&[LockEntry { bus_id: BusId(2), stops: stops.clone() }], &params())
            .await
            .unwrap();

        assert_eq!(solution.route(BusId(2)).unwrap().stops, stops);
        assert_eq!(solution.route(BusId(1)), original.route(BusId(1)));
    }

    #[tokio::test]
    async fn test_mock_reoptimize_requires_overrides() {
        let service = MockOptimizationService::demo();
        let err = service.request_reoptimize(&[], &params()).await.unwrap_err();
        assert_eq!(err, EditorError::EmptyLedger);
    }

    #[tokio::test]
    async fn test_mock_submit_edits() {
        let service = MockOptimizationService::demo();
        let entry = LockEntry { bus_id: BusId(1), stops: vec![] };
        let ack = service.submit_edits(&[entry], &params()).await.unwrap();
        assert_eq!(ack, "Received 1 modified routes");
    }

    #[test]
    fn test_create_optimization_service_without_url_uses_mock() {
        let service = create_optimization_service(None).unwrap();
        assert_eq!(service.name(), "MockOptimizer");
    }

    #[test]
    fn test_create_optimization_service_with_url_uses_http() {
        let service = create_optimization_service(Some(OptimizerConfig::new("http://localhost:8080"))).unwrap();
        assert_eq!(service.name(), "HttpOptimizer");
    }
}
