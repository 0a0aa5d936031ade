//! Runs handler effects against the optimization service
//!
//! Requests are awaited one at a time on the current task and their
//! completions go back through `dispatch`, so all state changes still
//! happen in one place.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info};

use super::{dispatch, AppContext, Effect, Event, Notice, PendingRequest, RequestCall};
use crate::services::optimizer::OptimizationService;
use crate::services::overlay::MapSurface;

pub struct Driver<M: MapSurface> {
    ctx: AppContext<M>,
    service: Arc<dyn OptimizationService>,
}

impl<M: MapSurface> Driver<M> {
    pub fn new(ctx: AppContext<M>, service: Arc<dyn OptimizationService>) -> Self {
        info!("Using optimization service: {}", service.name());
        Self { ctx, service }
    }

    pub fn context(&self) -> &AppContext<M> {
        &self.ctx
    }

    /// Dispatch `event` and every completion it leads to. Returns the
    /// notices produced along the way, in order.
    pub async fn handle(&mut self, event: Event) -> Vec<Notice> {
        let mut queue = VecDeque::from([event]);
        let mut notices = Vec::new();

        while let Some(event) = queue.pop_front() {
            for effect in dispatch(&mut self.ctx, event) {
                match effect {
                    Effect::Notify(notice) => notices.push(notice),
                    Effect::Request(request) => queue.push_back(self.execute(request).await),
                }
            }
        }
        notices
    }

    async fn execute(&self, request: PendingRequest) -> Event {
        let PendingRequest { ticket, call } = request;
        debug!("Running {} request (generation {})", ticket.kind, ticket.generation);

        match call {
            RequestCall::LoadStops { db_name } => Event::StopsLoaded {
                ticket,
                result: self.service.fetch_all_stops(&db_name).await,
            },
            RequestCall::Optimize(params) => Event::SolutionReady {
                ticket,
                result: self.service.request_optimize(&params).await,
            },
            RequestCall::Reoptimize { overrides, params } => Event::SolutionReady {
                ticket,
                result: self.service.request_reoptimize(&overrides, &params).await,
            },
            RequestCall::SubmitEdits { overrides, params } => Event::EditsSubmitted {
                ticket,
                result: self.service.submit_edits(&overrides, &params).await,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{context, solution};
    use super::super::NoticeLevel;
    use super::*;
    use crate::services::map::HeadlessMap;
    use crate::services::optimizer::{MockOptimizationService, RecordedCall};
    use crate::types::{BusId, EditorError, RequestKind};

    fn driver() -> (Driver<HeadlessMap>, Arc<MockOptimizationService>) {
        let ctx = context();
        let mock = Arc::new(MockOptimizationService::new(ctx.baseline.clone(), Some(solution())));
        (Driver::new(ctx, mock.clone()), mock)
    }

    #[tokio::test]
    async fn test_optimize_edit_finalize_flow() {
        let (mut driver, mock) = driver();

        let notices = driver.handle(Event::Optimize).await;
        assert!(notices[0].message.starts_with("optimize finished"));
        assert!(driver.context().solution.is_some());

        driver.handle(Event::StartEdit { bus_id: BusId(7) }).await;
        driver.handle(Event::RemoveStop { index: 1 }).await;
        driver.handle(Event::CommitEdit).await;

        let notices = driver.handle(Event::Finalize).await;
        assert!(notices[0].message.starts_with("re-optimize finished"));

        // The mock keeps overrides verbatim
        let route = driver.context().solution.as_ref().unwrap().route(BusId(7)).unwrap().clone();
        let ids: Vec<_> = route.stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["DEPOT_D", "B", "DEPOT_E"]);
        assert!(driver.context().ledger.is_empty());
        assert!(!driver.context().requests.is_in_flight(RequestKind::Reoptimize));

        match &mock.calls()[1] {
            RecordedCall::Reoptimize { overrides, .. } => {
                assert_eq!(overrides.len(), 1);
                assert_eq!(overrides[0].bus_id, BusId(7));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_ledger_never_reaches_service() {
        let (mut driver, mock) = driver();
        driver.handle(Event::Optimize).await;

        let notices = driver.handle(Event::Finalize).await;
        assert_eq!(notices, vec![Notice::warning("No locked routes")]);
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_re_enables_and_shows_baseline() {
        let (mut driver, mock) = driver();
        driver.handle(Event::LoadStops).await;
        mock.fail_next(EditorError::Transport("connection refused".into()));

        let notices = driver.handle(Event::Optimize).await;
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(!driver.context().requests.is_in_flight(RequestKind::Optimize));
        assert_eq!(driver.context().view(), super::super::View::Baseline);

        // The control works again after the failure
        let notices = driver.handle(Event::Optimize).await;
        assert_eq!(notices[0].level, NoticeLevel::Info);
    }

    #[tokio::test]
    async fn test_no_solution_outcome() {
        let ctx = context();
        let mock = MockOptimizationService::new(ctx.baseline.clone(), None);
        let mut driver = Driver::new(ctx, Arc::new(mock));

        let notices = driver.handle(Event::Optimize).await;
        assert_eq!(notices, vec![Notice::error("No solution found")]);
        assert!(driver.context().solution.is_none());
    }

    #[tokio::test]
    async fn test_apply_edits_acknowledged() {
        let (mut driver, _mock) = driver();
        driver.handle(Event::Optimize).await;
        driver.handle(Event::ToggleLock { bus_id: BusId(8), locked: true }).await;

        let notices = driver.handle(Event::SubmitEdits).await;
        assert_eq!(
            notices[0].message,
            "Optimizer accepted the edits: Received 1 modified routes"
        );
    }
}
