//! Exclusive route editing
//!
//! `RouteEditor` is either idle or holds exactly one `EditSession`. Stop
//! edits are methods on the session itself, so they cannot be issued while
//! idle; `commit` and `cancel` consume the session.

use tracing::{debug, info};

use crate::services::ledger::RouteLockLedger;
use crate::types::{BusId, DepotRule, EditorError, Stop};

/// Editing transaction over one route's stop sequence
#[derive(Debug, Clone)]
pub struct EditSession {
    bus_id: BusId,
    original_stops: Vec<Stop>,
    working_stops: Vec<Stop>,
    depot: DepotRule,
}

impl EditSession {
    pub fn bus_id(&self) -> BusId {
        self.bus_id
    }

    /// Snapshot taken when the session started
    pub fn original_stops(&self) -> &[Stop] {
        &self.original_stops
    }

    pub fn working_stops(&self) -> &[Stop] {
        &self.working_stops
    }

    /// Remove the stop at `index`. Depots and out-of-range indices are
    /// rejected and leave the working copy untouched.
    pub fn remove_stop(&mut self, index: usize) -> Result<Stop, EditorError> {
        let stop = self.working_stops.get(index).ok_or_else(|| {
            EditorError::InvalidOperation(format!(
                "stop index {} is out of range (route has {} stops)",
                index,
                self.working_stops.len()
            ))
        })?;

        if self.depot.is_depot(stop) {
            return Err(EditorError::InvalidOperation(format!(
                "depot stop '{}' cannot be removed",
                stop.name
            )));
        }

        let removed = self.working_stops.remove(index);
        debug!("Bus #{}: removed stop '{}' at {}", self.bus_id, removed.id, index);
        Ok(removed)
    }

    /// Insert `stop` immediately before the first stop with id
    /// `before_stop_id`. Returns the index the stop now occupies.
    pub fn insert_stop(&mut self, stop: Stop, before_stop_id: &str) -> Result<usize, EditorError> {
        let index = self
            .working_stops
            .iter()
            .position(|s| s.id == before_stop_id)
            .ok_or_else(|| EditorError::AnchorNotFound(before_stop_id.to_string()))?;

        debug!(
            "Bus #{}: inserting stop '{}' before '{}' at {}",
            self.bus_id, stop.id, before_stop_id, index
        );
        self.working_stops.insert(index, stop);
        Ok(index)
    }

    /// Write the working copy into the ledger and end the session.
    pub fn commit(self, ledger: &mut RouteLockLedger) -> Vec<Stop> {
        info!("Committed edit of bus #{} ({} stops)", self.bus_id, self.working_stops.len());
        ledger.set(self.bus_id, self.working_stops.clone());
        self.working_stops
    }

    /// Drop the working copy. Returns the original snapshot for display.
    pub fn cancel(self) -> Vec<Stop> {
        info!("Cancelled edit of bus #{}", self.bus_id);
        self.original_stops
    }
}

/// Holds the single active edit session, if any
#[derive(Debug, Default)]
pub struct RouteEditor {
    active: Option<EditSession>,
}

impl RouteEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing `bus_id`. Fails with `EditConflict` while any session
    /// (for this or another bus) is active, without touching it.
    pub fn start_edit(
        &mut self,
        bus_id: BusId,
        stops: &[Stop],
        depot: &DepotRule,
    ) -> Result<&mut EditSession, EditorError> {
        if let Some(active) = &self.active {
            return Err(EditorError::EditConflict { active: active.bus_id });
        }

        info!("Editing bus #{} ({} stops)", bus_id, stops.len());
        Ok(self.active.insert(EditSession {
            bus_id,
            original_stops: stops.to_vec(),
            working_stops: stops.to_vec(),
            depot: depot.clone(),
        }))
    }

    pub fn is_editing(&self) -> bool {
        self.active.is_some()
    }

    pub fn editing_bus(&self) -> Option<BusId> {
        self.active.as_ref().map(|s| s.bus_id)
    }

    pub fn active(&self) -> Option<&EditSession> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut EditSession> {
        self.active.as_mut()
    }

    /// End the session, handing it to the caller to commit or cancel
    pub fn take(&mut self) -> Option<EditSession> {
        self.active.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str) -> Stop {
        Stop {
            id: id.to_string(),
            name: format!("Stop {}", id),
            demand: 2,
            lat: 37.5,
            lon: 127.0,
            arrival_time: 480,
            current_load: 0,
        }
    }

    fn route() -> Vec<Stop> {
        vec![stop("DEPOT"), stop("A"), stop("B"), stop("DEPOT_END")]
    }

    fn ids(stops: &[Stop]) -> Vec<&str> {
        stops.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_start_edit_copies_stops() {
        let mut editor = RouteEditor::new();
        let session = editor.start_edit(BusId(7), &route(), &DepotRule::default()).unwrap();

        assert_eq!(session.bus_id(), BusId(7));
        assert_eq!(session.original_stops(), session.working_stops());
        assert!(editor.is_editing());
        assert_eq!(editor.editing_bus(), Some(BusId(7)));
    }

    #[test]
    fn test_second_start_is_rejected_without_side_effects() {
        let depot = DepotRule::default();
        let mut editor = RouteEditor::new();
        editor.start_edit(BusId(7), &route(), &depot).unwrap();
        editor.active_mut().unwrap().remove_stop(1).unwrap();

        for other in [BusId(8), BusId(7)] {
            let err = editor.start_edit(other, &[stop("Z")], &depot).unwrap_err();
            assert_eq!(err, EditorError::EditConflict { active: BusId(7) });
        }

        let session = editor.active().unwrap();
        assert_eq!(session.bus_id(), BusId(7));
        assert_eq!(ids(session.working_stops()), vec!["DEPOT", "B", "DEPOT_END"]);
        assert_eq!(session.original_stops().len(), 4);
    }

    #[test]
    fn test_remove_depot_rejected() {
        let mut editor = RouteEditor::new();
        let session = editor.start_edit(BusId(1), &route(), &DepotRule::default()).unwrap();

        for index in [0, 3] {
            let err = session.remove_stop(index).unwrap_err();
            assert!(matches!(err, EditorError::InvalidOperation(_)));
        }
        assert_eq!(session.working_stops().len(), 4);
    }

    #[test]
    fn test_remove_out_of_range_rejected() {
        let mut editor = RouteEditor::new();
        let session = editor.start_edit(BusId(1), &route(), &DepotRule::default()).unwrap();

        let err = session.remove_stop(4).unwrap_err();
        assert!(matches!(err, EditorError::InvalidOperation(ref msg) if msg.contains("out of range")));
        assert_eq!(ids(session.working_stops()), ids(&route()));
    }

    #[test]
    fn test_remove_preserves_relative_order() {
        let stops = vec![stop("DEPOT"), stop("A"), stop("B"), stop("C"), stop("DEPOT")];
        let mut editor = RouteEditor::new();
        let session = editor.start_edit(BusId(1), &stops, &DepotRule::default()).unwrap();

        let removed = session.remove_stop(2).unwrap();
        assert_eq!(removed.id, "B");
        assert_eq!(ids(session.working_stops()), vec!["DEPOT", "A", "C", "DEPOT"]);
    }

    #[test]
    fn test_insert_before_anchor() {
        let mut editor = RouteEditor::new();
        let session = editor.start_edit(BusId(1), &route(), &DepotRule::default()).unwrap();

        let index = session.insert_stop(stop("X"), "B").unwrap();
        assert_eq!(index, 2);
        assert_eq!(ids(session.working_stops()), vec!["DEPOT", "A", "X", "B", "DEPOT_END"]);
    }

    #[test]
    fn test_insert_before_first_stop() {
        let mut editor = RouteEditor::new();
        let session = editor.start_edit(BusId(1), &route(), &DepotRule::default()).unwrap();

        assert_eq!(session.insert_stop(stop("X"), "DEPOT").unwrap(), 0);
        assert_eq!(session.working_stops()[0].id, "X");
    }

    #[test]
    fn test_insert_missing_anchor_rejected() {
        let mut editor = RouteEditor::new();
        let session = editor.start_edit(BusId(1), &route(), &DepotRule::default()).unwrap();

        let err = session.insert_stop(stop("X"), "NOPE").unwrap_err();
        assert_eq!(err, EditorError::AnchorNotFound("NOPE".to_string()));
        assert_eq!(ids(session.working_stops()), ids(&route()));
    }

    #[test]
    fn test_edit_scenario_commit_writes_working_stops() {
        let stops = vec![stop("DEPOT_D"), stop("A"), stop("B"), stop("DEPOT_E")];
        let mut ledger = RouteLockLedger::new();
        let mut editor = RouteEditor::new();
        let session = editor.start_edit(BusId(7), &stops, &DepotRule::default()).unwrap();

        session.remove_stop(1).unwrap();
        assert_eq!(ids(session.working_stops()), vec!["DEPOT_D", "B", "DEPOT_E"]);
        session.insert_stop(stop("C"), "DEPOT_E").unwrap();
        assert_eq!(ids(session.working_stops()), vec!["DEPOT_D", "B", "C", "DEPOT_E"]);

        let committed = editor.take().unwrap().commit(&mut ledger);

        assert!(!editor.is_editing());
        assert_eq!(ids(&committed), vec!["DEPOT_D", "B", "C", "DEPOT_E"]);
        assert_eq!(ids(ledger.get(BusId(7)).unwrap()), vec!["DEPOT_D", "B", "C", "DEPOT_E"]);
    }

    #[test]
    fn test_commit_without_edits_still_locks() {
        let mut ledger = RouteLockLedger::new();
        let mut editor = RouteEditor::new();
        editor.start_edit(BusId(3), &route(), &DepotRule::default()).unwrap();

        editor.take().unwrap().commit(&mut ledger);
        assert!(ledger.has(BusId(3)));
    }

    #[test]
    fn test_cancel_returns_original_and_leaves_ledger() {
        let mut ledger = RouteLockLedger::new();
        ledger.set(BusId(2), vec![stop("Q")]);
        let mut editor = RouteEditor::new();
        let session = editor.start_edit(BusId(7), &route(), &DepotRule::default()).unwrap();
        session.remove_stop(1).unwrap();
        session.insert_stop(stop("X"), "DEPOT_END").unwrap();

        let shown = editor.take().unwrap().cancel();

        assert_eq!(ids(&shown), ids(&route()));
        assert!(!editor.is_editing());
        assert!(!ledger.has(BusId(7)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_new_session_allowed_after_commit_or_cancel() {
        let depot = DepotRule::default();
        let mut ledger = RouteLockLedger::new();
        let mut editor = RouteEditor::new();

        editor.start_edit(BusId(1), &route(), &depot).unwrap();
        editor.take().unwrap().cancel();
        editor.start_edit(BusId(2), &route(), &depot).unwrap();
        editor.take().unwrap().commit(&mut ledger);
        assert!(editor.start_edit(BusId(3), &route(), &depot).is_ok());
    }
}
