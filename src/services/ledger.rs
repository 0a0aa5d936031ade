//! Route lock ledger
//!
//! Maps a bus to the stop sequence the next re-optimization must keep
//! verbatim. Entries keep their insertion order so that the override list
//! (and therefore the request body) is reproducible.

use indexmap::IndexMap;
use tracing::debug;

use crate::types::{BusId, LockEntry, Stop};

#[derive(Debug, Clone, Default)]
pub struct RouteLockLedger {
    entries: IndexMap<BusId, Vec<Stop>>,
}

impl RouteLockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the override for `bus_id`. A replaced entry keeps
    /// its original position.
    pub fn set(&mut self, bus_id: BusId, stops: Vec<Stop>) {
        debug!("Locking bus #{} with {} stops", bus_id, stops.len());
        self.entries.insert(bus_id, stops);
    }

    pub fn remove(&mut self, bus_id: BusId) -> Option<Vec<Stop>> {
        let removed = self.entries.shift_remove(&bus_id);
        if removed.is_some() {
            debug!("Unlocked bus #{}", bus_id);
        }
        removed
    }

    pub fn has(&self, bus_id: BusId) -> bool {
        self.entries.contains_key(&bus_id)
    }

    pub fn get(&self, bus_id: BusId) -> Option<&[Stop]> {
        self.entries.get(&bus_id).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Every entry exactly once, in insertion order
    pub fn to_override_list(&self) -> Vec<LockEntry> {
        self.entries
            .iter()
            .map(|(bus_id, stops)| LockEntry {
                bus_id: *bus_id,
                stops: stops.clone(),
            })
            .collect()
    }

    /// Apply the "locked" checkbox of a route.
    ///
    /// Unlocking removes the entry. Locking keeps an existing override and
    /// otherwise locks the route as currently displayed.
    pub fn toggle(&mut self, bus_id: BusId, locked: bool, displayed: &[Stop]) {
        if !locked {
            self.remove(bus_id);
        } else if !self.has(bus_id) {
            self.set(bus_id, displayed.to_vec());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str) -> Stop {
        Stop {
            id: id.to_string(),
            name: id.to_string(),
            demand: 1,
            lat: 0.0,
            lon: 0.0,
            arrival_time: 0,
            current_load: 0,
        }
    }

    fn ids(entry: &LockEntry) -> Vec<&str> {
        entry.stops.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = RouteLockLedger::new();
        assert!(ledger.is_empty());
        assert!(!ledger.has(BusId(1)));
        assert!(ledger.to_override_list().is_empty());
    }

    #[test]
    fn test_override_list_in_insertion_order() {
        let mut ledger = RouteLockLedger::new();
        ledger.set(BusId(9), vec![stop("A")]);
        ledger.set(BusId(2), vec![stop("B")]);
        ledger.set(BusId(5), vec![stop("C")]);

        let order: Vec<_> = ledger.to_override_list().iter().map(|e| e.bus_id).collect();
        assert_eq!(order, vec![BusId(9), BusId(2), BusId(5)]);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut ledger = RouteLockLedger::new();
        ledger.set(BusId(1), vec![stop("A")]);
        ledger.set(BusId(2), vec![stop("B")]);
        ledger.set(BusId(1), vec![stop("X"), stop("Y")]);

        let list = ledger.to_override_list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].bus_id, BusId(1));
        assert_eq!(ids(&list[0]), vec!["X", "Y"]);
    }

    #[test]
    fn test_remove_keeps_order_of_the_rest() {
        let mut ledger = RouteLockLedger::new();
        ledger.set(BusId(1), vec![]);
        ledger.set(BusId(2), vec![]);
        ledger.set(BusId(3), vec![]);

        assert!(ledger.remove(BusId(2)).is_some());
        assert!(ledger.remove(BusId(2)).is_none());

        let order: Vec<_> = ledger.to_override_list().iter().map(|e| e.bus_id).collect();
        assert_eq!(order, vec![BusId(1), BusId(3)]);
    }

    #[test]
    fn test_override_count_matches_distinct_live_ids() {
        let mut ledger = RouteLockLedger::new();
        let ops: &[(u32, bool)] = &[(1, true), (2, true), (1, true), (3, true), (2, false), (4, true), (4, false), (5, true)];
        let mut live = std::collections::HashSet::new();
        for &(id, set) in ops {
            if set {
                ledger.set(BusId(id), vec![stop("S")]);
                live.insert(id);
            } else {
                ledger.remove(BusId(id));
                live.remove(&id);
            }
            assert_eq!(ledger.to_override_list().len(), live.len());
        }
    }

    #[test]
    fn test_toggle_on_locks_displayed_route() {
        let mut ledger = RouteLockLedger::new();
        ledger.toggle(BusId(4), true, &[stop("DEPOT"), stop("A"), stop("DEPOT")]);

        assert!(ledger.has(BusId(4)));
        assert_eq!(ledger.get(BusId(4)).unwrap().len(), 3);
    }

    #[test]
    fn test_toggle_on_keeps_existing_override() {
        let mut ledger = RouteLockLedger::new();
        ledger.set(BusId(4), vec![stop("DEPOT"), stop("B")]);
        ledger.toggle(BusId(4), true, &[stop("DEPOT"), stop("A"), stop("C")]);

        let stops: Vec<_> = ledger.get(BusId(4)).unwrap().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(stops, vec!["DEPOT", "B"]);
    }

    #[test]
    fn test_toggle_off_removes() {
        let mut ledger = RouteLockLedger::new();
        ledger.set(BusId(4), vec![stop("A")]);
        ledger.toggle(BusId(4), false, &[]);
        assert!(!ledger.has(BusId(4)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut ledger = RouteLockLedger::new();
        ledger.set(BusId(1), vec![]);
        ledger.set(BusId(2), vec![]);
        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
    }
}
