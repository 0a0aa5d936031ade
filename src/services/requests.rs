//! Request generations and in-flight tracking
//!
//! Each request gets a generation from a monotonically increasing counter.
//! Requests are grouped by what their response replaces: optimize and
//! re-optimize both replace the solution, loading replaces the baseline and
//! apply-edits only reports. A completion is dropped only when a newer
//! request of its own group was issued. At most one request per kind is
//! outstanding at a time.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::types::{EditorError, RequestKind};

/// Proof that a request was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub kind: RequestKind,
    pub generation: u64,
}

/// What a response of a request kind overwrites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ResponseSlot {
    Baseline,
    Solution,
    EditsAck,
}

impl From<RequestKind> for ResponseSlot {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::LoadStops => ResponseSlot::Baseline,
            RequestKind::Optimize | RequestKind::Reoptimize => ResponseSlot::Solution,
            RequestKind::SubmitEdits => ResponseSlot::EditsAck,
        }
    }
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    issued: u64,
    latest: HashMap<ResponseSlot, u64>,
    in_flight: HashMap<RequestKind, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new generation for `kind`. Fails while a request of the
    /// same kind is still outstanding.
    pub fn begin(&mut self, kind: RequestKind) -> Result<RequestTicket, EditorError> {
        if self.in_flight.contains_key(&kind) {
            return Err(EditorError::RequestInFlight(kind));
        }
        self.issued += 1;
        self.in_flight.insert(kind, self.issued);
        self.latest.insert(ResponseSlot::from(kind), self.issued);
        debug!("Issued {} request generation {}", kind, self.issued);
        Ok(RequestTicket {
            kind,
            generation: self.issued,
        })
    }

    /// Settle `ticket`. Always re-enables its kind; returns whether the
    /// response is current and may be applied.
    pub fn complete(&mut self, ticket: RequestTicket) -> bool {
        if self.in_flight.get(&ticket.kind) == Some(&ticket.generation) {
            self.in_flight.remove(&ticket.kind);
        }
        let latest = self.latest_for(ticket.kind);
        let current = ticket.generation == latest;
        if !current {
            warn!(
                "Dropping stale {} response (generation {}, latest {})",
                ticket.kind, ticket.generation, latest
            );
        }
        current
    }

    pub fn is_in_flight(&self, kind: RequestKind) -> bool {
        self.in_flight.contains_key(&kind)
    }

    /// Newest generation issued to a request whose response overwrites the
    /// same state as `kind`
    pub fn latest_for(&self, kind: RequestKind) -> u64 {
        self.latest.get(&ResponseSlot::from(kind)).copied().unwrap_or(0)
    }
}
