//! Errors surfaced to the dispatcher

use thiserror::Error;

use super::{BusId, RequestKind};

/// Every failure is recovered at the boundary of the operation that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    /// Network failure, non-2xx status or undecodable body
    #[error("Transport error: {0}")]
    Transport(String),
    /// Well-formed response without any routes
    #[error("No solution found")]
    NoSolution,
    #[error("Route #{active} is already being edited; commit or cancel it first")]
    EditConflict { active: BusId },
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("No stop with id '{0}' in the route being edited")]
    AnchorNotFound(String),
    #[error("No locked routes")]
    EmptyLedger,
    #[error("The {0} request is still in progress")]
    RequestInFlight(RequestKind),
}

impl From<reqwest::Error> for EditorError {
    fn from(err: reqwest::Error) -> Self {
        EditorError::Transport(err.to_string())
    }
}
