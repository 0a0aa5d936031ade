//! Event handlers
//!
//! `dispatch` applies one event to the application context and returns the
//! effects the caller has to carry out: notices for the user and requests
//! for the optimization service. Handlers never block and never touch the
//! network themselves; `Driver` runs the requests and feeds the outcome
//! back in as completion events.

pub mod context;
pub mod driver;
mod editing;
mod locks;
mod optimize;
mod polygons;

use std::fmt;

use tracing::warn;

pub use context::{AppContext, View};
pub use driver::Driver;

use crate::services::overlay::MapSurface;
use crate::services::requests::RequestTicket;
use crate::types::{BusId, EditorError, LockEntry, OptimizeParams, Polygon, Solution, Stop};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Fetch the baseline stop set
    LoadStops,
    StopsLoaded {
        ticket: RequestTicket,
        result: Result<Vec<Stop>, EditorError>,
    },
    Optimize,
    /// Completion of an optimize or re-optimize request
    SolutionReady {
        ticket: RequestTicket,
        result: Result<Solution, EditorError>,
    },
    /// Redraw the current solution and list its routes
    ShowSolution,
    StartEdit {
        bus_id: BusId,
    },
    RemoveStop {
        index: usize,
    },
    InsertStop {
        stop_id: String,
        before_stop_id: String,
    },
    CommitEdit,
    CancelEdit,
    ToggleLock {
        bus_id: BusId,
        locked: bool,
    },
    /// `bus_id: None` applies to every route
    SetRouteVisible {
        bus_id: Option<BusId>,
        visible: bool,
    },
    /// Re-optimize with every locked route as an override
    Finalize,
    SubmitEdits,
    EditsSubmitted {
        ticket: RequestTicket,
        result: Result<String, EditorError>,
    },
    PolygonDrawn(Polygon),
    ListPolygonStops,
    DescribePolygons,
    ClearPolygons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl From<EditorError> for Notice {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::Transport(_) | EditorError::NoSolution => Notice::error(err.to_string()),
            _ => Notice::warning(err.to_string()),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{}", self.message),
            NoticeLevel::Warning => write!(f, "warning: {}", self.message),
            NoticeLevel::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// Network call to make on behalf of a handler
#[derive(Debug, Clone, PartialEq)]
pub enum RequestCall {
    LoadStops { db_name: String },
    Optimize(OptimizeParams),
    Reoptimize { overrides: Vec<LockEntry>, params: OptimizeParams },
    SubmitEdits { overrides: Vec<LockEntry>, params: OptimizeParams },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub ticket: RequestTicket,
    pub call: RequestCall,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notice),
    Request(PendingRequest),
}

type HandlerResult = Result<Vec<Effect>, EditorError>;

/// Apply `event` to `ctx`. Recoverable failures become notices; the state
/// they leave behind is whatever the handler guaranteed before failing.
pub fn dispatch<M: MapSurface>(ctx: &mut AppContext<M>, event: Event) -> Vec<Effect> {
    let result = match event {
        Event::LoadStops => optimize::handle_load_stops(ctx),
        Event::StopsLoaded { ticket, result } => optimize::handle_stops_loaded(ctx, ticket, result),
        Event::Optimize => optimize::handle_optimize(ctx),
        Event::SolutionReady { ticket, result } => optimize::handle_solution_ready(ctx, ticket, result),
        Event::ShowSolution => optimize::handle_show_solution(ctx),
        Event::Finalize => optimize::handle_finalize(ctx),
        Event::SubmitEdits => optimize::handle_submit_edits(ctx),
        Event::EditsSubmitted { ticket, result } => optimize::handle_edits_submitted(ctx, ticket, result),
        Event::StartEdit { bus_id } => editing::handle_start_edit(ctx, bus_id),
        Event::RemoveStop { index } => editing::handle_remove_stop(ctx, index),
        Event::InsertStop { stop_id, before_stop_id } => {
            editing::handle_insert_stop(ctx, &stop_id, &before_stop_id)
        }
        Event::CommitEdit => editing::handle_commit(ctx),
        Event::CancelEdit => editing::handle_cancel(ctx),
        Event::ToggleLock { bus_id, locked } => locks::handle_toggle_lock(ctx, bus_id, locked),
        Event::SetRouteVisible { bus_id, visible } => locks::handle_set_visible(ctx, bus_id, visible),
        Event::PolygonDrawn(polygon) => polygons::handle_polygon_drawn(ctx, polygon),
        Event::ListPolygonStops => polygons::handle_list_stops(ctx),
        Event::DescribePolygons => polygons::handle_describe(ctx),
        Event::ClearPolygons => polygons::handle_clear(ctx),
    };

    match result {
        Ok(effects) => effects,
        Err(e) => {
            warn!("Event rejected: {}", e);
            vec![Effect::Notify(e.into())]
        }
    }
}

fn notify(notice: Notice) -> Effect {
    Effect::Notify(notice)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_notice_levels_for_errors() {
        assert_eq!(Notice::from(EditorError::NoSolution).level, NoticeLevel::Error);
        assert_eq!(
            Notice::from(EditorError::Transport("timeout".into())).level,
            NoticeLevel::Error
        );
        assert_eq!(Notice::from(EditorError::EmptyLedger).level, NoticeLevel::Warning);
        assert_eq!(
            Notice::from(EditorError::EditConflict { active: BusId(3) }).level,
            NoticeLevel::Warning
        );
    }

    #[test]
    fn test_notice_display_prefix() {
        assert_eq!(Notice::info("ok").to_string(), "ok");
        assert_eq!(Notice::warning("careful").to_string(), "warning: careful");
        assert_eq!(Notice::error("broken").to_string(), "error: broken");
    }

    #[test]
    fn test_rejected_event_becomes_single_notice() {
        let mut ctx = context();
        let effects = dispatch(&mut ctx, Event::Finalize);
        assert_eq!(effects, vec![Effect::Notify(Notice::warning("No locked routes"))]);
    }
}
