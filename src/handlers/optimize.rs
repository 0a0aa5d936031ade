//! Stop loading, optimization, finalize and apply-edits

use tracing::{debug, error, info};

use super::{notify, AppContext, Effect, HandlerResult, Notice, PendingRequest, RequestCall};
use crate::services::overlay::MapSurface;
use crate::services::requests::RequestTicket;
use crate::services::schedule::{format_minutes, route_summary};
use crate::types::{EditorError, RequestKind, Solution, Stop};

fn request<M: MapSurface>(ctx: &mut AppContext<M>, kind: RequestKind, call: RequestCall) -> HandlerResult {
    let ticket = ctx.requests.begin(kind)?;
    Ok(vec![Effect::Request(PendingRequest { ticket, call })])
}

pub(super) fn handle_load_stops<M: MapSurface>(ctx: &mut AppContext<M>) -> HandlerResult {
    let db_name = ctx.params.db_name.clone();
    request(ctx, RequestKind::LoadStops, RequestCall::LoadStops { db_name })
}

pub(super) fn handle_stops_loaded<M: MapSurface>(
    ctx: &mut AppContext<M>,
    ticket: RequestTicket,
    result: Result<Vec<Stop>, EditorError>,
) -> HandlerResult {
    if !ctx.requests.complete(ticket) {
        return Ok(vec![]);
    }

    match result {
        Ok(stops) => {
            info!("Baseline now has {} stops", stops.len());
            ctx.baseline = stops;
            ctx.show_baseline();
            Ok(vec![notify(Notice::info(format!(
                "Loaded {} stops from {}",
                ctx.baseline.len(),
                ctx.params.db_name
            )))])
        }
        Err(e) => Err(reset_to_baseline(ctx, e)),
    }
}

pub(super) fn handle_optimize<M: MapSurface>(ctx: &mut AppContext<M>) -> HandlerResult {
    let params = ctx.params.clone();
    request(ctx, RequestKind::Optimize, RequestCall::Optimize(params))
}

pub(super) fn handle_solution_ready<M: MapSurface>(
    ctx: &mut AppContext<M>,
    ticket: RequestTicket,
    result: Result<Solution, EditorError>,
) -> HandlerResult {
    if !ctx.requests.complete(ticket) {
        return Ok(vec![]);
    }

    let solution = result.map_err(|e| reset_to_baseline(ctx, e))?;
    let mut effects = Vec::new();

    if let Some(session) = ctx.editor.take() {
        let bus_id = session.bus_id();
        session.cancel();
        effects.push(notify(Notice::warning(format!(
            "Edit of bus #{} discarded: a new solution arrived",
            bus_id
        ))));
    }

    effects.push(notify(Notice::info(format!(
        "{} finished: {} buses, total time {} min",
        ticket.kind, solution.used_bus_count, solution.total_objective_cost
    ))));
    ctx.replace_solution(solution);
    ctx.show_solution();
    Ok(effects)
}

pub(super) fn handle_show_solution<M: MapSurface>(ctx: &mut AppContext<M>) -> HandlerResult {
    ctx.show_solution();
    let Some(solution) = ctx.view_solution() else {
        return Err(EditorError::NoSolution);
    };

    let mut effects = Vec::new();
    for route in &solution.routes {
        let mut summary = route_summary(route);
        if ctx.ledger.has(route.bus_id) {
            summary.push_str(" [locked]");
        }
        if ctx.editor.editing_bus() == Some(route.bus_id) {
            summary.push_str(" [editing]");
        }
        effects.push(notify(Notice::info(summary)));
        effects.extend(route.stops.iter().enumerate().map(|(i, stop)| {
            notify(Notice::info(format!(
                "  {:>2}. {:<10} {:<28} {}  load {}",
                i,
                stop.id,
                stop.name,
                format_minutes(stop.arrival_time),
                stop.current_load
            )))
        }));
    }
    Ok(effects)
}

pub(super) fn handle_finalize<M: MapSurface>(ctx: &mut AppContext<M>) -> HandlerResult {
    if let Some(active) = ctx.editor.editing_bus() {
        return Err(EditorError::EditConflict { active });
    }
    if ctx.ledger.is_empty() {
        return Err(EditorError::EmptyLedger);
    }

    let overrides = ctx.ledger.to_override_list();
    debug!("Finalizing with {} locked routes", overrides.len());
    let params = ctx.params.clone();
    request(ctx, RequestKind::Reoptimize, RequestCall::Reoptimize { overrides, params })
}

pub(super) fn handle_submit_edits<M: MapSurface>(ctx: &mut AppContext<M>) -> HandlerResult {
    if ctx.ledger.is_empty() {
        return Err(EditorError::EmptyLedger);
    }

    let overrides = ctx.ledger.to_override_list();
    let params = ctx.params.clone();
    request(ctx, RequestKind::SubmitEdits, RequestCall::SubmitEdits { overrides, params })
}

pub(super) fn handle_edits_submitted<M: MapSurface>(
    ctx: &mut AppContext<M>,
    ticket: RequestTicket,
    result: Result<String, EditorError>,
) -> HandlerResult {
    if !ctx.requests.complete(ticket) {
        return Ok(vec![]);
    }

    let ack = result?;
    info!("Optimizer acknowledged edits: {}", ack);
    Ok(vec![notify(Notice::info(format!("Optimizer accepted the edits: {}", ack)))])
}

/// Failed solution requests leave the solution and ledger alone and fall
/// back to the baseline stops on the map.
fn reset_to_baseline<M: MapSurface>(ctx: &mut AppContext<M>, err: EditorError) -> EditorError {
    error!("Request failed, showing baseline stops: {}", err);
    ctx.show_baseline();
    err
}
