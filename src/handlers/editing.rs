//! Route edit session handlers

use tracing::info;

use super::{notify, AppContext, Effect, HandlerResult, Notice};
use crate::services::edit_session::EditSession;
use crate::services::overlay::MapSurface;
use crate::services::validation::validate_override;
use crate::types::{BusId, EditorError, Stop};

/// Session commands only reach the dispatcher while editing; the shell
/// filters them otherwise.
fn active_session<'a, M: MapSurface>(ctx: &'a mut AppContext<M>, command: &str) -> &'a mut EditSession {
    match ctx.editor.active_mut() {
        Some(session) => session,
        None => panic!("{} dispatched while no route is being edited", command),
    }
}

fn take_session<M: MapSurface>(ctx: &mut AppContext<M>, command: &str) -> EditSession {
    match ctx.editor.take() {
        Some(session) => session,
        None => panic!("{} dispatched while no route is being edited", command),
    }
}

fn working_list(session: &EditSession) -> Vec<Effect> {
    session
        .working_stops()
        .iter()
        .enumerate()
        .map(|(i, stop)| notify(Notice::info(format!("  {:>2}. {} ({})", i, stop.id, stop.name))))
        .collect()
}

pub(super) fn handle_start_edit<M: MapSurface>(ctx: &mut AppContext<M>, bus_id: BusId) -> HandlerResult {
    if let Some(active) = ctx.editor.editing_bus() {
        return Err(EditorError::EditConflict { active });
    }
    let solution = ctx.solution.as_ref().ok_or(EditorError::NoSolution)?;
    if solution.route(bus_id).is_none() {
        return Err(EditorError::InvalidOperation(format!(
            "bus #{} is not part of the current solution",
            bus_id
        )));
    }

    let stops: Vec<Stop> = ctx.displayed_stops(bus_id).unwrap_or_default().to_vec();
    let session = ctx.editor.start_edit(bus_id, &stops, &ctx.depot)?;

    let mut effects = vec![notify(Notice::info(format!(
        "Editing bus #{} ({} stops)",
        bus_id,
        session.working_stops().len()
    )))];
    effects.extend(working_list(session));
    Ok(effects)
}

pub(super) fn handle_remove_stop<M: MapSurface>(ctx: &mut AppContext<M>, index: usize) -> HandlerResult {
    let session = active_session(ctx, "RemoveStop");
    let removed = session.remove_stop(index)?;

    let mut effects = vec![notify(Notice::info(format!("Removed {} ({})", removed.id, removed.name)))];
    effects.extend(working_list(session));
    Ok(effects)
}

pub(super) fn handle_insert_stop<M: MapSurface>(
    ctx: &mut AppContext<M>,
    stop_id: &str,
    before_stop_id: &str,
) -> HandlerResult {
    let stop = ctx.find_stop(stop_id);
    let session = active_session(ctx, "InsertStop");
    let stop = stop.ok_or_else(|| EditorError::InvalidOperation(format!("unknown stop '{}'", stop_id)))?;
    let index = session.insert_stop(stop, before_stop_id)?;

    let mut effects = vec![notify(Notice::info(format!(
        "Inserted {} at position {}",
        stop_id, index
    )))];
    effects.extend(working_list(session));
    Ok(effects)
}

/// Lock the working copy, check it locally and redraw
pub(super) fn handle_commit<M: MapSurface>(ctx: &mut AppContext<M>) -> HandlerResult {
    let session = take_session(ctx, "CommitEdit");
    let bus_id = session.bus_id();
    let check = validate_override(bus_id, session.working_stops(), ctx.params.capacity, &ctx.depot);

    let stops = session.commit(&mut ctx.ledger);
    let count = stops.len();
    ctx.displayed.insert(bus_id, stops);
    ctx.show_solution();

    let check_notice = if check.capacity_valid {
        Notice::info(check.message)
    } else {
        Notice::warning(check.message)
    };
    Ok(vec![
        notify(Notice::info(format!("Bus #{} locked with {} stops", bus_id, count))),
        notify(check_notice),
    ])
}

pub(super) fn handle_cancel<M: MapSurface>(ctx: &mut AppContext<M>) -> HandlerResult {
    let session = take_session(ctx, "CancelEdit");
    let bus_id = session.bus_id();
    let original = session.cancel();
    ctx.displayed.insert(bus_id, original);
    ctx.show_solution();

    info!("Display of bus #{} restored", bus_id);
    Ok(vec![notify(Notice::info(format!("Edit of bus #{} cancelled", bus_id)))])
}
