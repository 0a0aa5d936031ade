//! Lock toggles and route visibility

use tracing::info;

use super::{notify, AppContext, HandlerResult, Notice};
use crate::services::overlay::MapSurface;
use crate::types::{BusId, EditorError};

pub(super) fn handle_toggle_lock<M: MapSurface>(
    ctx: &mut AppContext<M>,
    bus_id: BusId,
    locked: bool,
) -> HandlerResult {
    if ctx.editor.editing_bus() == Some(bus_id) {
        return Err(EditorError::InvalidOperation(format!(
            "bus #{} is being edited; commit or cancel first",
            bus_id
        )));
    }
    let Some(displayed) = ctx.displayed.get(&bus_id) else {
        return Err(EditorError::InvalidOperation(format!(
            "bus #{} is not part of the current solution",
            bus_id
        )));
    };

    let was_locked = ctx.ledger.has(bus_id);
    ctx.ledger.toggle(bus_id, locked, displayed);
    info!("Bus #{} {}", bus_id, if locked { "locked" } else { "unlocked" });

    let message = match (locked, was_locked) {
        (true, true) => format!("Bus #{} is already locked", bus_id),
        (true, false) => format!("Bus #{} locked as shown ({} stops)", bus_id, displayed.len()),
        (false, true) => format!("Bus #{} unlocked", bus_id),
        (false, false) => format!("Bus #{} was not locked", bus_id),
    };
    Ok(vec![notify(Notice::info(message))])
}

pub(super) fn handle_set_visible<M: MapSurface>(
    ctx: &mut AppContext<M>,
    bus_id: Option<BusId>,
    visible: bool,
) -> HandlerResult {
    let changed = match bus_id {
        Some(bus_id) => ctx.overlays.set_route_visible(bus_id, visible),
        None => ctx.overlays.set_all_routes_visible(visible),
    };

    let state = if visible { "shown" } else { "hidden" };
    let notice = match (bus_id, changed) {
        (Some(bus_id), 0) => Notice::warning(format!("No route drawn for bus #{}", bus_id)),
        (Some(bus_id), n) => Notice::info(format!("Bus #{}: {} path segments {}", bus_id, n, state)),
        (None, n) => Notice::info(format!("All routes: {} path segments {}", n, state)),
    };
    Ok(vec![notify(notice)])
}
