//! User-drawn polygon handlers
//!
//! Only the first drawn polygon selects stops; later ones are kept for the
//! drawing report.

use tracing::debug;

use super::{notify, AppContext, HandlerResult, Notice};
use crate::services::geo::collect_inside;
use crate::services::overlay::MapSurface;
use crate::types::Polygon;

pub(super) fn handle_polygon_drawn<M: MapSurface>(ctx: &mut AppContext<M>, polygon: Polygon) -> HandlerResult {
    let vertices = polygon.vertices().len();
    ctx.polygons.push(polygon);
    debug!("Polygon #{} drawn with {} vertices", ctx.polygons.len(), vertices);

    let mut message = format!("Polygon #{} added ({} vertices)", ctx.polygons.len(), vertices);
    if ctx.polygons.len() > 1 {
        message.push_str("; stop queries use polygon #1");
    }
    Ok(vec![notify(Notice::info(message))])
}

pub(super) fn handle_list_stops<M: MapSurface>(ctx: &mut AppContext<M>) -> HandlerResult {
    let Some(polygon) = ctx.polygons.first() else {
        return Ok(vec![notify(Notice::warning("Draw a polygon first"))]);
    };

    let inside = collect_inside(ctx.stops_on_screen(), polygon);
    let mut effects = vec![notify(Notice::info(format!(
        "{} stops inside polygon #1",
        inside.len()
    )))];
    effects.extend(
        inside
            .iter()
            .map(|stop| notify(Notice::info(format!("  {} ({})", stop.name, stop.id)))),
    );
    Ok(effects)
}

pub(super) fn handle_describe<M: MapSurface>(ctx: &mut AppContext<M>) -> HandlerResult {
    if ctx.polygons.is_empty() {
        return Ok(vec![notify(Notice::info("No polygons drawn"))]);
    }

    let mut effects = Vec::new();
    for (i, polygon) in ctx.polygons.iter().enumerate() {
        effects.push(notify(Notice::info(format!("Polygon #{}", i + 1))));
        effects.extend(polygon.vertices().iter().enumerate().map(|(j, v)| {
            notify(Notice::info(format!("  vertex {}: {:.6}, {:.6}", j, v.lat, v.lng)))
        }));
    }
    Ok(effects)
}

pub(super) fn handle_clear<M: MapSurface>(ctx: &mut AppContext<M>) -> HandlerResult {
    let count = ctx.polygons.len();
    ctx.polygons.clear();
    Ok(vec![notify(Notice::info(format!("Removed {} polygons", count)))])
}
