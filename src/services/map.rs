//! Headless map surface
//!
//! Stands in for the mapping SDK in the console and in tests: it keeps the
//! attached overlays and the current view so they can be inspected.

use std::collections::BTreeMap;

use tracing::trace;

use super::geo::Bounds;
use super::overlay::{MapSurface, Overlay, OverlayId};

#[derive(Debug, Default)]
pub struct HeadlessMap {
    attached: BTreeMap<OverlayId, (Overlay, bool)>,
    view: Option<Bounds>,
    detach_calls: usize,
}

impl HeadlessMap {
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    pub fn is_attached(&self, id: OverlayId) -> bool {
        self.attached.contains_key(&id)
    }

    /// Unknown overlays are reported as not visible
    pub fn is_visible(&self, id: OverlayId) -> bool {
        self.attached.get(&id).map_or(false, |(_, visible)| *visible)
    }

    pub fn overlays(&self) -> impl Iterator<Item = &Overlay> + '_ {
        self.attached.values().map(|(overlay, _)| overlay)
    }

    pub fn hidden_count(&self) -> usize {
        self.attached.values().filter(|(_, visible)| !visible).count()
    }

    pub fn view(&self) -> Option<Bounds> {
        self.view
    }

    pub fn detach_calls(&self) -> usize {
        self.detach_calls
    }
}

impl MapSurface for HeadlessMap {
    fn attach(&mut self, id: OverlayId, overlay: &Overlay) {
        trace!("attach overlay {:?}", id);
        self.attached.insert(id, (overlay.clone(), true));
    }

    fn detach(&mut self, id: OverlayId) {
        trace!("detach overlay {:?}", id);
        self.detach_calls += 1;
        self.attached.remove(&id);
    }

    fn set_visible(&mut self, id: OverlayId, visible: bool) {
        if let Some((_, v)) = self.attached.get_mut(&id) {
            *v = visible;
        }
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.view = Some(bounds);
    }
}
