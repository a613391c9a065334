#![forbid(unsafe_code)]

//! Layer ordering.
//!
//! Views render per layer, back to front; within one layer the most
//! recently opened view sits frontmost. Opening a resident view promotes
//! it to the front of its layer without disturbing the others.

use std::collections::BTreeMap;

use panelkit_view::{Layer, ViewTypeId};

#[derive(Debug, Default)]
pub(crate) struct LayerBoard {
    slots: BTreeMap<Layer, Vec<ViewTypeId>>,
}

impl LayerBoard {
    /// Moves `id` to the front of `layer`, inserting it if absent.
    pub(crate) fn promote(&mut self, layer: Layer, id: ViewTypeId) {
        let slot = self.slots.entry(layer).or_default();
        if let Some(pos) = slot.iter().position(|entry| *entry == id) {
            slot.remove(pos);
        }
        slot.push(id);
    }

    /// Drops `id` from whichever layer holds it.
    pub(crate) fn remove(&mut self, id: ViewTypeId) {
        for slot in self.slots.values_mut() {
            slot.retain(|entry| *entry != id);
        }
    }

    /// Full draw order: layers back to front, views within each layer back
    /// to front.
    pub(crate) fn back_to_front(&self) -> impl Iterator<Item = (Layer, ViewTypeId)> + '_ {
        self.slots
            .iter()
            .flat_map(|(layer, slot)| slot.iter().map(move |id| (*layer, *id)))
    }
}
