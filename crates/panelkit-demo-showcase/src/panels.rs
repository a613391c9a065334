#![forbid(unsafe_code)]

//! The two demo panels: a permanent HUD and a short-lived edit popup.
//!
//! The HUD stays resident forever; the popup edits the HUD's callsign
//! through an ancestor lookup and is evicted a few seconds after closing.

use panelkit::prelude::*;
use tracing::{info, warn};

use crate::widgets::TextSlot;

// ---------------------------------------------------------------------------
// HUD
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct HudModel {
    lifecycle: Lifecycle,
    pub callsign: ReactiveCell<String>,
    pub power: ReactiveCell<f32>,
}

impl ViewModel for HudModel {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn on_first_show(&self) {
        self.callsign.set(String::from("RAVEN-1"));
        self.power.set(0.75);
        info!("hud seeded on first show");
    }
}

impl Bindable for HudModel {
    fn fields() -> FieldTable<Self> {
        FieldTable::new()
            .cell("callsign", |m: &Self| &m.callsign)
            .cell("power", |m: &Self| &m.power)
    }
}

pub struct HudWidgets {
    pub callsign: TextSlot,
    pub power: TextSlot,
}

pub struct HudPanel {
    callsign_label: TextSlot,
    power_label: TextSlot,
}

impl View for HudPanel {
    type Model = HudModel;

    fn descriptor() -> ViewDescriptor {
        ViewDescriptor::new(ViewTypeId::new("hud"), Layer::Menu, Retention::Permanent)
    }

    fn attach(visual: &mut VisualTree) -> Result<Self, ViewError> {
        let widgets = visual
            .payload_ref::<HudWidgets>()
            .ok_or_else(|| ViewError::component_missing::<Self>("HudWidgets payload"))?;
        Ok(Self {
            callsign_label: widgets.callsign.clone(),
            power_label: widgets.power.clone(),
        })
    }

    fn configure(&mut self, binder: &mut Binder<HudModel>) -> Result<(), BindingError> {
        let callsign = self.callsign_label.clone();
        binder.add::<String>("callsign", move |_, new| callsign.set(new.clone()))?;
        let power = self.power_label.clone();
        binder.add::<f32>("power", move |_, new| {
            power.set(format!("{:.0}%", new * 100.0));
        })
    }
}

// ---------------------------------------------------------------------------
// Edit popup
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct EditModel {
    lifecycle: Lifecycle,
    pub draft: ReactiveCell<String>,
}

impl EditModel {
    /// Seeds the draft from the HUD this popup was opened over.
    pub fn reload(&self) {
        match find_ancestor::<HudModel>(self) {
            Some(hud) => self.draft.set(hud.callsign.get()),
            None => warn!("edit popup has no hud ancestor; draft left empty"),
        }
    }

    /// Writes the draft back into the HUD.
    pub fn commit(&self) {
        match find_ancestor::<HudModel>(self) {
            Some(hud) => hud.callsign.set(self.draft.get()),
            None => warn!("edit popup has no hud ancestor; draft dropped"),
        }
    }
}

impl ViewModel for EditModel {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn on_first_show(&self) {
        info!("edit popup created");
    }
}

impl Bindable for EditModel {
    fn fields() -> FieldTable<Self> {
        FieldTable::new().cell("draft", |m: &Self| &m.draft)
    }
}

pub struct EditWidgets {
    pub draft: TextSlot,
}

pub struct EditPopup {
    draft_field: TextSlot,
}

impl View for EditPopup {
    type Model = EditModel;

    fn descriptor() -> ViewDescriptor {
        ViewDescriptor::new(ViewTypeId::new("edit"), Layer::Popup, Retention::Short)
    }

    fn attach(visual: &mut VisualTree) -> Result<Self, ViewError> {
        let widgets = visual
            .payload_ref::<EditWidgets>()
            .ok_or_else(|| ViewError::component_missing::<Self>("EditWidgets payload"))?;
        Ok(Self {
            draft_field: widgets.draft.clone(),
        })
    }

    fn configure(&mut self, binder: &mut Binder<EditModel>) -> Result<(), BindingError> {
        let field = self.draft_field.clone();
        binder.add::<String>("draft", move |_, new| field.set(new.clone()))
    }

    fn on_show_finish(&mut self, model: &EditModel) {
        info!(draft = %model.draft.get(), "edit popup ready");
    }
}
