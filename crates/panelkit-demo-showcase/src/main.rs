#![forbid(unsafe_code)]

//! Scripted panelkit walkthrough.
//!
//! Opens a permanent HUD, renames it through a short-lived edit popup,
//! then idles long enough for retention to evict the popup. Run with
//! `RUST_LOG=debug` to watch the registry's decisions frame by frame.

mod panels;
mod widgets;

use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use panelkit::prelude::*;

use crate::panels::{EditModel, EditPopup, EditWidgets, HudModel, HudPanel, HudWidgets};
use crate::widgets::TextSlot;

const FRAME: Duration = Duration::from_millis(100);

/// Builds the template map plus a handle to the HUD callsign widget, so
/// the script can read back what the binding wrote.
fn assets() -> (MapAssets, TextSlot) {
    let callsign = TextSlot::new();
    let slot = callsign.clone();
    let assets = MapAssets::new()
        .with(VisualTemplate::new("panels/hud", move || {
            Box::new(HudWidgets {
                callsign: slot.clone(),
                power: TextSlot::new(),
            })
        }))
        .with(VisualTemplate::new("panels/edit", || {
            Box::new(EditWidgets {
                draft: TextSlot::new(),
            })
        }));
    (assets, callsign)
}

/// Runs enough frames for a 200ms delay plus 200ms fade to land.
fn settle(manager: &mut ViewManager) {
    for _ in 0..4 {
        manager.advance(FRAME);
    }
}

fn run(manager: &mut ViewManager, hud_callsign: &TextSlot) -> panelkit::Result<()> {
    manager.open::<HudPanel>(TransitionOptions::animated())?;
    settle(manager);
    let hud = manager.get_view_model::<HudModel>()?;
    info!(callsign = %hud.callsign.get(), power = %hud.power.get(), "hud on stage");

    manager.open::<EditPopup>(TransitionOptions::animated())?;
    settle(manager);
    let edit = manager.get_view_model::<EditModel>()?;
    edit.lifecycle().set_parent(hud.clone());
    edit.reload();
    edit.draft.set(String::from("OSPREY-2"));
    edit.commit();
    info!(
        callsign = %hud.callsign.get(),
        widget = %hud_callsign.get(),
        "hud renamed through the popup"
    );

    manager.close::<EditPopup>(TransitionOptions::animated());
    settle(manager);
    info!(top = ?manager.current_top(), z = ?manager.z_order(), "popup closed");

    // Five idle seconds; the popup's short retention budget is three.
    for _ in 0..50 {
        manager.advance(FRAME);
    }
    info!(
        popup_resident = manager.phase_of::<EditPopup>().is_some(),
        hud_resident = manager.phase_of::<HudPanel>().is_some(),
        nav = ?manager.nav_stack(),
        "after idle"
    );

    manager.open::<EditPopup>(TransitionOptions::immediate())?;
    let fresh = manager.get_view_model::<EditModel>()?;
    info!(draft = %fresh.draft.get(), "fresh popup after eviction");
    manager.close::<EditPopup>(TransitionOptions::immediate());

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let manifest = ViewManifest::new().declare::<HudPanel>().declare::<EditPopup>();
    let (assets, hud_callsign) = assets();
    let mut manager = ViewManager::new(
        manifest,
        ManagerConfig::default(),
        Box::new(assets),
        Box::new(TimedFx::new()),
    );

    if let Err(err) = run(&mut manager, &hud_callsign) {
        eprintln!("demo failed: {err}");
        std::process::exit(1);
    }
}
