#![forbid(unsafe_code)]

//! View declaration and orchestration.
//!
//! [`ViewManifest`] is the compile-time declaration table: each
//! [`declare`](ViewManifest::declare) records a view type's descriptor,
//! its model type, and a factory that builds its controller. Nothing is
//! discovered at runtime; a view the manifest does not name does not
//! exist.
//!
//! [`ViewManager`] validates the manifest once at construction and then
//! orchestrates: `open` materializes (or reuses) a view and shows it,
//! `close` hides it while keeping its model resident, `destroy` tears it
//! down, and [`advance`](ViewManager::advance) drives animation
//! completions and the retention sweep.
//!
//! # Invariants
//!
//! 1. One residency, one materialization: reopening a resident view reuses
//!    its controller and model; the visual tree is instantiated again only
//!    after a destroy.
//! 2. Model state follows residency, not visibility. `close` leaves every
//!    cell value intact; only `destroy` (explicit or via retention)
//!    discards a model.
//! 3. Manifest validation is per entry: a duplicate type id, an empty
//!    resource override, or a model type already claimed by another view
//!    skips that entry with a warning and leaves the rest usable.
//! 4. The retention sweep runs every `sweep_interval` ticks and accrues
//!    exactly the wall time elapsed since the previous sweep, so
//!    throttling never distorts hidden-time accounting.
//! 5. `Permanent` views are never evicted, no matter how long they stay
//!    hidden.
//! 6. A failed `open` leaves no partial residue: no controller, no model,
//!    no navigation entry.
//!
//! # Failure Modes
//!
//! `close` and `destroy` of a non-resident view, and completions whose
//! view was evicted mid-flight, are logged at warn or debug level and
//! otherwise ignored.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};

use panelkit_view::{
    Animator, FxTicket, Layer, Phase, TransitionOptions, View, ViewController, ViewDescriptor,
    ViewModel, ViewTypeId, VisualTemplate, VisualTree,
};

use crate::assets::AssetSource;
use crate::error::RegistryError;
use crate::layers::LayerBoard;
use crate::nav::NavStack;

// ---------------------------------------------------------------------------
// Type-erased controller
// ---------------------------------------------------------------------------

/// Object-safe surface of [`ViewController`], so one table can hold
/// controllers of every view type.
trait AnyController {
    fn show(&mut self, opts: TransitionOptions, fx: &mut dyn Animator) -> Option<FxTicket>;
    fn hide(&mut self, opts: TransitionOptions, fx: &mut dyn Animator) -> Option<FxTicket>;
    fn complete(&mut self, ticket: FxTicket);
    fn destroy(&mut self, fx: &mut dyn Animator) -> Vec<FxTicket>;
    fn phase(&self) -> Phase;
    fn accrue_hidden(&self, dt: Duration);
    fn hidden_for(&self) -> Duration;
    fn reset_hidden_timer(&self);
}

impl<V: View> AnyController for ViewController<V> {
    fn show(&mut self, opts: TransitionOptions, fx: &mut dyn Animator) -> Option<FxTicket> {
        ViewController::show(self, opts, fx)
    }

    fn hide(&mut self, opts: TransitionOptions, fx: &mut dyn Animator) -> Option<FxTicket> {
        ViewController::hide(self, opts, fx)
    }

    fn complete(&mut self, ticket: FxTicket) {
        ViewController::complete(self, ticket);
    }

    fn destroy(&mut self, fx: &mut dyn Animator) -> Vec<FxTicket> {
        ViewController::destroy(self, fx)
    }

    fn phase(&self) -> Phase {
        ViewController::phase(self)
    }

    fn accrue_hidden(&self, dt: Duration) {
        if let Some(model) = ViewController::model(self) {
            model.lifecycle().accrue_hidden(dt);
        }
    }

    fn hidden_for(&self) -> Duration {
        ViewController::model(self).map_or(Duration::ZERO, |m| m.lifecycle().hidden_for())
    }

    fn reset_hidden_timer(&self) {
        if let Some(model) = ViewController::model(self) {
            model.lifecycle().reset_hidden_timer();
        }
    }
}

struct BuiltController {
    controller: Box<dyn AnyController>,
    model_type: TypeId,
    model: Rc<dyn ViewModel>,
}

type ControllerFactory = Box<dyn Fn(VisualTree) -> Result<BuiltController, RegistryError>>;

// ---------------------------------------------------------------------------
// ViewManifest
// ---------------------------------------------------------------------------

struct ManifestEntry {
    descriptor: ViewDescriptor,
    model_type: TypeId,
    model_name: &'static str,
    build: ControllerFactory,
}

/// Compile-time declaration table, one entry per view type.
#[derive(Default)]
pub struct ViewManifest {
    entries: Vec<ManifestEntry>,
}

impl ViewManifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares view type `V`.
    #[must_use]
    pub fn declare<V: View>(mut self) -> Self {
        self.entries.push(ManifestEntry {
            descriptor: V::descriptor(),
            model_type: TypeId::of::<V::Model>(),
            model_name: std::any::type_name::<V::Model>(),
            build: Box::new(|visual| {
                let mut controller = ViewController::<V>::new(visual)?;
                let model: Rc<dyn ViewModel> = controller.initialize();
                Ok(BuiltController {
                    controller: Box::new(controller),
                    model_type: TypeId::of::<V::Model>(),
                    model,
                })
            }),
        });
        self
    }

    /// Number of declared entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ViewManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewManifest")
            .field("entries", &self.entries.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ManagerConfig
// ---------------------------------------------------------------------------

/// Tunables for [`ViewManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    sweep_interval: u32,
    resource_prefix: String,
}

impl ManagerConfig {
    /// Ticks between retention sweeps.
    pub const DEFAULT_SWEEP_INTERVAL: u32 = 2;

    /// Prefix prepended to a view's type id to form its resource path.
    pub const DEFAULT_RESOURCE_PREFIX: &'static str = "panels/";

    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sweep throttle. Clamped to at least one tick.
    #[must_use]
    pub fn sweep_interval(mut self, ticks: u32) -> Self {
        self.sweep_interval = ticks.max(1);
        self
    }

    /// Sets the resource path prefix.
    #[must_use]
    pub fn resource_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.resource_prefix = prefix.into();
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Self::DEFAULT_SWEEP_INTERVAL,
            resource_prefix: String::from(Self::DEFAULT_RESOURCE_PREFIX),
        }
    }
}

// ---------------------------------------------------------------------------
// ViewManager
// ---------------------------------------------------------------------------

struct ModelEntry {
    owner: ViewTypeId,
    model: Rc<dyn ViewModel>,
}

/// Orchestrates every declared view: residency, navigation, layering,
/// animation routing, and retention.
pub struct ViewManager {
    config: ManagerConfig,
    assets: Box<dyn AssetSource>,
    animator: Box<dyn Animator>,
    descriptors: HashMap<ViewTypeId, ViewDescriptor>,
    factories: HashMap<ViewTypeId, ControllerFactory>,
    templates: HashMap<ViewTypeId, VisualTemplate>,
    controllers: HashMap<ViewTypeId, Box<dyn AnyController>>,
    models: HashMap<TypeId, ModelEntry>,
    routes: HashMap<FxTicket, ViewTypeId>,
    nav: NavStack,
    layers: LayerBoard,
    ticks: u64,
    sweep_window: Duration,
}

impl ViewManager {
    /// Validates `manifest` entry by entry and builds the manager.
    ///
    /// Invalid entries are skipped with a warning; see the module docs.
    #[must_use]
    pub fn new(
        manifest: ViewManifest,
        config: ManagerConfig,
        assets: Box<dyn AssetSource>,
        animator: Box<dyn Animator>,
    ) -> Self {
        let mut descriptors = HashMap::new();
        let mut factories = HashMap::new();
        let mut model_owners: HashMap<TypeId, ViewTypeId> = HashMap::new();

        for entry in manifest.entries {
            let type_id = entry.descriptor.type_id();
            if descriptors.contains_key(&type_id) {
                warn!(view = %type_id, "duplicate view declaration skipped");
                continue;
            }
            if entry.descriptor.resource_override() == Some("") {
                warn!(view = %type_id, "empty resource override; declaration skipped");
                continue;
            }
            if let Some(owner) = model_owners.get(&entry.model_type) {
                warn!(
                    view = %type_id,
                    model = entry.model_name,
                    owner = %owner,
                    "model type already claimed; declaration skipped"
                );
                continue;
            }
            model_owners.insert(entry.model_type, type_id);
            descriptors.insert(type_id, entry.descriptor);
            factories.insert(type_id, entry.build);
        }
        debug!(declared = descriptors.len(), "view manifest validated");

        Self {
            config,
            assets,
            animator,
            descriptors,
            factories,
            templates: HashMap::new(),
            controllers: HashMap::new(),
            models: HashMap::new(),
            routes: HashMap::new(),
            nav: NavStack::default(),
            layers: LayerBoard::default(),
            ticks: 0,
            sweep_window: Duration::ZERO,
        }
    }

    // ---- opening and closing ----

    /// Opens view `V`: materializes it if not resident, shows it, promotes
    /// it to the front of its layer, and pushes it onto navigation.
    pub fn open<V: View>(&mut self, opts: TransitionOptions) -> Result<(), RegistryError> {
        let type_id = V::descriptor().type_id();
        let Some(descriptor) = self.descriptors.get(&type_id).copied() else {
            warn!(view = %type_id, "open refused; view is not declared");
            return Err(RegistryError::Unregistered(type_id));
        };
        if !self.controllers.contains_key(&type_id) {
            self.materialize(&descriptor)?;
        }
        if let Some(controller) = self.controllers.get_mut(&type_id) {
            if let Some(ticket) = controller.show(opts, &mut *self.animator) {
                self.routes.insert(ticket, type_id);
            }
        }
        self.layers.promote(descriptor.layer(), type_id);
        self.nav.push(type_id);
        debug!(view = %type_id, depth = self.nav.depth(), "view opened");
        Ok(())
    }

    /// Closes view `V`: hides it, restarts its retention clock, and drops
    /// its topmost navigation entry. The model stays resident.
    pub fn close<V: View>(&mut self, opts: TransitionOptions) {
        let type_id = V::descriptor().type_id();
        let Some(controller) = self.controllers.get_mut(&type_id) else {
            warn!(view = %type_id, "close skipped; view is not resident");
            return;
        };
        if let Some(ticket) = controller.hide(opts, &mut *self.animator) {
            self.routes.insert(ticket, type_id);
        }
        controller.reset_hidden_timer();
        self.nav.remove_first_from_top(type_id);
        debug!(view = %type_id, top = ?self.nav.top(), "view closed");
    }

    /// Destroys view `V` immediately: force-hide, model teardown, removal
    /// from every table.
    pub fn destroy<V: View>(&mut self) {
        self.destroy_entry(V::descriptor().type_id());
    }

    // ---- model access ----

    /// The resident model of type `M`.
    pub fn get_view_model<M: ViewModel>(&self) -> Result<Rc<M>, RegistryError> {
        let name = std::any::type_name::<M>();
        let Some(entry) = self.models.get(&TypeId::of::<M>()) else {
            warn!(model = name, "model lookup failed; no resident owner");
            return Err(RegistryError::ModelNotFound(name));
        };
        let any: Rc<dyn Any> = entry.model.clone();
        any.downcast::<M>()
            .map_err(|_| RegistryError::ModelNotFound(name))
    }

    // ---- ticking ----

    /// Advances one frame: ticks the animator, routes finished tickets to
    /// their controllers, and runs the throttled retention sweep.
    pub fn advance(&mut self, dt: Duration) {
        self.animator.tick(dt);
        for ticket in self.animator.drain_finished() {
            match self.routes.remove(&ticket) {
                Some(type_id) => match self.controllers.get_mut(&type_id) {
                    Some(controller) => controller.complete(ticket),
                    None => debug!(%ticket, view = %type_id, "completion for evicted view dropped"),
                },
                None => debug!(%ticket, "completion with no route dropped"),
            }
        }
        self.ticks += 1;
        self.sweep_window += dt;
        if self.ticks % u64::from(self.config.sweep_interval) == 0 {
            let window = std::mem::take(&mut self.sweep_window);
            self.sweep(window);
        }
    }

    // ---- queries ----

    /// The navigation top, or `None` when nothing is open.
    #[must_use]
    pub fn current_top(&self) -> Option<ViewTypeId> {
        self.nav.top()
    }

    /// Navigation depth.
    #[must_use]
    pub fn nav_depth(&self) -> usize {
        self.nav.depth()
    }

    /// Navigation history, bottom to top.
    #[must_use]
    pub fn nav_stack(&self) -> &[ViewTypeId] {
        self.nav.entries()
    }

    /// `true` while `V` has a live controller (shown or merely cached).
    #[must_use]
    pub fn is_resident<V: View>(&self) -> bool {
        self.controllers.contains_key(&V::descriptor().type_id())
    }

    /// Number of resident views.
    #[must_use]
    pub fn live_view_count(&self) -> usize {
        self.controllers.len()
    }

    /// Lifecycle phase of `V`, or `None` when not resident.
    #[must_use]
    pub fn phase_of<V: View>(&self) -> Option<Phase> {
        self.controllers
            .get(&V::descriptor().type_id())
            .map(|controller| controller.phase())
    }

    /// Draw order over resident views: layers back to front, most recently
    /// promoted frontmost within each layer. Hidden residents included.
    #[must_use]
    pub fn z_order(&self) -> Vec<(Layer, ViewTypeId)> {
        self.layers.back_to_front().collect()
    }

    // ---- internals ----

    fn materialize(&mut self, descriptor: &ViewDescriptor) -> Result<(), RegistryError> {
        let type_id = descriptor.type_id();
        let template = match self.templates.get(&type_id) {
            Some(cached) => cached.clone(),
            None => {
                let path = descriptor.resource_path(&self.config.resource_prefix);
                let template = self.assets.resolve(&path).map_err(|source| {
                    warn!(view = %type_id, %path, "template resolution failed");
                    RegistryError::ResourceMissing {
                        type_id,
                        path,
                        source,
                    }
                })?;
                self.templates.insert(type_id, template.clone());
                template
            }
        };
        let Some(build) = self.factories.get(&type_id) else {
            return Err(RegistryError::Unregistered(type_id));
        };
        let built = build(template.instantiate())?;
        self.models.insert(
            built.model_type,
            ModelEntry {
                owner: type_id,
                model: built.model,
            },
        );
        self.controllers.insert(type_id, built.controller);
        debug!(view = %type_id, "view materialized");
        Ok(())
    }

    fn destroy_entry(&mut self, type_id: ViewTypeId) {
        let Some(mut controller) = self.controllers.remove(&type_id) else {
            warn!(view = %type_id, "destroy skipped; view is not resident");
            return;
        };
        for ticket in controller.destroy(&mut *self.animator) {
            self.routes.remove(&ticket);
        }
        self.models.retain(|_, entry| entry.owner != type_id);
        self.layers.remove(type_id);
        self.nav.remove_all(type_id);
        debug!(view = %type_id, "view destroyed");
    }

    fn sweep(&mut self, window: Duration) {
        let mut doomed: Vec<ViewTypeId> = Vec::new();
        for (type_id, controller) in &self.controllers {
            if controller.phase() != Phase::Hidden {
                continue;
            }
            controller.accrue_hidden(window);
            let Some(descriptor) = self.descriptors.get(type_id) else {
                continue;
            };
            let Some(threshold) = descriptor.retention().threshold() else {
                continue;
            };
            if controller.hidden_for() > threshold {
                doomed.push(*type_id);
            }
        }
        for type_id in doomed {
            debug!(view = %type_id, "retention threshold exceeded; evicting");
            self.destroy_entry(type_id);
        }
    }
}

impl fmt::Debug for ViewManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewManager")
            .field("declared", &self.descriptors.len())
            .field("resident", &self.controllers.len())
            .field("nav_depth", &self.nav.depth())
            .field("inflight_routes", &self.routes.len())
            .field("ticks", &self.ticks)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_clamps_sweep_interval_to_one() {
        let config = ManagerConfig::new().sweep_interval(0);
        assert_eq!(config, ManagerConfig::new().sweep_interval(1));
    }

    #[test]
    fn default_config_matches_constants() {
        let config = ManagerConfig::default();
        assert_eq!(
            config,
            ManagerConfig::new()
                .sweep_interval(ManagerConfig::DEFAULT_SWEEP_INTERVAL)
                .resource_prefix(ManagerConfig::DEFAULT_RESOURCE_PREFIX)
        );
    }
}
