#![forbid(unsafe_code)]

//! The per-view controller: one visual tree, one view, one bound model.
//!
//! A [`ViewController`] is built once per resident view: `attach` locates
//! widgets, `configure` registers handlers, and `initialize` constructs a
//! fresh model and binds to it. From then on the registry drives it with
//! `show`/`hide`/`complete`/`destroy`.
//!
//! # Invariants
//!
//! 1. `attach` and `configure` run exactly once, at build time; binding
//!    errors abort the build and leave nothing to clean up.
//! 2. The binding context is itself a reactive slot: assigning the same
//!    model instance is a no-op, assigning a different one unbinds the old
//!    model and binds the new one, and external subscribers to the slot see
//!    every change.
//! 3. Immediate transitions apply their terminal visual state and fire
//!    their finish path synchronously; animated ones return a ticket whose
//!    completion is routed back via [`complete`](ViewController::complete).
//! 4. `destroy` force-hides a view still on stage, discards in-flight
//!    tickets, fires the model's destroy notification, and detaches every
//!    binding. It is idempotent.
//!
//! # Failure Modes
//!
//! - Overlapping show/hide on one view is tolerated, not prevented: both
//!   completions eventually arrive and each applies its own terminal state,
//!   so the last one to fire wins. Single-threaded ticking keeps this a
//!   visual glitch, never a data race.
//! - A completion for an unknown ticket (already discarded, or routed after
//!   destroy) is logged at debug level and dropped.

use std::error::Error;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use panelkit_reactive::{Binder, BindingError, ReactiveCell};

use crate::fx::{Animator, FxTicket};
use crate::lifecycle::Phase;
use crate::model::{
    ModelSlot, ViewModel, notify_destroy, notify_hide_finish, notify_hide_start,
    notify_show_finish, notify_show_start,
};
use crate::view::{TransitionOptions, View, ViewError};
use crate::visual::VisualTree;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Controller build failure: the view could not attach or configure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// `View::attach` failed.
    Component(ViewError),
    /// `View::configure` failed.
    Binding(BindingError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(err) => write!(f, "attach failed: {err}"),
            Self::Binding(err) => write!(f, "configure failed: {err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Component(err) => Some(err),
            Self::Binding(err) => Some(err),
        }
    }
}

impl From<ViewError> for ControllerError {
    fn from(err: ViewError) -> Self {
        Self::Component(err)
    }
}

impl From<BindingError> for ControllerError {
    fn from(err: BindingError) -> Self {
        Self::Binding(err)
    }
}

// ---------------------------------------------------------------------------
// ViewController
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionKind {
    Show,
    Hide,
}

/// Owns one view's visual tree, widget wiring, and bound model.
pub struct ViewController<V: View> {
    view: V,
    visual: VisualTree,
    binder: Binder<V::Model>,
    context: ReactiveCell<ModelSlot<V::Model>>,
    inflight: Vec<(FxTicket, TransitionKind)>,
    show_finish: Vec<Box<dyn FnOnce()>>,
    hide_finish: Vec<Box<dyn FnOnce()>>,
}

impl<V: View> ViewController<V> {
    /// Builds a controller over `visual`: attaches the view and registers
    /// its handlers. No model is bound yet; call
    /// [`initialize`](Self::initialize) next.
    pub fn new(mut visual: VisualTree) -> Result<Self, ControllerError> {
        let mut view = V::attach(&mut visual)?;
        let mut binder = Binder::new();
        view.configure(&mut binder)?;
        Ok(Self {
            view,
            visual,
            binder,
            context: ReactiveCell::new(ModelSlot::empty()),
            inflight: Vec::new(),
            show_finish: Vec::new(),
            hide_finish: Vec::new(),
        })
    }

    /// Constructs a fresh model, assigns it as the binding context, and
    /// returns it for registration.
    pub fn initialize(&mut self) -> Rc<V::Model> {
        let model = Rc::new(V::Model::default());
        self.set_context(Some(Rc::clone(&model)));
        model
    }

    /// Re-assigns the binding context.
    ///
    /// Identity-equal re-assignment is a no-op. Otherwise the slot cell is
    /// written (notifying its subscribers), the old model is unbound, and
    /// the new one bound.
    pub fn set_context(&mut self, model: Option<Rc<V::Model>>) {
        let old = self.context.get();
        let new = match model {
            Some(m) => ModelSlot::filled(m),
            None => ModelSlot::empty(),
        };
        if old == new {
            return;
        }
        self.context.set(new.clone());
        if let Some(prev) = old.get() {
            self.binder.unbind(prev);
        }
        if let Some(next) = new.get() {
            self.binder.bind(next);
        }
    }

    /// The bound model, if any.
    #[must_use]
    pub fn model(&self) -> Option<Rc<V::Model>> {
        self.context.with(|slot| slot.get().cloned())
    }

    /// The binding-context slot, for external subscription.
    #[must_use]
    pub fn context(&self) -> &ReactiveCell<ModelSlot<V::Model>> {
        &self.context
    }

    /// The controller's visual tree.
    #[must_use]
    pub fn visual(&self) -> &VisualTree {
        &self.visual
    }

    /// The bound model's lifecycle phase, or `Idle` with no model.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.model()
            .map_or(Phase::Idle, |m| m.lifecycle().phase())
    }

    /// Starts a show transition. Returns the animation ticket, or `None`
    /// for immediate transitions (and for a controller with no model,
    /// which is logged and skipped).
    pub fn show(&mut self, opts: TransitionOptions, fx: &mut dyn Animator) -> Option<FxTicket> {
        let Some(model) = self.model() else {
            warn!(view = %V::descriptor().type_id(), "show skipped; no binding context");
            return None;
        };
        let (immediate, on_start, on_finish) = opts.into_parts();
        notify_show_start(&*model);
        self.visual.set_visible(true);
        self.view.on_show_start(&model, immediate);
        if let Some(cb) = on_start {
            cb();
        }
        if immediate {
            self.visual.set_opacity(1.0);
            self.visual.set_interactive(true);
            notify_show_finish(&*model);
            self.view.on_show_finish(&model);
            if let Some(cb) = on_finish {
                cb();
            }
            debug!(view = %V::descriptor().type_id(), "shown immediately");
            None
        } else {
            self.visual.set_interactive(false);
            let ticket = fx.animate_show(&mut self.visual);
            self.inflight.push((ticket, TransitionKind::Show));
            if let Some(cb) = on_finish {
                self.show_finish.push(cb);
            }
            debug!(view = %V::descriptor().type_id(), %ticket, "show started");
            Some(ticket)
        }
    }

    /// Starts a hide transition. Returns the animation ticket, or `None`
    /// for immediate transitions.
    pub fn hide(&mut self, opts: TransitionOptions, fx: &mut dyn Animator) -> Option<FxTicket> {
        let Some(model) = self.model() else {
            warn!(view = %V::descriptor().type_id(), "hide skipped; no binding context");
            return None;
        };
        let (immediate, on_start, on_finish) = opts.into_parts();
        notify_hide_start(&*model);
        self.view.on_hide_start(&model, immediate);
        if let Some(cb) = on_start {
            cb();
        }
        self.visual.set_interactive(false);
        if immediate {
            self.visual.set_opacity(0.0);
            self.visual.set_visible(false);
            self.visual.set_interactive(true);
            notify_hide_finish(&*model);
            self.view.on_hide_finish(&model);
            if let Some(cb) = on_finish {
                cb();
            }
            debug!(view = %V::descriptor().type_id(), "hidden immediately");
            None
        } else {
            let ticket = fx.animate_hide(&mut self.visual);
            self.inflight.push((ticket, TransitionKind::Hide));
            if let Some(cb) = on_finish {
                self.hide_finish.push(cb);
            }
            debug!(view = %V::descriptor().type_id(), %ticket, "hide started");
            Some(ticket)
        }
    }

    /// Applies the terminal state for a drained ticket.
    ///
    /// Unknown tickets are dropped with a debug log; see the module docs
    /// for the overlap rule.
    pub fn complete(&mut self, ticket: FxTicket) {
        let Some(pos) = self.inflight.iter().position(|(t, _)| *t == ticket) else {
            debug!(view = %V::descriptor().type_id(), %ticket, "completion for unknown ticket dropped");
            return;
        };
        let (_, kind) = self.inflight.remove(pos);
        let Some(model) = self.model() else {
            return;
        };
        match kind {
            TransitionKind::Show => {
                self.visual.set_opacity(1.0);
                self.visual.set_interactive(true);
                notify_show_finish(&*model);
                self.view.on_show_finish(&model);
                for cb in self.show_finish.drain(..) {
                    cb();
                }
                debug!(view = %V::descriptor().type_id(), %ticket, "show finished");
            }
            TransitionKind::Hide => {
                self.visual.set_opacity(0.0);
                self.visual.set_visible(false);
                self.visual.set_interactive(true);
                notify_hide_finish(&*model);
                self.view.on_hide_finish(&model);
                for cb in self.hide_finish.drain(..) {
                    cb();
                }
                debug!(view = %V::descriptor().type_id(), %ticket, "hide finished");
            }
        }
    }

    /// Tears the view down: force-hides if still on stage, discards
    /// in-flight tickets (returned so the caller can drop its routing
    /// entries), fires the destroy notification, and detaches all bindings.
    pub fn destroy(&mut self, fx: &mut dyn Animator) -> Vec<FxTicket> {
        let Some(model) = self.model() else {
            return Vec::new();
        };
        let discarded: Vec<FxTicket> = self.inflight.drain(..).map(|(t, _)| t).collect();
        for &ticket in &discarded {
            fx.discard(ticket);
        }
        self.show_finish.clear();
        self.hide_finish.clear();
        if model.lifecycle().phase().is_on_stage() {
            self.hide(TransitionOptions::immediate(), fx);
        }
        notify_destroy(&*model);
        self.set_context(None);
        debug!(view = %V::descriptor().type_id(), "destroyed");
        discarded
    }
}

impl<V: View> fmt::Debug for ViewController<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewController")
            .field("view", &V::descriptor().type_id())
            .field("phase", &self.phase())
            .field("inflight", &self.inflight.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::{ImmediateFx, TimedFx};
    use crate::lifecycle::Lifecycle;
    use crate::view::{Layer, Retention, ViewDescriptor, ViewTypeId};
    use panelkit_reactive::{Bindable, FieldTable};
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    const MS_400: Duration = Duration::from_millis(400);

    #[derive(Default)]
    struct PanelModel {
        lifecycle: Lifecycle,
        title: ReactiveCell<String>,
    }

    impl ViewModel for PanelModel {
        fn lifecycle(&self) -> &Lifecycle {
            &self.lifecycle
        }
    }

    impl Bindable for PanelModel {
        fn fields() -> FieldTable<Self> {
            FieldTable::new().cell("title", |m: &Self| &m.title)
        }
    }

    struct PanelWidgets {
        title: Rc<RefCell<String>>,
    }

    struct Panel {
        title_label: Rc<RefCell<String>>,
    }

    impl View for Panel {
        type Model = PanelModel;

        fn descriptor() -> ViewDescriptor {
            ViewDescriptor::new(ViewTypeId::new("panel"), Layer::Base, Retention::Short)
        }

        fn attach(visual: &mut VisualTree) -> Result<Self, ViewError> {
            let widgets = visual
                .payload_ref::<PanelWidgets>()
                .ok_or_else(|| ViewError::component_missing::<Self>("PanelWidgets payload"))?;
            Ok(Self {
                title_label: Rc::clone(&widgets.title),
            })
        }

        fn configure(&mut self, binder: &mut Binder<PanelModel>) -> Result<(), BindingError> {
            let label = Rc::clone(&self.title_label);
            binder.add::<String>("title", move |_, new| *label.borrow_mut() = new.clone())
        }
    }

    fn widget_tree() -> VisualTree {
        VisualTree::new(
            "panels/panel",
            Box::new(PanelWidgets {
                title: Rc::new(RefCell::new(String::new())),
            }),
        )
    }

    fn built() -> ViewController<Panel> {
        let mut controller = ViewController::<Panel>::new(widget_tree()).expect("build");
        controller.initialize();
        controller
    }

    // ---- build ----

    #[test]
    fn attach_failure_reports_component_missing() {
        let bogus = VisualTree::new("panels/panel", Box::new(()));
        let err = ViewController::<Panel>::new(bogus).unwrap_err();
        assert!(matches!(err, ControllerError::Component(_)));
    }

    #[test]
    fn initialize_binds_a_fresh_default_model() {
        let controller = built();
        let model = controller.model().expect("model");
        assert_eq!(model.title.subscriber_count(), 1, "handler must be bound");
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn bound_handler_drives_widget() {
        let controller = built();
        let model = controller.model().expect("model");
        model.title.set(String::from("power"));
        let label = controller
            .visual()
            .payload_ref::<PanelWidgets>()
            .map(|w| w.title.borrow().clone());
        assert_eq!(label.as_deref(), Some("power"));
    }

    // ---- context slot ----

    #[test]
    fn same_instance_reassignment_is_noop() {
        let mut controller = built();
        let model = controller.model().expect("model");
        let notified = Rc::new(Cell::new(0));
        let observed = Rc::clone(&notified);
        controller
            .context()
            .subscribe(move |_, _| observed.set(observed.get() + 1));

        controller.set_context(Some(model));
        assert_eq!(notified.get(), 0, "identity re-assignment must not notify");
    }

    #[test]
    fn fresh_initialize_rebinds_to_new_model() {
        let mut controller = built();
        let first = controller.model().expect("model");
        let second = controller.initialize();

        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(first.title.subscriber_count(), 0, "old model unbound");
        assert_eq!(second.title.subscriber_count(), 1, "new model bound");
    }

    #[test]
    fn clearing_context_unbinds_everything() {
        let mut controller = built();
        let model = controller.model().expect("model");
        controller.set_context(None);
        assert_eq!(model.title.subscriber_count(), 0);
        assert!(controller.model().is_none());
    }

    // ---- immediate transitions ----

    #[test]
    fn immediate_show_applies_terminal_state_synchronously() {
        let mut controller = built();
        let mut fx = ImmediateFx::new();
        let started = Rc::new(Cell::new(false));
        let finished = Rc::new(Cell::new(false));
        let s = Rc::clone(&started);
        let f = Rc::clone(&finished);

        let ticket = controller.show(
            TransitionOptions::immediate()
                .on_start(move || s.set(true))
                .on_finish(move || f.set(true)),
            &mut fx,
        );
        assert!(ticket.is_none());
        assert!(started.get() && finished.get());
        assert_eq!(controller.phase(), Phase::Shown);
        assert!(controller.visual().is_visible());
        assert!(controller.visual().is_interactive());
        assert_eq!(controller.visual().opacity(), 1.0);
    }

    #[test]
    fn immediate_hide_lands_hidden_and_invisible() {
        let mut controller = built();
        let mut fx = ImmediateFx::new();
        controller.show(TransitionOptions::immediate(), &mut fx);
        controller.hide(TransitionOptions::immediate(), &mut fx);

        assert_eq!(controller.phase(), Phase::Hidden);
        assert!(!controller.visual().is_visible());
        assert_eq!(controller.visual().opacity(), 0.0);
        assert!(controller.visual().is_interactive());
    }

    // ---- animated transitions ----

    #[test]
    fn animated_show_completes_via_ticket() {
        let mut controller = built();
        let mut fx = TimedFx::new();
        let finished = Rc::new(Cell::new(false));
        let f = Rc::clone(&finished);

        let ticket = controller
            .show(TransitionOptions::animated().on_finish(move || f.set(true)), &mut fx)
            .expect("ticket");
        assert_eq!(controller.phase(), Phase::ShowInProgress);
        assert!(controller.visual().is_visible());
        assert!(!controller.visual().is_interactive(), "input off mid-show");
        assert!(!finished.get());

        fx.tick(MS_400);
        for done in fx.drain_finished() {
            assert_eq!(done, ticket);
            controller.complete(done);
        }
        assert_eq!(controller.phase(), Phase::Shown);
        assert!(controller.visual().is_interactive());
        assert!(finished.get(), "finish callback fires at completion");
    }

    #[test]
    fn animated_hide_completes_via_ticket() {
        let mut controller = built();
        let mut fx = TimedFx::new();
        controller.show(TransitionOptions::immediate(), &mut fx);

        controller
            .hide(TransitionOptions::animated(), &mut fx)
            .expect("ticket");
        assert_eq!(controller.phase(), Phase::HideInProgress);
        assert!(controller.visual().is_visible(), "visible until hide lands");

        fx.tick(MS_400);
        for done in fx.drain_finished() {
            controller.complete(done);
        }
        assert_eq!(controller.phase(), Phase::Hidden);
        assert!(!controller.visual().is_visible());
    }

    #[test]
    fn unknown_ticket_completion_is_dropped() {
        let mut controller = built();
        controller.complete(FxTicket::allocate());
        assert_eq!(controller.phase(), Phase::Idle, "state must be untouched");
    }

    #[test]
    fn overlapping_transitions_last_completion_wins() {
        let mut controller = built();
        let mut fx = TimedFx::new();
        controller.show(TransitionOptions::animated(), &mut fx);
        controller.hide(TransitionOptions::animated(), &mut fx);

        fx.tick(MS_400);
        for done in fx.drain_finished() {
            controller.complete(done);
        }
        // Show completed first, hide second: the hide terminal state wins.
        assert_eq!(controller.phase(), Phase::Hidden);
        assert!(!controller.visual().is_visible());
    }

    // ---- destroy ----

    #[test]
    fn destroy_force_hides_and_unbinds() {
        let mut controller = built();
        let mut fx = ImmediateFx::new();
        let model = controller.model().expect("model");
        controller.show(TransitionOptions::immediate(), &mut fx);

        controller.destroy(&mut fx);
        assert_eq!(model.lifecycle().phase(), Phase::Destroyed);
        assert_eq!(model.title.subscriber_count(), 0, "bindings detached");
        assert!(controller.model().is_none());
        assert!(!controller.visual().is_visible());
    }

    #[test]
    fn destroy_discards_inflight_tickets() {
        let mut controller = built();
        let mut fx = TimedFx::new();
        let ticket = controller
            .show(TransitionOptions::animated(), &mut fx)
            .expect("ticket");

        let discarded = controller.destroy(&mut fx);
        assert_eq!(discarded, vec![ticket]);
        fx.tick(MS_400);
        assert!(
            fx.drain_finished().is_empty(),
            "discarded ticket must never complete"
        );
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut controller = built();
        let mut fx = ImmediateFx::new();
        controller.destroy(&mut fx);
        let second = controller.destroy(&mut fx);
        assert!(second.is_empty());
    }

    #[test]
    fn stashed_finish_callbacks_never_leak_into_next_transition() {
        let mut controller = built();
        let mut fx = TimedFx::new();
        let finishes = Rc::new(Cell::new(0));
        let f = Rc::clone(&finishes);
        controller.show(
            TransitionOptions::animated().on_finish(move || f.set(f.get() + 1)),
            &mut fx,
        );
        fx.tick(MS_400);
        for done in fx.drain_finished() {
            controller.complete(done);
        }
        assert_eq!(finishes.get(), 1);

        // Second show without callbacks must not replay the first one.
        controller.hide(TransitionOptions::immediate(), &mut fx);
        controller.show(TransitionOptions::animated(), &mut fx);
        fx.tick(MS_400);
        for done in fx.drain_finished() {
            controller.complete(done);
        }
        assert_eq!(finishes.get(), 1, "per-call callbacks are consumed");
    }
}
