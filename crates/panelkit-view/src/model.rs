#![forbid(unsafe_code)]

//! The view-model trait, its lifecycle notifications, and ancestor lookup.
//!
//! A view-model is plain data plus reactive cells; it knows nothing about
//! visuals or the registry. The controller drives it through the `notify_*`
//! functions here, which pair each [`Lifecycle`] transition with the
//! matching optional hook.
//!
//! # Usage
//!
//! ```ignore
//! #[derive(Default)]
//! struct HudModel {
//!     lifecycle: Lifecycle,
//!     power: ReactiveCell<f32>,
//! }
//!
//! impl ViewModel for HudModel {
//!     fn lifecycle(&self) -> &Lifecycle {
//!         &self.lifecycle
//!     }
//!     fn on_first_show(&self) {
//!         self.power.set(1.0);
//!     }
//! }
//! ```
//!
//! # Design
//!
//! Models are shared as `Rc<M>`; parent links are `Weak` so an upward chain
//! never keeps a destroyed subtree alive. [`find_ancestor`] walks those
//! links to a concrete type, which is how a child model reaches shared state
//! without any global registry.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use crate::lifecycle::Lifecycle;

// ---------------------------------------------------------------------------
// ViewModel
// ---------------------------------------------------------------------------

/// One view's state holder.
///
/// Hooks default to no-ops; implement only what the model needs. Hook order
/// during a transition: `on_first_show` (once per lifecycle, before the
/// first `on_show`), then `on_show`; `on_hide` at hide start; `on_destroy`
/// before the phase flips to `Destroyed`.
pub trait ViewModel: Any {
    /// Lifecycle state owned by this model.
    fn lifecycle(&self) -> &Lifecycle;

    /// One-time setup, first show only.
    fn on_first_show(&self) {}

    /// A show transition is starting.
    fn on_show(&self) {}

    /// A hide transition is starting.
    fn on_hide(&self) {}

    /// The view is being torn down.
    fn on_destroy(&self) {}
}

// ---------------------------------------------------------------------------
// Lifecycle notifications
// ---------------------------------------------------------------------------

/// Advances to `ShowInProgress`, firing `on_first_show` exactly once per
/// lifecycle, then `on_show`.
pub fn notify_show_start(model: &dyn ViewModel) {
    if model.lifecycle().begin_show() {
        model.on_first_show();
    }
    model.on_show();
}

/// Advances to `Shown`.
pub fn notify_show_finish(model: &dyn ViewModel) {
    model.lifecycle().finish_show();
}

/// Advances to `HideInProgress` and fires `on_hide`.
pub fn notify_hide_start(model: &dyn ViewModel) {
    model.lifecycle().begin_hide();
    model.on_hide();
}

/// Advances to `Hidden` (resetting the hidden timer).
pub fn notify_hide_finish(model: &dyn ViewModel) {
    model.lifecycle().finish_hide();
}

/// Fires `on_destroy`, then flips the phase to `Destroyed`.
pub fn notify_destroy(model: &dyn ViewModel) {
    model.on_destroy();
    model.lifecycle().destroy();
}

// ---------------------------------------------------------------------------
// Ancestor lookup
// ---------------------------------------------------------------------------

/// Parent chains longer than this are treated as cycles and abandoned.
const MAX_ANCESTOR_DEPTH: usize = 64;

/// Walks parent links upward from `origin`, returning the first ancestor of
/// concrete type `M`.
///
/// Returns `None` when no ancestor matches, when the chain ends, or when it
/// exceeds [`MAX_ANCESTOR_DEPTH`] (logged; a cycle in parent links is a
/// caller bug).
#[must_use]
pub fn find_ancestor<M: ViewModel>(origin: &dyn ViewModel) -> Option<Rc<M>> {
    let mut cursor = origin.lifecycle().parent();
    let mut depth = 0usize;
    while let Some(model) = cursor {
        if depth >= MAX_ANCESTOR_DEPTH {
            warn!(depth, "ancestor walk abandoned; parent chain too deep");
            return None;
        }
        let next = model.lifecycle().parent();
        let any: Rc<dyn Any> = model;
        if let Ok(found) = any.downcast::<M>() {
            return Some(found);
        }
        cursor = next;
        depth += 1;
    }
    None
}

// ---------------------------------------------------------------------------
// ModelSlot
// ---------------------------------------------------------------------------

/// Identity-compared holder for an optional shared model.
///
/// Equality is `Rc::ptr_eq`, never value equality, so a reactive cell
/// holding a slot notifies when the *instance* changes and stays silent
/// when the same instance is re-assigned. This is exactly the contract the
/// controller's binding-context slot needs.
pub struct ModelSlot<M>(Option<Rc<M>>);

impl<M> ModelSlot<M> {
    /// An empty slot.
    #[must_use]
    pub const fn empty() -> Self {
        Self(None)
    }

    /// A slot holding `model`.
    #[must_use]
    pub fn filled(model: Rc<M>) -> Self {
        Self(Some(model))
    }

    /// The held model, if any.
    #[must_use]
    pub fn get(&self) -> Option<&Rc<M>> {
        self.0.as_ref()
    }

    /// True if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

impl<M> Clone for ModelSlot<M> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<M> PartialEq for ModelSlot<M> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<M> Default for ModelSlot<M> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<M> fmt::Debug for ModelSlot<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("ModelSlot(filled)"),
            None => f.write_str("ModelSlot(empty)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
