#![forbid(unsafe_code)]

//! View-model lifecycle state machine.
//!
//! A view-model moves through six phases:
//!
//! ```text
//! Idle -> ShowInProgress -> Shown -> HideInProgress -> Hidden -> Destroyed
//!              ^                                          |
//!              +------------------- reopen ---------------+
//! ```
//!
//! # Invariants
//!
//! 1. Showing and hiding are distinct phases of one enum, so a view-model is
//!    never "showing" and "hiding" at once.
//! 2. The first-show latch fires exactly once per lifecycle: the first
//!    [`begin_show`](Lifecycle::begin_show) returns `true`, every later one
//!    `false`.
//! 3. The hidden timer accrues only while the phase is `Hidden`, and
//!    [`finish_hide`](Lifecycle::finish_hide) resets it, so time spent
//!    visible never counts toward eviction.
//! 4. `Destroyed` is terminal: all transitions after it are no-ops.
//!
//! # Design
//!
//! Transitions are tolerant rather than checked: a `begin_show` while a hide
//! is still animating simply moves the phase on. Overlapping transitions are
//! a documented race (see the controller), and the phase always reflects the
//! most recent transition call.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::model::ViewModel;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Lifecycle phase of a view-model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Constructed, never shown.
    Idle,
    /// Show transition running.
    ShowInProgress,
    /// Fully visible.
    Shown,
    /// Hide transition running.
    HideInProgress,
    /// Fully hidden, eligible for retention eviction.
    Hidden,
    /// Torn down; terminal.
    Destroyed,
}

impl Phase {
    /// All phases, in lifecycle order.
    pub const ALL: [Phase; 6] = [
        Phase::Idle,
        Phase::ShowInProgress,
        Phase::Shown,
        Phase::HideInProgress,
        Phase::Hidden,
        Phase::Destroyed,
    ];

    /// Short lowercase label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::ShowInProgress => "show-in-progress",
            Phase::Shown => "shown",
            Phase::HideInProgress => "hide-in-progress",
            Phase::Hidden => "hidden",
            Phase::Destroyed => "destroyed",
        }
    }

    /// True while the view occupies the stage (visible or transitioning).
    #[must_use]
    pub const fn is_on_stage(self) -> bool {
        matches!(
            self,
            Phase::ShowInProgress | Phase::Shown | Phase::HideInProgress
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Per-view-model lifecycle state: phase, first-show latch, hidden timer,
/// and the non-owning parent link.
pub struct Lifecycle {
    phase: Cell<Phase>,
    first_show_done: Cell<bool>,
    hidden_for: Cell<Duration>,
    parent: RefCell<Option<Weak<dyn ViewModel>>>,
}

impl Lifecycle {
    /// Creates lifecycle state in `Idle` with a zero hidden timer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Cell::new(Phase::Idle),
            first_show_done: Cell::new(false),
            hidden_for: Cell::new(Duration::ZERO),
            parent: RefCell::new(None),
        }
    }

    // ---- transitions ----

    /// Enters `ShowInProgress`. Returns `true` on the first show of this
    /// lifecycle (the one-time-init latch), `false` otherwise. No-op
    /// returning `false` once destroyed.
    pub fn begin_show(&self) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.phase.set(Phase::ShowInProgress);
        !self.first_show_done.replace(true)
    }

    /// Enters `Shown`. No-op once destroyed.
    pub fn finish_show(&self) {
        if !self.is_destroyed() {
            self.phase.set(Phase::Shown);
        }
    }

    /// Enters `HideInProgress`. No-op once destroyed.
    pub fn begin_hide(&self) {
        if !self.is_destroyed() {
            self.phase.set(Phase::HideInProgress);
        }
    }

    /// Enters `Hidden` and resets the hidden timer. No-op once destroyed.
    pub fn finish_hide(&self) {
        if !self.is_destroyed() {
            self.phase.set(Phase::Hidden);
            self.hidden_for.set(Duration::ZERO);
        }
    }

    /// Enters `Destroyed` (terminal).
    pub fn destroy(&self) {
        self.phase.set(Phase::Destroyed);
    }

    // ---- hidden timer ----

    /// Adds `dt` to the hidden timer, but only while the phase is `Hidden`.
    pub fn accrue_hidden(&self, dt: Duration) {
        if self.phase.get() == Phase::Hidden {
            self.hidden_for.set(self.hidden_for.get() + dt);
        }
    }

    /// Resets the hidden timer to zero.
    pub fn reset_hidden_timer(&self) {
        self.hidden_for.set(Duration::ZERO);
    }

    /// Time accrued in `Hidden` since the last reset.
    #[must_use]
    pub fn hidden_for(&self) -> Duration {
        self.hidden_for.get()
    }

    // ---- queries ----

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// True while a show transition is running.
    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.phase.get() == Phase::ShowInProgress
    }

    /// True once fully visible.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.phase.get() == Phase::Shown
    }

    /// True while a hide transition is running.
    #[must_use]
    pub fn is_hiding(&self) -> bool {
        self.phase.get() == Phase::HideInProgress
    }

    /// True once fully hidden.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.phase.get() == Phase::Hidden
    }

    /// True once destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.phase.get() == Phase::Destroyed
    }

    /// True once the first show has run.
    #[must_use]
    pub fn first_show_done(&self) -> bool {
        self.first_show_done.get()
    }

    // ---- parent link ----

    /// Stores a non-owning link to `parent` (kept as a `Weak`).
    pub fn set_parent(&self, parent: Rc<dyn ViewModel>) {
        *self.parent.borrow_mut() = Some(Rc::downgrade(&parent));
    }

    /// Clears the parent link.
    pub fn clear_parent(&self) {
        *self.parent.borrow_mut() = None;
    }

    /// Upgrades the parent link, if set and still alive.
    #[must_use]
    pub fn parent(&self) -> Option<Rc<dyn ViewModel>> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("phase", &self.phase.get())
            .field("first_show_done", &self.first_show_done.get())
            .field("hidden_for", &self.hidden_for.get())
            .field("has_parent", &self.parent.borrow().is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
