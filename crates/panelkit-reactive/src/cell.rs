#![forbid(unsafe_code)]

//! Observable value slot with ordered, synchronous change notification.
//!
//! A [`ReactiveCell`] owns one value and a list of subscribers. Writing a
//! value that compares equal to the current one is a complete no-op; writing
//! an unequal value stores it first, then invokes every subscriber with
//! `(&old, &new)` in subscription order.
//!
//! # Usage
//!
//! ```ignore
//! use panelkit_reactive::ReactiveCell;
//!
//! let score = ReactiveCell::new(0u32);
//! let id = score.subscribe(|old, new| println!("{old} -> {new}"));
//! score.set(10); // notifies
//! score.set(10); // no-op
//! score.unsubscribe(id);
//! ```
//!
//! # Invariants
//!
//! 1. `set` with an equal value never stores and never notifies.
//! 2. Subscribers run synchronously, in subscription order.
//! 3. The new value is stored before any subscriber runs, so re-entrant
//!    reads observe the updated cell.
//! 4. [`SubscriberId`]s are unique process-wide and never reused; a stale or
//!    foreign id passed to `unsubscribe` is a no-op.
//! 5. Re-entrant `set`/`subscribe`/`unsubscribe` from inside a handler must
//!    not panic: the handler list is snapshotted per notification and the
//!    value borrow is released before handlers run.
//!
//! # Design
//!
//! The snapshot rule has two observable consequences, both deliberate: a
//! handler subscribed during a notification pass is not called for that
//! pass, and a handler unsubscribed during the pass may still receive the
//! in-flight notification. Notification passes re-entered via `set` nest
//! (inner pass completes first), which keeps delivery synchronous without
//! a deferral queue.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// Subscriber identity
// ---------------------------------------------------------------------------

/// Change handler signature: called with `(&old, &new)` after a cell update.
pub type ChangeFn<T> = dyn Fn(&T, &T);

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying one subscription.
///
/// Ids are allocated from a process-wide counter, so a handle minted by one
/// cell is never valid for another and unsubscribing with it elsewhere is a
/// harmless no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

pub(crate) fn next_subscriber_id() -> SubscriberId {
    SubscriberId(NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed))
}

// ---------------------------------------------------------------------------
// ReactiveCell
// ---------------------------------------------------------------------------

struct Subscriber<T> {
    id: SubscriberId,
    handler: Rc<ChangeFn<T>>,
}

struct CellState<T> {
    value: T,
    subscribers: Vec<Subscriber<T>>,
}

/// Single-threaded observable value slot.
///
/// Owned by exactly one holder (typically a view-model field); deliberately
/// not `Clone`. Sharing happens at the handler level, not the cell level.
pub struct ReactiveCell<T> {
    state: RefCell<CellState<T>>,
}

impl<T> ReactiveCell<T> {
    /// Creates a cell holding `initial` with no subscribers.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            state: RefCell::new(CellState {
                value: initial,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Borrows the current value for the duration of `f`.
    ///
    /// Prefer this over [`get`](Self::get) when `T` is expensive to clone.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.borrow().value)
    }

    /// Returns a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.state.borrow().value.clone()
    }

    /// Registers `handler` and returns its id.
    pub fn subscribe(&self, handler: impl Fn(&T, &T) + 'static) -> SubscriberId {
        self.subscribe_shared(Rc::new(handler))
    }

    /// Registers an already-shared handler and returns its id.
    ///
    /// Used by the binder so that repeated bind/unbind cycles reattach the
    /// same handler allocation instead of re-boxing it each time.
    pub fn subscribe_shared(&self, handler: Rc<ChangeFn<T>>) -> SubscriberId {
        let id = next_subscriber_id();
        self.state
            .borrow_mut()
            .subscribers
            .push(Subscriber { id, handler });
        id
    }

    /// Removes the subscription with `id`. No-op for stale or foreign ids.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.state.borrow_mut().subscribers.retain(|s| s.id != id);
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }
}

impl<T: PartialEq + Clone> ReactiveCell<T> {
    /// Stores `value` and notifies subscribers, unless it equals the current
    /// value (then nothing happens at all).
    pub fn set(&self, value: T) {
        let (old, new, handlers) = {
            let mut state = self.state.borrow_mut();
            if state.value == value {
                return;
            }
            let old = std::mem::replace(&mut state.value, value);
            let new = state.value.clone();
            let handlers: Vec<Rc<ChangeFn<T>>> = state
                .subscribers
                .iter()
                .map(|s| Rc::clone(&s.handler))
                .collect();
            (old, new, handlers)
        };
        // Borrow released above; handlers are free to touch the cell.
        for handler in handlers {
            handler(&old, &new);
        }
    }
}

impl<T: Default> Default for ReactiveCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ReactiveCell")
            .field("value", &state.value)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
