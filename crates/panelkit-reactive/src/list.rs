#![forbid(unsafe_code)]

//! Observable sequence with per-mutation change events.
//!
//! [`ReactiveList`] mirrors the cell contract for ordered data: every
//! structural mutation notifies subscribers synchronously, in subscription
//! order, with a [`ListEvent`] describing the change. Replacing an element
//! with an equal value is a no-op, matching [`ReactiveCell`] semantics.
//!
//! Event payloads borrow snapshots taken before notification, so handlers
//! may re-enter the list (push, remove, subscribe) without panicking.
//!
//! [`ReactiveCell`]: crate::cell::ReactiveCell

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::cell::{SubscriberId, next_subscriber_id};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A structural change delivered to list subscribers.
#[derive(Debug, PartialEq)]
pub enum ListEvent<'a, T> {
    /// `value` appended at `index` (the previous length).
    Pushed { index: usize, value: &'a T },
    /// `value` inserted at `index`, shifting later elements right.
    Inserted { index: usize, value: &'a T },
    /// `value` removed from `index`, shifting later elements left.
    Removed { index: usize, value: &'a T },
    /// Element at `index` replaced; `old` and `new` are unequal.
    Replaced { index: usize, old: &'a T, new: &'a T },
}

/// List event handler signature.
pub type ListFn<T> = dyn Fn(&ListEvent<'_, T>);

// ---------------------------------------------------------------------------
// ReactiveList
// ---------------------------------------------------------------------------

struct ListState<T> {
    items: Vec<T>,
    subscribers: Vec<(SubscriberId, Rc<ListFn<T>>)>,
}

/// Single-threaded observable `Vec`.
pub struct ReactiveList<T> {
    state: RefCell<ListState<T>>,
}

impl<T> ReactiveList<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefCell::new(ListState {
                items: Vec::new(),
                subscribers: Vec::new(),
            }),
        }
    }

    /// Registers `handler` and returns its id.
    pub fn subscribe(&self, handler: impl Fn(&ListEvent<'_, T>) + 'static) -> SubscriberId {
        let id = next_subscriber_id();
        self.state.borrow_mut().subscribers.push((id, Rc::new(handler)));
        id
    }

    /// Removes the subscription with `id`. No-op for stale or foreign ids.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.state
            .borrow_mut()
            .subscribers
            .retain(|(sid, _)| *sid != id);
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().items.len()
    }

    /// True if the list holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().items.is_empty()
    }

    /// Borrows the elements for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.state.borrow().items)
    }

    fn handlers(&self) -> Vec<Rc<ListFn<T>>> {
        self.state
            .borrow()
            .subscribers
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect()
    }

    fn notify(handlers: &[Rc<ListFn<T>>], event: &ListEvent<'_, T>) {
        for handler in handlers {
            handler(event);
        }
    }
}

impl<T: Clone> ReactiveList<T> {
    /// Returns a clone of the element at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.state.borrow().items.get(index).cloned()
    }

    /// Appends `value` and notifies with [`ListEvent::Pushed`].
    pub fn push(&self, value: T) {
        let (index, snapshot, handlers) = {
            let mut state = self.state.borrow_mut();
            let index = state.items.len();
            state.items.push(value);
            let snapshot = state.items[index].clone();
            drop(state);
            (index, snapshot, self.handlers())
        };
        Self::notify(&handlers, &ListEvent::Pushed {
            index,
            value: &snapshot,
        });
    }

    /// Inserts `value` at `index` and notifies with [`ListEvent::Inserted`].
    ///
    /// Panics if `index > len`, like `Vec::insert`.
    pub fn insert(&self, index: usize, value: T) {
        let (snapshot, handlers) = {
            let mut state = self.state.borrow_mut();
            state.items.insert(index, value);
            let snapshot = state.items[index].clone();
            drop(state);
            (snapshot, self.handlers())
        };
        Self::notify(&handlers, &ListEvent::Inserted {
            index,
            value: &snapshot,
        });
    }

    /// Removes and returns the element at `index`, notifying with
    /// [`ListEvent::Removed`].
    ///
    /// Panics if `index >= len`, like `Vec::remove`.
    pub fn remove(&self, index: usize) -> T {
        let (removed, handlers) = {
            let mut state = self.state.borrow_mut();
            let removed = state.items.remove(index);
            drop(state);
            (removed, self.handlers())
        };
        Self::notify(&handlers, &ListEvent::Removed {
            index,
            value: &removed,
        });
        removed
    }
}

impl<T: Clone + PartialEq> ReactiveList<T> {
    /// Replaces the element at `index`, notifying with
    /// [`ListEvent::Replaced`] unless `value` equals the current element.
    ///
    /// Panics if `index >= len`, like slice indexing.
    pub fn set(&self, index: usize, value: T) {
        let Some((old, new, handlers)) = ({
            let mut state = self.state.borrow_mut();
            if state.items[index] == value {
                None
            } else {
                let old = std::mem::replace(&mut state.items[index], value);
                let new = state.items[index].clone();
                drop(state);
                Some((old, new, self.handlers()))
            }
        }) else {
            return;
        };
        Self::notify(&handlers, &ListEvent::Replaced {
            index,
            old: &old,
            new: &new,
        });
    }
}

impl<T> Default for ReactiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ReactiveList")
            .field("items", &state.items)
            .field("subscribers", &state.subscribers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
