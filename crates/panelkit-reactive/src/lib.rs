#![forbid(unsafe_code)]

//! Reactive primitives for panelkit.
//!
//! This crate holds the value-level building blocks the view stack is wired
//! with: [`ReactiveCell`] (an observable value slot), [`ReactiveList`] (an
//! observable sequence), and the binding layer ([`FieldTable`] + [`Binder`])
//! that connects named model fields to change handlers.
//!
//! Everything here is single-threaded by contract: cells use `RefCell`
//! interior mutability and `Rc`-shared handlers, and nothing is `Send` or
//! `Sync`. Notification is synchronous and ordered; see the module docs for
//! the exact re-entrancy rules.

pub mod binder;
pub mod cell;
pub mod fields;
pub mod list;

pub use binder::Binder;
pub use cell::{ChangeFn, ReactiveCell, SubscriberId};
pub use fields::{Bindable, BindingError, CellAccessor, FieldTable};
pub use list::{ListEvent, ReactiveList};
