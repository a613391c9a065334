#![forbid(unsafe_code)]

//! View-side building blocks for panelkit.
//!
//! One view type pairs one visual tree with one view-model instance. This
//! crate defines the pieces that pairing is assembled from:
//!
//! - [`lifecycle`]: the six-phase view-model state machine.
//! - [`model`]: the [`ViewModel`](model::ViewModel) trait, its lifecycle
//!   notifications, and the parent/ancestor walk.
//! - [`visual`]: the engine-agnostic visual-tree handle and its template.
//! - [`fx`]: the transition-animation collaborator (tickets, tick, drain).
//! - [`view`]: view declarations (type id, layer, retention, descriptor)
//!   and the [`View`](view::View) trait.
//! - [`controller`]: the [`ViewController`](controller::ViewController)
//!   that owns all of the above for one live view.
//!
//! The registry crate drives these from its manager; nothing here reaches
//! for global state.

pub mod controller;
pub mod fx;
pub mod lifecycle;
pub mod model;
pub mod view;
pub mod visual;

pub use controller::{ControllerError, ViewController};
pub use fx::{Animator, FxTicket, ImmediateFx, TimedFx};
pub use lifecycle::{Lifecycle, Phase};
pub use model::{ModelSlot, ViewModel, find_ancestor};
pub use view::{Layer, Retention, TransitionOptions, View, ViewDescriptor, ViewError, ViewTypeId};
pub use visual::{VisualTemplate, VisualTree};
