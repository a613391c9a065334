#![forbid(unsafe_code)]

//! panelkit: reactive view orchestration for layered panel UIs.
//!
//! One view type pairs one visual tree with one view-model. Models expose
//! state as reactive cells; views declare named bindings against them; a
//! manifest-driven manager owns residency, navigation, layering, and
//! retention. Everything runs single-threaded and is driven by an
//! explicit per-frame [`ViewManager::advance`] call.
//!
//! # Usage
//!
//! ```ignore
//! use panelkit::prelude::*;
//!
//! let manifest = ViewManifest::new().declare::<HudPanel>();
//! let mut manager = ViewManager::new(
//!     manifest,
//!     ManagerConfig::default(),
//!     Box::new(assets),
//!     Box::new(TimedFx::new()),
//! );
//! manager.open::<HudPanel>(TransitionOptions::animated())?;
//! loop {
//!     manager.advance(frame_dt);
//! }
//! ```

pub use panelkit_reactive as reactive;
pub use panelkit_registry as registry;
pub use panelkit_view as view;

pub use panelkit_reactive::{
    Bindable, Binder, BindingError, CellAccessor, ChangeFn, FieldTable, ListEvent, ReactiveCell,
    ReactiveList, SubscriberId,
};
pub use panelkit_registry::{
    AssetError, AssetSource, ManagerConfig, MapAssets, RegistryError, ViewManager, ViewManifest,
};
pub use panelkit_view::{
    Animator, ControllerError, FxTicket, ImmediateFx, Layer, Lifecycle, ModelSlot, Phase,
    Retention, TimedFx, TransitionOptions, View, ViewController, ViewDescriptor, ViewError,
    ViewModel, ViewTypeId, VisualTemplate, VisualTree, find_ancestor,
};

/// Convenience result over the registry's error type.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Everything a host needs to declare views and drive the manager.
pub mod prelude {
    pub use crate::{
        Animator, AssetSource, Bindable, Binder, BindingError, FieldTable, ImmediateFx, Layer,
        Lifecycle, ManagerConfig, MapAssets, ModelSlot, Phase, ReactiveCell, Retention, TimedFx,
        TransitionOptions, View, ViewDescriptor, ViewError, ViewManager, ViewManifest, ViewModel,
        ViewTypeId, VisualTemplate, VisualTree, find_ancestor,
    };
}
