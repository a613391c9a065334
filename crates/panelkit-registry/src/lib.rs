#![forbid(unsafe_code)]

//! The view registry: declaration, storage, and orchestration of views.
//!
//! A [`ViewManifest`] declares every view type up front; [`ViewManager`]
//! validates the manifest at construction, then serves `open`, `close`,
//! `destroy`, and model lookup against it. Resident views are cached per
//! type and reused; hidden ones are evicted by a throttled retention sweep
//! driven from [`ViewManager::advance`].
//!
//! # Usage
//!
//! ```ignore
//! let manifest = ViewManifest::new()
//!     .declare::<HudPanel>()
//!     .declare::<EditPopup>();
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
//!
//! # Failure Modes
//!
//! Every registry error is recoverable: a failed `open` leaves no partial
//! residue, a `close`/`destroy` of an absent view is logged and ignored,
//! and a model lookup miss returns [`RegistryError::ModelNotFound`].

pub mod assets;
pub mod error;
pub mod manager;

mod layers;
mod nav;

pub use assets::{AssetSource, MapAssets};
pub use error::{AssetError, RegistryError};
pub use manager::{ManagerConfig, ViewManager, ViewManifest};
