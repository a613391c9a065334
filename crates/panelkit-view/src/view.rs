#![forbid(unsafe_code)]

//! View declarations: type ids, layers, retention, descriptors, and the
//! [`View`] trait.
//!
//! Every view type declares its static metadata in a [`ViewDescriptor`]
//! returned from [`View::descriptor`]. The registry collects descriptors
//! into its manifest at startup; there is no scanning and no global table,
//! a view exists to the system exactly when it was declared.
//!
//! # Usage
//!
//! ```ignore
//! struct HudPanel {
//!     callsign_label: TextSlot,
//! }
//!
//! impl View for HudPanel {
//!     type Model = HudModel;
//!
//!     fn descriptor() -> ViewDescriptor {
//!         ViewDescriptor::new(ViewTypeId::new("hud"), Layer::Menu, Retention::Permanent)
//!     }
//!
//!     fn attach(visual: &mut VisualTree) -> Result<Self, ViewError> {
//!         let widgets = visual
//!             .payload_ref::<HudWidgets>()
//!             .ok_or_else(|| ViewError::component_missing::<Self>("HudWidgets payload"))?;
//!         Ok(Self { callsign_label: widgets.callsign.clone() })
//!     }
//!
//!     fn configure(&mut self, binder: &mut Binder<HudModel>) -> Result<(), BindingError> {
//!         let label = self.callsign_label.clone();
//!         binder.add::<String>("callsign", move |_, new| label.set(new.clone()))
//!     }
//! }
//! ```

use std::error::Error;
use std::fmt;
use std::time::Duration;

use panelkit_reactive::{Bindable, Binder, BindingError};

use crate::model::ViewModel;
use crate::visual::VisualTree;

// ---------------------------------------------------------------------------
// ViewTypeId
// ---------------------------------------------------------------------------

/// Stable identifier for a view type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewTypeId(&'static str);

impl ViewTypeId {
    /// Wraps a static identifier string.
    #[must_use]
    pub const fn new(raw: &'static str) -> Self {
        Self(raw)
    }

    /// The identifier string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ViewTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// ---------------------------------------------------------------------------
// Layer
// ---------------------------------------------------------------------------

/// Z-ordering band a view renders in.
///
/// Every view in a higher layer renders above every view in a lower one;
/// ordering within a layer is most-recently-shown-in-front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Backdrop content.
    Background,
    /// Main scene panels.
    Base,
    /// Menus and HUD chrome.
    Menu,
    /// Modal popups.
    Popup,
    /// Transient top-most content (toasts, tooltips).
    Overlay,
}

impl Layer {
    /// All layers, back to front.
    pub const ALL: [Layer; 5] = [
        Layer::Background,
        Layer::Base,
        Layer::Menu,
        Layer::Popup,
        Layer::Overlay,
    ];

    /// Short lowercase label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Layer::Background => "background",
            Layer::Base => "base",
            Layer::Menu => "menu",
            Layer::Popup => "popup",
            Layer::Overlay => "overlay",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Retention
// ---------------------------------------------------------------------------

/// How long a hidden view's controller stays resident before eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Retention {
    /// Never evicted.
    Permanent,
    /// Evicted after 3 seconds hidden.
    Short,
    /// Evicted after 60 seconds hidden.
    Medium,
    /// Evicted after 180 seconds hidden.
    Long,
}

impl Retention {
    /// All retention classes.
    pub const ALL: [Retention; 4] = [
        Retention::Permanent,
        Retention::Short,
        Retention::Medium,
        Retention::Long,
    ];

    /// Hidden time after which eviction strikes; `None` means never.
    #[must_use]
    pub const fn threshold(self) -> Option<Duration> {
        match self {
            Retention::Permanent => None,
            Retention::Short => Some(Duration::from_secs(3)),
            Retention::Medium => Some(Duration::from_secs(60)),
            Retention::Long => Some(Duration::from_secs(180)),
        }
    }

    /// Short lowercase label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Retention::Permanent => "permanent",
            Retention::Short => "short",
            Retention::Medium => "medium",
            Retention::Long => "long",
        }
    }
}

impl fmt::Display for Retention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// ViewDescriptor
// ---------------------------------------------------------------------------

/// Static metadata for one view type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewDescriptor {
    type_id: ViewTypeId,
    layer: Layer,
    retention: Retention,
    resource: Option<&'static str>,
}

impl ViewDescriptor {
    /// Declares a view with the default resource path
    /// (`<prefix><type-id>`, prefix chosen by the registry config).
    #[must_use]
    pub const fn new(type_id: ViewTypeId, layer: Layer, retention: Retention) -> Self {
        Self {
            type_id,
            layer,
            retention,
            resource: None,
        }
    }

    /// Overrides the resource path.
    #[must_use]
    pub const fn resource(mut self, path: &'static str) -> Self {
        self.resource = Some(path);
        self
    }

    /// The view's type id.
    #[must_use]
    pub const fn type_id(&self) -> ViewTypeId {
        self.type_id
    }

    /// The layer this view renders in.
    #[must_use]
    pub const fn layer(&self) -> Layer {
        self.layer
    }

    /// The retention class applied when hidden.
    #[must_use]
    pub const fn retention(&self) -> Retention {
        self.retention
    }

    /// The explicit resource path, if one was declared.
    #[must_use]
    pub const fn resource_override(&self) -> Option<&'static str> {
        self.resource
    }

    /// The effective resource path under `prefix`.
    #[must_use]
    pub fn resource_path(&self, prefix: &str) -> String {
        match self.resource {
            Some(path) => path.to_string(),
            None => format!("{prefix}{}", self.type_id),
        }
    }
}

// ---------------------------------------------------------------------------
// ViewError
// ---------------------------------------------------------------------------

/// View-side wiring failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// A widget or payload the view requires was absent from its visual
    /// tree.
    ComponentMissing {
        /// The view being attached.
        type_id: ViewTypeId,
        /// What was missing.
        detail: String,
    },
}

impl ViewError {
    /// Builds a `ComponentMissing` for view type `V`.
    #[must_use]
    pub fn component_missing<V: View>(detail: impl Into<String>) -> Self {
        Self::ComponentMissing {
            type_id: V::descriptor().type_id(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ComponentMissing { type_id, detail } => {
                write!(f, "view `{type_id}` is missing a component: {detail}")
            }
        }
    }
}

impl Error for ViewError {}

// ---------------------------------------------------------------------------
// TransitionOptions
// ---------------------------------------------------------------------------

/// Per-call options for one show or hide.
///
/// Callbacks belong to exactly the call they were passed to: `on_start`
/// fires synchronously as the transition starts, `on_finish` when it
/// completes (same call for immediate transitions, a later tick for
/// animated ones). They are consumed either way and never survive into the
/// next open or close.
#[derive(Default)]
pub struct TransitionOptions {
    immediate: bool,
    on_start: Option<Box<dyn FnOnce()>>,
    on_finish: Option<Box<dyn FnOnce()>>,
}

impl TransitionOptions {
    /// An animated transition (the default).
    #[must_use]
    pub fn animated() -> Self {
        Self::default()
    }

    /// A transition that applies its terminal state synchronously.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            immediate: true,
            on_start: None,
            on_finish: None,
        }
    }

    /// Runs `f` when the transition starts.
    #[must_use]
    pub fn on_start(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    /// Runs `f` when the transition finishes.
    #[must_use]
    pub fn on_finish(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_finish = Some(Box::new(f));
        self
    }

    /// True if the terminal state applies synchronously.
    #[must_use]
    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    /// Decomposes into `(immediate, on_start, on_finish)`.
    pub(crate) fn into_parts(
        self,
    ) -> (bool, Option<Box<dyn FnOnce()>>, Option<Box<dyn FnOnce()>>) {
        (self.immediate, self.on_start, self.on_finish)
    }
}

impl fmt::Debug for TransitionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionOptions")
            .field("immediate", &self.immediate)
            .field("on_start", &self.on_start.is_some())
            .field("on_finish", &self.on_finish.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// One view type: a visual tree paired with a model type.
///
/// Implementations locate their widgets in [`attach`](View::attach) and
/// register change handlers in [`configure`](View::configure); both run
/// once per controller build. The `on_*` hooks run at transition
/// boundaries and default to no-ops.
pub trait View: Sized + 'static {
    /// The model type this view binds to.
    type Model: ViewModel + Bindable + Default;

    /// Static metadata for this view type.
    fn descriptor() -> ViewDescriptor;

    /// Locates required widgets in `visual`'s payload.
    fn attach(visual: &mut VisualTree) -> Result<Self, ViewError>;

    /// Registers change handlers on `binder`. Configuration errors abort
    /// the controller build.
    fn configure(&mut self, binder: &mut Binder<Self::Model>) -> Result<(), BindingError>;

    /// A show transition is starting.
    fn on_show_start(&mut self, _model: &Self::Model, _immediate: bool) {}

    /// A show transition finished.
    fn on_show_finish(&mut self, _model: &Self::Model) {}

    /// A hide transition is starting.
    fn on_hide_start(&mut self, _model: &Self::Model, _immediate: bool) {}

    /// A hide transition finished.
    fn on_hide_finish(&mut self, _model: &Self::Model) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
