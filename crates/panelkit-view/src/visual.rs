#![forbid(unsafe_code)]

//! Engine-agnostic visual-tree handles.
//!
//! A [`VisualTree`] stands for one instantiated widget hierarchy in the host
//! rendering engine: the orchestration layer only tracks the coarse state it
//! owns (visibility, interactivity, opacity) plus an opaque payload the host
//! engine and the concrete [`View`] agree on. A [`VisualTemplate`] is the
//! resolved, reusable recipe a tree is instantiated from; the registry
//! resolves each template at most once per view type and instantiates a
//! fresh tree per controller build.
//!
//! [`View`]: crate::view::View

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// VisualTree
// ---------------------------------------------------------------------------

/// One live widget hierarchy.
///
/// Fresh trees start invisible and transparent; the controller applies the
/// terminal states as transitions start and finish.
pub struct VisualTree {
    path: Arc<str>,
    visible: bool,
    interactive: bool,
    opacity: f32,
    payload: Box<dyn Any>,
}

impl VisualTree {
    /// Wraps `payload` as a hidden, transparent, interactive tree.
    #[must_use]
    pub fn new(path: impl Into<Arc<str>>, payload: Box<dyn Any>) -> Self {
        Self {
            path: path.into(),
            visible: false,
            interactive: true,
            opacity: 0.0,
            payload,
        }
    }

    /// Resource path this tree was instantiated from.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True if the tree participates in rendering.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// True if the tree accepts input.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Current opacity in `[0.0, 1.0]`.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Sets rendering participation.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Sets input acceptance.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Sets opacity, clamped to `[0.0, 1.0]`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Borrows the payload as `P`, if it is one.
    #[must_use]
    pub fn payload_ref<P: 'static>(&self) -> Option<&P> {
        self.payload.downcast_ref::<P>()
    }

    /// Mutably borrows the payload as `P`, if it is one.
    pub fn payload_mut<P: 'static>(&mut self) -> Option<&mut P> {
        self.payload.downcast_mut::<P>()
    }
}

impl fmt::Debug for VisualTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualTree")
            .field("path", &self.path)
            .field("visible", &self.visible)
            .field("interactive", &self.interactive)
            .field("opacity", &self.opacity)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// VisualTemplate
// ---------------------------------------------------------------------------

/// Reusable recipe for instantiating [`VisualTree`]s at one resource path.
///
/// Cheap to clone; the payload factory is shared.
#[derive(Clone)]
pub struct VisualTemplate {
    path: Arc<str>,
    factory: Rc<dyn Fn() -> Box<dyn Any>>,
}

impl VisualTemplate {
    /// Creates a template whose `factory` builds one payload per
    /// instantiation.
    pub fn new(path: impl Into<Arc<str>>, factory: impl Fn() -> Box<dyn Any> + 'static) -> Self {
        Self {
            path: path.into(),
            factory: Rc::new(factory),
        }
    }

    /// Resource path this template was resolved from.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Builds a fresh tree (hidden, transparent) with a fresh payload.
    #[must_use]
    pub fn instantiate(&self) -> VisualTree {
        VisualTree::new(Arc::clone(&self.path), (self.factory)())
    }
}

impl fmt::Debug for VisualTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualTemplate")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
