#![forbid(unsafe_code)]

//! Registry error taxonomy.
//!
//! Everything here is recoverable: the manager logs the failure, leaves its
//! tables untouched, and keeps serving. Callers that want to react (retry,
//! fall back, surface a message) match on the variant.

use std::error::Error;
use std::fmt;

use panelkit_reactive::BindingError;
use panelkit_view::{ControllerError, ViewError, ViewTypeId};

// ---------------------------------------------------------------------------
// AssetError
// ---------------------------------------------------------------------------

/// Template resolution failure from an [`AssetSource`](crate::AssetSource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// No template is stored under the requested path.
    NotFound {
        /// The path that was asked for.
        path: String,
    },
    /// The source found the path but could not produce a template.
    Failed {
        /// The path that was asked for.
        path: String,
        /// Source-specific description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "no template at `{path}`"),
            Self::Failed { path, detail } => {
                write!(f, "template at `{path}` failed to load: {detail}")
            }
        }
    }
}

impl Error for AssetError {}

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Any failure the view manager can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The view type was never declared in the manifest.
    Unregistered(ViewTypeId),
    /// No resident view owns a model of the requested type.
    ModelNotFound(&'static str),
    /// The view's visual template could not be resolved.
    ResourceMissing {
        /// The view whose template was requested.
        type_id: ViewTypeId,
        /// The resolved resource path.
        path: String,
        /// The underlying asset failure.
        source: AssetError,
    },
    /// The view failed to attach to its instantiated visual tree.
    Component(ViewError),
    /// The view declared a handler for a field its model does not carry.
    Binding(BindingError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unregistered(type_id) => {
                write!(f, "view `{type_id}` is not declared in the manifest")
            }
            Self::ModelNotFound(model) => {
                write!(f, "no resident view owns a `{model}` model")
            }
            Self::ResourceMissing { type_id, path, source } => {
                write!(f, "view `{type_id}` has no template at `{path}`: {source}")
            }
            Self::Component(err) => write!(f, "{err}"),
            Self::Binding(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ResourceMissing { source, .. } => Some(source),
            Self::Component(err) => Some(err),
            Self::Binding(err) => Some(err),
            Self::Unregistered(_) | Self::ModelNotFound(_) => None,
        }
    }
}

impl From<ViewError> for RegistryError {
    fn from(err: ViewError) -> Self {
        Self::Component(err)
    }
}

impl From<BindingError> for RegistryError {
    fn from(err: BindingError) -> Self {
        Self::Binding(err)
    }
}

impl From<ControllerError> for RegistryError {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::Component(inner) => Self::Component(inner),
            ControllerError::Binding(inner) => Self::Binding(inner),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_name_the_failing_view() {
        let err = RegistryError::Unregistered(ViewTypeId::new("settings"));
        assert_eq!(
            err.to_string(),
            "view `settings` is not declared in the manifest"
        );
    }

    #[test]
    fn resource_missing_chains_its_source() {
        let err = RegistryError::ResourceMissing {
            type_id: ViewTypeId::new("hud"),
            path: String::from("panels/hud"),
            source: AssetError::NotFound {
                path: String::from("panels/hud"),
            },
        };
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("no template at `panels/hud`"));
    }

    #[test]
    fn controller_errors_flatten_into_registry_variants() {
        let err: RegistryError = ControllerError::Binding(BindingError::UnknownField {
            model: "HudModel",
            field: "altitude",
        })
        .into();
        assert!(matches!(err, RegistryError::Binding(_)));
    }
}
