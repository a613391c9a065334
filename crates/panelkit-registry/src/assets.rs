#![forbid(unsafe_code)]

//! Template resolution.
//!
//! The manager never loads anything itself; it asks an [`AssetSource`] for
//! a [`VisualTemplate`] by path and caches the result per view type. The
//! bundled [`MapAssets`] is an in-memory source: hosts register every
//! template up front, which keeps resolution synchronous and total.

use std::collections::HashMap;

use panelkit_view::VisualTemplate;

use crate::error::AssetError;

/// Resolves visual templates by resource path.
pub trait AssetSource {
    /// Returns the template stored at `path`.
    fn resolve(&mut self, path: &str) -> Result<VisualTemplate, AssetError>;
}

/// In-memory asset source backed by a path-keyed map.
#[derive(Default)]
pub struct MapAssets {
    templates: HashMap<String, VisualTemplate>,
}

impl MapAssets {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `template` under its own path, replacing any previous
    /// entry for that path.
    pub fn insert(&mut self, template: VisualTemplate) {
        self.templates
            .insert(template.path().to_string(), template);
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, template: VisualTemplate) -> Self {
        self.insert(template);
        self
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// `true` when no template is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl AssetSource for MapAssets {
    fn resolve(&mut self, path: &str) -> Result<VisualTemplate, AssetError> {
        self.templates
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound {
                path: path.to_string(),
            })
    }
}

impl std::fmt::Debug for MapAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapAssets")
            .field("templates", &self.templates.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(path: &str) -> VisualTemplate {
        VisualTemplate::new(path, || Box::new(()))
    }

    #[test]
    fn resolves_registered_templates() {
        let mut assets = MapAssets::new().with(template("panels/hud"));
        let resolved = assets.resolve("panels/hud").expect("resolve");
        assert_eq!(resolved.path(), "panels/hud");
    }

    #[test]
    fn missing_path_reports_not_found() {
        let mut assets = MapAssets::new();
        let err = assets.resolve("panels/ghost").unwrap_err();
        assert_eq!(
            err,
            AssetError::NotFound {
                path: String::from("panels/ghost")
            }
        );
    }

    #[test]
    fn insert_replaces_same_path() {
        let mut assets = MapAssets::new();
        assets.insert(template("panels/hud"));
        assets.insert(template("panels/hud"));
        assert_eq!(assets.len(), 1);
    }
}
