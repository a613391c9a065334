#![forbid(unsafe_code)]

//! Field declaration tables: named, typed accessors for bindable models.
//!
//! A model type implements [`Bindable`] by listing its observable fields in
//! a [`FieldTable`], mapping each `&'static str` name to a plain function
//! pointer that projects `&Model` to `&ReactiveCell<T>`. The table is built
//! in ordinary code, so a typo in an accessor is a compile error; a typo in
//! a *name* surfaces as [`BindingError::UnknownField`] the moment a handler
//! is registered, never later at bind time.
//!
//! # Usage
//!
//! ```ignore
//! use panelkit_reactive::{Bindable, FieldTable, ReactiveCell};
//!
//! #[derive(Default)]
//! struct HudModel {
//!     callsign: ReactiveCell<String>,
//!     power: ReactiveCell<f32>,
//! }
//!
//! impl Bindable for HudModel {
//!     fn fields() -> FieldTable<Self> {
//!         FieldTable::new()
//!             .cell("callsign", |m: &Self| &m.callsign)
//!             .cell("power", |m: &Self| &m.power)
//!     }
//! }
//! ```
//!
//! # Invariants
//!
//! 1. `resolve::<T>(name)` fails with `UnknownField` for undeclared names
//!    and `FieldType` when `T` differs from the declared cell type.
//! 2. Declaring the same name twice is a programming error; debug builds
//!    assert, release builds resolve the first declaration.
//! 3. The table never observes model instances; accessors are resolved
//!    against types only.

use std::any::{Any, type_name};
use std::error::Error;
use std::fmt;
use std::marker::PhantomData;

use crate::cell::ReactiveCell;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Configuration-time binding failure.
///
/// Raised while a view registers its handlers, never while binding to a
/// live model. Recoverable: the owning view's configuration is abandoned
/// and the error reported upward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The named field is not declared in the model's [`FieldTable`].
    UnknownField {
        /// Model type name.
        model: &'static str,
        /// Requested field name.
        field: &'static str,
    },
    /// The named field is declared with a different value type.
    FieldType {
        /// Model type name.
        model: &'static str,
        /// Requested field name.
        field: &'static str,
        /// Value type the table declares for this field.
        declared: &'static str,
        /// Value type the caller asked for.
        requested: &'static str,
    },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { model, field } => {
                write!(f, "no field `{field}` declared on {model}")
            }
            Self::FieldType {
                model,
                field,
                declared,
                requested,
            } => write!(
                f,
                "field `{field}` on {model} holds {declared}, not {requested}"
            ),
        }
    }
}

impl Error for BindingError {}

// ---------------------------------------------------------------------------
// Bindable + FieldTable
// ---------------------------------------------------------------------------

/// Projects a model reference to one of its reactive cells.
pub type CellAccessor<M, T> = fn(&M) -> &ReactiveCell<T>;

/// A model whose observable fields are declared in a [`FieldTable`].
pub trait Bindable: Sized + 'static {
    /// Declares the bindable fields of this model.
    fn fields() -> FieldTable<Self>;
}

struct FieldEntry {
    name: &'static str,
    value_type: &'static str,
    accessor: Box<dyn Any>,
}

/// Name-to-accessor table for one model type.
pub struct FieldTable<M> {
    entries: Vec<FieldEntry>,
    _model: PhantomData<fn(&M)>,
}

impl<M: 'static> FieldTable<M> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _model: PhantomData,
        }
    }

    /// Declares `name` as an accessor for a `ReactiveCell<T>` field.
    #[must_use]
    pub fn cell<T: 'static>(mut self, name: &'static str, accessor: CellAccessor<M, T>) -> Self {
        debug_assert!(
            !self.contains(name),
            "field `{name}` declared twice on {}",
            type_name::<M>()
        );
        self.entries.push(FieldEntry {
            name,
            value_type: type_name::<T>(),
            accessor: Box::new(accessor),
        });
        self
    }

    /// Looks up `name` as an accessor for a `ReactiveCell<T>`.
    pub fn resolve<T: 'static>(
        &self,
        name: &'static str,
    ) -> Result<CellAccessor<M, T>, BindingError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or(BindingError::UnknownField {
                model: type_name::<M>(),
                field: name,
            })?;
        entry
            .accessor
            .downcast_ref::<CellAccessor<M, T>>()
            .copied()
            .ok_or(BindingError::FieldType {
                model: type_name::<M>(),
                field: name,
                declared: entry.value_type,
                requested: type_name::<T>(),
            })
    }

    /// True if `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Declared field names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M: 'static> Default for FieldTable<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for FieldTable<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTable")
            .field("model", &type_name::<M>())
            .field("fields", &self.entries.iter().map(|e| e.name).collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        text: ReactiveCell<String>,
        level: ReactiveCell<u32>,
    }

    impl Bindable for Probe {
        fn fields() -> FieldTable<Self> {
            FieldTable::new()
                .cell("text", |m: &Self| &m.text)
                .cell("level", |m: &Self| &m.level)
        }
    }

    // ---- resolution ----

    #[test]
    fn resolve_returns_working_accessor() {
        let table = Probe::fields();
        let accessor = table.resolve::<u32>("level").unwrap();

        let probe = Probe::default();
        probe.level.set(4);
        assert_eq!(accessor(&probe).get(), 4);
    }

    #[test]
    fn unknown_field_fails_at_resolve() {
        let table = Probe::fields();
        let err = table.resolve::<u32>("lvel").unwrap_err();
        assert_eq!(
            err,
            BindingError::UnknownField {
                model: std::any::type_name::<Probe>(),
                field: "lvel",
            }
        );
    }

    #[test]
    fn type_mismatch_fails_at_resolve() {
        let table = Probe::fields();
        let err = table.resolve::<String>("level").unwrap_err();
        match err {
            BindingError::FieldType {
                field,
                declared,
                requested,
                ..
            } => {
                assert_eq!(field, "level");
                assert!(declared.contains("u32"));
                assert!(requested.contains("String"));
            }
            other => panic!("expected FieldType, got {other:?}"),
        }
    }

    // ---- introspection ----

    #[test]
    fn names_preserve_declaration_order() {
        let table = Probe::fields();
        let names: Vec<_> = table.names().collect();
        assert_eq!(names, vec!["text", "level"]);
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
        assert!(table.contains("text"));
        assert!(!table.contains("gone"));
    }

    #[test]
    fn empty_table_reports_empty() {
        let table: FieldTable<Probe> = FieldTable::new();
        assert!(table.is_empty());
        assert_eq!(table.names().count(), 0);
    }

    // ---- error display ----

    #[test]
    fn display_names_model_and_field() {
        let err = BindingError::UnknownField {
            model: "Probe",
            field: "ghost",
        };
        assert_eq!(err.to_string(), "no field `ghost` declared on Probe");

        let err = BindingError::FieldType {
            model: "Probe",
            field: "level",
            declared: "u32",
            requested: "alloc::string::String",
        };
        assert!(err.to_string().contains("holds u32"));
    }
}
