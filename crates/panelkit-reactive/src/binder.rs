#![forbid(unsafe_code)]

//! Handler registration and bulk bind/unbind against live models.
//!
//! A [`Binder`] is the glue between a view and its model: during one-time
//! view configuration, handlers are registered by field name with
//! [`add`](Binder::add); later, [`bind`](Binder::bind) attaches every
//! handler to a concrete model instance and [`unbind`](Binder::unbind)
//! detaches exactly those subscriptions again.
//!
//! # Usage
//!
//! ```ignore
//! let mut binder = Binder::<HudModel>::new();
//! binder.add::<String>("callsign", move |_, new| label.set(new))?;
//! binder.add::<f32>("power", move |_, new| meter.set(*new))?;
//!
//! binder.bind(&model);
//! // ... model.callsign.set(..) now drives the label ...
//! binder.unbind(&model);
//! ```
//!
//! # Invariants
//!
//! 1. Field name and type errors surface in `add`, never in `bind`.
//! 2. `add` only grows the handler list; `bind`/`unbind` only attach and
//!    detach, they never register new handlers.
//! 3. `unbind` removes exactly the subscriptions this binder attached
//!    (recorded by [`SubscriberId`]); unrelated subscribers on the same
//!    cells are untouched.
//! 4. `unbind` without a prior `bind` is a no-op, as is a second `unbind`.
//!
//! # Failure Modes
//!
//! - Binding the same binder to a second model without unbinding the first
//!   leaks the first model's subscriptions (the recorded ids are detached
//!   against the new model, where they match nothing). Pairing bind and
//!   unbind is the caller's contract; the controller upholds it.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::cell::{ChangeFn, SubscriberId};
use crate::fields::{Bindable, BindingError, FieldTable};

// ---------------------------------------------------------------------------
// Binder
// ---------------------------------------------------------------------------

struct BinderEntry<M> {
    field: &'static str,
    attach: Box<dyn Fn(&M) -> SubscriberId>,
    detach: Box<dyn Fn(&M, SubscriberId)>,
    live: Cell<Option<SubscriberId>>,
}

/// Per-view handler table with exact-identity attach/detach.
pub struct Binder<M: Bindable> {
    table: FieldTable<M>,
    entries: Vec<BinderEntry<M>>,
}

impl<M: Bindable> Binder<M> {
    /// Creates an empty binder over `M`'s declared fields.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: M::fields(),
            entries: Vec::new(),
        }
    }

    /// Registers `handler` for the declared field `name`.
    ///
    /// The accessor is resolved immediately; an unknown name or a value-type
    /// mismatch fails here and leaves the binder unchanged. The field type
    /// only needs to be nameable; comparability is a `set`-side concern.
    pub fn add<T: 'static>(
        &mut self,
        name: &'static str,
        handler: impl Fn(&T, &T) + 'static,
    ) -> Result<(), BindingError> {
        let accessor = self.table.resolve::<T>(name)?;
        let handler: Rc<ChangeFn<T>> = Rc::new(handler);
        self.entries.push(BinderEntry {
            field: name,
            attach: Box::new(move |model| {
                accessor(model).subscribe_shared(Rc::clone(&handler))
            }),
            detach: Box::new(move |model, id| accessor(model).unsubscribe(id)),
            live: Cell::new(None),
        });
        Ok(())
    }

    /// Attaches every registered handler to `model`.
    ///
    /// An entry that is somehow still live is detached first, so a repeated
    /// bind against the same model never stacks duplicate subscriptions.
    pub fn bind(&self, model: &M) {
        for entry in &self.entries {
            if let Some(stale) = entry.live.take() {
                (entry.detach)(model, stale);
            }
            entry.live.set(Some((entry.attach)(model)));
        }
    }

    /// Detaches every subscription recorded by the last `bind`.
    pub fn unbind(&self, model: &M) {
        for entry in &self.entries {
            if let Some(id) = entry.live.take() {
                (entry.detach)(model, id);
            }
        }
    }

    /// True if any entry is currently attached.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.entries.iter().any(|e| e.live.get().is_some())
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Field names with registered handlers, in registration order.
    pub fn handled_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.field)
    }
}

impl<M: Bindable> Default for Binder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Bindable> fmt::Debug for Binder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("model", &std::any::type_name::<M>())
            .field("handlers", &self.entries.len())
            .field("bound", &self.is_bound())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ReactiveCell;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Gauge {
        label: ReactiveCell<String>,
        value: ReactiveCell<i32>,
    }

    impl Bindable for Gauge {
        fn fields() -> FieldTable<Self> {
            FieldTable::new()
                .cell("label", |m: &Self| &m.label)
                .cell("value", |m: &Self| &m.value)
        }
    }

    fn counting_binder() -> (Binder<Gauge>, Rc<RefCell<Vec<i32>>>) {
        let mut binder = Binder::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        binder
            .add::<i32>("value", move |_, new| sink.borrow_mut().push(*new))
            .unwrap();
        (binder, log)
    }

    // ---- registration ----

    #[test]
    fn add_unknown_field_fails_immediately() {
        let mut binder = Binder::<Gauge>::new();
        let err = binder.add::<i32>("vslue", |_, _| {}).unwrap_err();
        assert!(matches!(err, BindingError::UnknownField { field: "vslue", .. }));
        assert!(binder.is_empty(), "failed add must not register an entry");
    }

    #[test]
    fn add_type_mismatch_fails_immediately() {
        let mut binder = Binder::<Gauge>::new();
        let err = binder.add::<String>("value", |_, _| {}).unwrap_err();
        assert!(matches!(err, BindingError::FieldType { field: "value", .. }));
        assert!(binder.is_empty());
    }

    #[test]
    fn add_is_purely_additive() {
        let (mut binder, _) = counting_binder();
        binder.add::<String>("label", |_, _| {}).unwrap();
        let fields: Vec<_> = binder.handled_fields().collect();
        assert_eq!(fields, vec!["value", "label"]);
    }

    #[test]
    fn add_accepts_non_comparable_field_types() {
        // No PartialEq anywhere on the field type.
        #[derive(Default)]
        struct Frame {
            rows: Vec<String>,
        }

        #[derive(Default)]
        struct Console {
            frame: ReactiveCell<Frame>,
        }

        impl Bindable for Console {
            fn fields() -> FieldTable<Self> {
                FieldTable::new().cell("frame", |m: &Self| &m.frame)
            }
        }

        let mut binder = Binder::<Console>::new();
        binder
            .add::<Frame>("frame", |_, new| {
                let _ = new.rows.len();
            })
            .unwrap();

        let console = Console::default();
        binder.bind(&console);
        assert_eq!(console.frame.subscriber_count(), 1);
        binder.unbind(&console);
        assert_eq!(console.frame.subscriber_count(), 0);
    }

    // ---- bind/unbind ----

    #[test]
    fn bind_attaches_and_handler_fires() {
        let (binder, log) = counting_binder();
        let gauge = Gauge::default();

        binder.bind(&gauge);
        assert!(binder.is_bound());
        gauge.value.set(3);
        assert_eq!(*log.borrow(), vec![3]);
    }

    #[test]
    fn unbind_detaches_all_subscriptions() {
        let (binder, log) = counting_binder();
        let gauge = Gauge::default();

        binder.bind(&gauge);
        binder.unbind(&gauge);
        gauge.value.set(3);
        assert!(log.borrow().is_empty());
        assert_eq!(
            gauge.value.subscriber_count(),
            0,
            "every bound field must end at zero subscribers"
        );
        assert!(!binder.is_bound());
    }

    #[test]
    fn unbind_without_bind_is_noop() {
        let (binder, _) = counting_binder();
        let gauge = Gauge::default();
        binder.unbind(&gauge);
        assert_eq!(gauge.value.subscriber_count(), 0);
    }

    #[test]
    fn unbind_leaves_external_subscribers_alone() {
        let (binder, _) = counting_binder();
        let gauge = Gauge::default();
        let external = gauge.value.subscribe(|_, _| {});

        binder.bind(&gauge);
        assert_eq!(gauge.value.subscriber_count(), 2);
        binder.unbind(&gauge);
        assert_eq!(
            gauge.value.subscriber_count(),
            1,
            "only the binder's own subscription may be removed"
        );
        gauge.value.unsubscribe(external);
    }

    #[test]
    fn rebind_same_model_does_not_stack() {
        let (binder, log) = counting_binder();
        let gauge = Gauge::default();

        binder.bind(&gauge);
        binder.bind(&gauge);
        assert_eq!(gauge.value.subscriber_count(), 1);
        gauge.value.set(7);
        assert_eq!(log.borrow().len(), 1, "one delivery, not two");
    }

    #[test]
    fn bind_unbind_roundtrip_across_models() {
        let (binder, log) = counting_binder();
        let first = Gauge::default();
        let second = Gauge::default();

        binder.bind(&first);
        binder.unbind(&first);
        binder.bind(&second);
        second.value.set(5);
        first.value.set(9);
        assert_eq!(*log.borrow(), vec![5], "only the bound model delivers");
        binder.unbind(&second);
        assert_eq!(second.value.subscriber_count(), 0);
    }

    // ---- properties ----

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn roundtrip_always_ends_at_zero_subscribers(cycles in 1usize..8) {
                let (binder, _) = counting_binder();
                let gauge = Gauge::default();
                for _ in 0..cycles {
                    binder.bind(&gauge);
                    binder.unbind(&gauge);
                }
                prop_assert_eq!(gauge.value.subscriber_count(), 0);
                prop_assert_eq!(gauge.label.subscriber_count(), 0);
            }
        }
    }
}
