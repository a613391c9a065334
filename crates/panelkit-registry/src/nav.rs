#![forbid(unsafe_code)]

//! Navigation history.
//!
//! A flat stack of view type ids in open order. Reopening a resident view
//! pushes again, so one type can occupy several entries; closing removes
//! the entry nearest the top, leaving earlier history intact.

use panelkit_view::ViewTypeId;

#[derive(Debug, Default)]
pub(crate) struct NavStack {
    entries: Vec<ViewTypeId>,
}

impl NavStack {
    pub(crate) fn push(&mut self, id: ViewTypeId) {
        self.entries.push(id);
    }

    /// Removes the topmost occurrence of `id`. Returns `false` if `id` is
    /// not on the stack.
    pub(crate) fn remove_first_from_top(&mut self, id: ViewTypeId) -> bool {
        match self.entries.iter().rposition(|entry| *entry == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Removes every occurrence of `id`.
    pub(crate) fn remove_all(&mut self, id: ViewTypeId) {
        self.entries.retain(|entry| *entry != id);
    }

    /// The current top, or `None` on an empty stack.
    pub(crate) fn top(&self) -> Option<ViewTypeId> {
        self.entries.last().copied()
    }

    pub(crate) fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Bottom-to-top snapshot.
    pub(crate) fn entries(&self) -> &[ViewTypeId] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUD: ViewTypeId = ViewTypeId::new("hud");
    const EDIT: ViewTypeId = ViewTypeId::new("edit");

    #[test]
    fn close_removes_nearest_to_top() {
        let mut nav = NavStack::default();
        nav.push(HUD);
        nav.push(EDIT);
        nav.push(HUD);

        assert!(nav.remove_first_from_top(HUD));
        assert_eq!(nav.entries(), &[HUD, EDIT]);
        assert_eq!(nav.top(), Some(EDIT));
    }

    #[test]
    fn removing_absent_id_reports_false() {
        let mut nav = NavStack::default();
        nav.push(HUD);
        assert!(!nav.remove_first_from_top(EDIT));
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn remove_all_clears_every_occurrence() {
        let mut nav = NavStack::default();
        nav.push(HUD);
        nav.push(EDIT);
        nav.push(HUD);
        nav.remove_all(HUD);
        assert_eq!(nav.entries(), &[EDIT]);
    }

    #[test]
    fn top_of_empty_stack_is_none() {
        assert_eq!(NavStack::default().top(), None);
    }

    // ---- properties ----

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const IDS: [ViewTypeId; 4] = [
            ViewTypeId::new("hud"),
            ViewTypeId::new("edit"),
            ViewTypeId::new("pause"),
            ViewTypeId::new("toast"),
        ];

        proptest! {
            #[test]
            fn stack_matches_reference_vec(ops in prop::collection::vec((any::<bool>(), 0usize..4), 0..64)) {
                let mut nav = NavStack::default();
                let mut reference: Vec<ViewTypeId> = Vec::new();

                for (is_push, pick) in ops {
                    let id = IDS[pick];
                    if is_push {
                        nav.push(id);
                        reference.push(id);
                    } else {
                        let expected = reference.iter().rposition(|e| *e == id);
                        if let Some(pos) = expected {
                            reference.remove(pos);
                        }
                        prop_assert_eq!(nav.remove_first_from_top(id), expected.is_some());
                    }
                }
                prop_assert_eq!(nav.entries(), reference.as_slice());
                prop_assert_eq!(nav.top(), reference.last().copied());
            }
        }
    }
}
