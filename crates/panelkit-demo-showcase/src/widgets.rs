#![forbid(unsafe_code)]

//! Stand-in widgets.
//!
//! The demo has no rendering engine; a [`TextSlot`] is one line of display
//! text that view handlers write into and the script reads back out.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to one line of display text.
#[derive(Clone, Default)]
pub struct TextSlot {
    text: Rc<RefCell<String>>,
}

impl TextSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.text.borrow_mut() = text.into();
    }

    #[must_use]
    pub fn get(&self) -> String {
        self.text.borrow().clone()
    }
}

impl fmt::Display for TextSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text.borrow())
    }
}

impl fmt::Debug for TextSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextSlot").field(&*self.text.borrow()).finish()
    }
}
