#![forbid(unsafe_code)]

//! Element contract: measurement and the externally owned element slot.

use std::cell::RefCell;
use std::rc::Rc;

use crate::size::Size;

/// Something whose client dimensions can be read synchronously.
///
/// The client size is the content box plus padding, excluding borders
/// and scrollbars. Implementations are expected to be cheap shared
/// handles onto the real element, so reading never blocks.
pub trait Measurable {
    /// Current client size of the element.
    fn client_size(&self) -> Size;
}

/// A nullable, externally owned slot holding an element handle.
///
/// The slot itself is shared: cloning an `ElementRef` yields another
/// handle onto the **same** slot, so the owner can fill or clear it
/// while consumers keep their reference. The tracker never creates or
/// destroys the element; it only reads the slot.
///
/// # Known gap
///
/// Swapping the slot's target while a tracker is attached does not
/// re-attach the tracker: it keeps observing the handle it captured at
/// attach time. Callers that swap targets must dispose and recreate
/// the tracker themselves.
pub struct ElementRef<E> {
    slot: Rc<RefCell<Option<E>>>,
}

// Manual Clone: shares the same slot regardless of `E: Clone`.
impl<E> Clone for ElementRef<E> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<E> Default for ElementRef<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for ElementRef<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRef")
            .field("element", &self.slot.borrow())
            .finish()
    }
}

impl<E> ElementRef<E> {
    /// Create a slot already holding `element`.
    #[must_use]
    pub fn new(element: E) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(element))),
        }
    }

    /// Create an empty slot (element not yet mounted).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }

    /// Put `element` into the slot, replacing any previous target.
    pub fn set(&self, element: E) {
        *self.slot.borrow_mut() = Some(element);
    }

    /// Empty the slot (element unmounted).
    pub fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }

    /// True when the slot currently holds no element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl<E: Clone> ElementRef<E> {
    /// Clone the current target out of the slot, if any.
    #[must_use]
    pub fn get(&self) -> Option<E> {
        self.slot.borrow().clone()
    }
}
