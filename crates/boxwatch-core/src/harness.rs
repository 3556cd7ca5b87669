#![forbid(unsafe_code)]

//! Deterministic in-process backend for the measurement contracts.
//!
//! [`HarnessElement`] and [`HarnessObserver`] implement [`Measurable`]
//! and [`BoxObserver`] without any platform underneath: tests set
//! client sizes by hand and drive observation batches explicitly with
//! [`HarnessObserver::emit`]. Element identity is `Rc` pointer
//! identity, so two handles cloned from the same element compare equal
//! for observation purposes while distinct elements never collide.

use std::cell::RefCell;
use std::rc::Rc;

use crate::element::Measurable;
use crate::observer::{BoxObserver, ObservationSink, ObservedEntry};
use crate::size::Size;

/// A fake on-screen element with a settable client size.
#[derive(Debug, Clone, Default)]
pub struct HarnessElement {
    inner: Rc<RefCell<Size>>,
}

impl HarnessElement {
    /// Create an element with the given client dimensions.
    #[must_use]
    pub fn new(inline_size: f64, block_size: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Size::new(inline_size, block_size))),
        }
    }

    /// Change the element's client size. Does **not** emit an
    /// observation; pair with [`HarnessObserver::emit_resize`] to
    /// simulate a layout pass that reports the change.
    pub fn set_client_size(&self, size: Size) {
        *self.inner.borrow_mut() = size;
    }

    /// True when both handles point at the same underlying element.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Measurable for HarnessElement {
    fn client_size(&self) -> Size {
        *self.inner.borrow()
    }
}

struct Registration {
    element: HarnessElement,
    sink: ObservationSink,
}

#[derive(Default)]
struct HarnessState {
    registrations: Vec<Registration>,
    observe_calls: usize,
    unobserve_calls: usize,
}

/// A scriptable observer: batches are emitted by the test, not by a
/// platform.
///
/// Cloning yields another handle onto the same observer, so one handle
/// can be handed to the code under test while the test keeps another
/// to drive emissions and read call counters.
#[derive(Clone, Default)]
pub struct HarnessObserver {
    state: Rc<RefCell<HarnessState>>,
}

impl HarnessObserver {
    /// Create an observer with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `observe` calls received over the observer's life.
    #[must_use]
    pub fn observe_calls(&self) -> usize {
        self.state.borrow().observe_calls
    }

    /// Number of `unobserve` calls received over the observer's life.
    #[must_use]
    pub fn unobserve_calls(&self) -> usize {
        self.state.borrow().unobserve_calls
    }

    /// Number of elements currently observed.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.state.borrow().registrations.len()
    }

    /// True when `element` currently has a registration.
    #[must_use]
    pub fn is_observing(&self, element: &HarnessElement) -> bool {
        self.state
            .borrow()
            .registrations
            .iter()
            .any(|r| r.element.ptr_eq(element))
    }

    /// Deliver a batch of entries to the sink registered for `element`.
    /// Silently ignored if the element is not observed.
    pub fn emit(&self, element: &HarnessElement, entries: &[ObservedEntry]) {
        // Clone the sink out so the callback runs outside the borrow.
        let sink = self
            .state
            .borrow()
            .registrations
            .iter()
            .find(|r| r.element.ptr_eq(element))
            .map(|r| Rc::clone(&r.sink));
        if let Some(sink) = sink {
            sink(entries);
        }
    }

    /// Set the element's client size to `size` and deliver a
    /// single-entry batch reporting it as both content and border box.
    pub fn emit_resize(&self, element: &HarnessElement, size: Size) {
        element.set_client_size(size);
        self.emit(element, &[ObservedEntry::of_size(size)]);
    }
}

impl std::fmt::Debug for HarnessObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HarnessObserver")
            .field("observed_count", &state.registrations.len())
            .field("observe_calls", &state.observe_calls)
            .field("unobserve_calls", &state.unobserve_calls)
            .finish()
    }
}

impl BoxObserver<HarnessElement> for HarnessObserver {
    fn observe(&mut self, element: &HarnessElement, sink: ObservationSink) {
        let mut state = self.state.borrow_mut();
        state.observe_calls += 1;
        state.registrations.push(Registration {
            element: element.clone(),
            sink,
        });
    }

    fn unobserve(&mut self, element: &HarnessElement) {
        let mut state = self.state.borrow_mut();
        state.unobserve_calls += 1;
        state.registrations.retain(|r| !r.element.ptr_eq(element));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn emit_reaches_registered_sink() {
        let mut observer = HarnessObserver::new();
        let element = HarnessElement::new(10.0, 10.0);
        let seen = Rc::new(Cell::new(0usize));
        let seen_clone = Rc::clone(&seen);

        observer.observe(
            &element,
            Rc::new(move |entries: &[ObservedEntry]| {
                seen_clone.set(seen_clone.get() + entries.len());
            }),
        );

        observer.emit(&element, &[ObservedEntry::of_size(Size::new(1.0, 2.0))]);
        assert_eq!(seen.get(), 1);
        assert_eq!(observer.observe_calls(), 1);
        assert!(observer.is_observing(&element));
    }

    #[test]
    fn emit_to_unobserved_element_is_ignored() {
        let observer = HarnessObserver::new();
        let element = HarnessElement::new(10.0, 10.0);
        // No registration; must not panic.
        observer.emit(&element, &[ObservedEntry::of_size(Size::ZERO)]);
        assert_eq!(observer.observed_count(), 0);
    }

    #[test]
    fn unobserve_removes_registration_and_stops_delivery() {
        let mut observer = HarnessObserver::new();
        let element = HarnessElement::new(10.0, 10.0);
        let seen = Rc::new(Cell::new(0usize));
        let seen_clone = Rc::clone(&seen);

        observer.observe(
            &element,
            Rc::new(move |_: &[ObservedEntry]| {
                seen_clone.set(seen_clone.get() + 1);
            }),
        );
        observer.unobserve(&element);

        observer.emit(&element, &[ObservedEntry::of_size(Size::ZERO)]);
        assert_eq!(seen.get(), 0);
        assert_eq!(observer.unobserve_calls(), 1);
        assert!(!observer.is_observing(&element));
    }

    #[test]
    fn unobserve_without_registration_is_noop() {
        let mut observer = HarnessObserver::new();
        let element = HarnessElement::new(10.0, 10.0);
        observer.unobserve(&element);
        assert_eq!(observer.unobserve_calls(), 1);
        assert_eq!(observer.observed_count(), 0);
    }

    #[test]
    fn element_identity_is_by_pointer() {
        let a = HarnessElement::new(10.0, 10.0);
        let b = a.clone();
        let c = HarnessElement::new(10.0, 10.0);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn emit_resize_updates_client_size_and_reports() {
        let mut observer = HarnessObserver::new();
        let element = HarnessElement::new(10.0, 10.0);
        let last = Rc::new(Cell::new(Size::ZERO));
        let last_clone = Rc::clone(&last);

        observer.observe(
            &element,
            Rc::new(move |entries: &[ObservedEntry]| {
                if let Some(size) = entries.first().and_then(|e| e.content_box.primary()) {
                    last_clone.set(size);
                }
            }),
        );

        observer.emit_resize(&element, Size::new(42.0, 24.0));
        assert_eq!(element.client_size(), Size::new(42.0, 24.0));
        assert_eq!(last.get(), Size::new(42.0, 24.0));
    }
}
