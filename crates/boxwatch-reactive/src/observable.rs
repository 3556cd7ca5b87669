#![forbid(unsafe_code)]

//! Observable value wrapper with change notification.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value in shared, reference-counted
//! storage. Writes go through [`set`](Observable::set) or
//! [`apply`](Observable::apply); a write that leaves the value equal
//! (by `PartialEq`) to the current one is suppressed entirely — no
//! version bump, no notification. This is the no-op update policy the
//! size tracker relies on to avoid redundant downstream work.
//!
//! [`Update<T>`] carries the functional-update calling convention:
//! a literal replacement value, or a function of the previous value.
//! The function form is resolved against the value held at apply time,
//! so a consumer that delays an update (see
//! [`Debounced`](crate::Debounced)) still compares against the true
//! latest state.
//!
//! # Invariants
//!
//! 1. `version` increments by exactly 1 per value-changing write.
//! 2. A write equal to the current value notifies nobody.
//! 3. Subscribers are notified in registration order, outside the
//!    interior borrow.
//! 4. Dropping a [`Subscription`] guard unsubscribes; dead entries are
//!    pruned lazily on the next notification.
//!
//! # Failure Modes
//!
//! - **Re-entrant write**: calling `set`/`apply` from inside a
//!   subscriber callback, or from inside an [`Update::with`] closure,
//!   panics (interior borrow rules). Re-entrant mutation indicates a
//!   design bug in the subscriber graph.
//! - **Leaked guards**: `Subscription` guards held forever keep their
//!   callbacks alive; nothing else leaks.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// A state update: a literal value, or a function of the previous value.
///
/// The function form receives the latest value at apply time and
/// returns the next one, `update(current) -> current'`.
pub enum Update<T> {
    /// Replace the value outright.
    Value(T),
    /// Compute the next value from the latest previous value.
    With(Box<dyn FnOnce(&T) -> T>),
}

impl<T> Update<T> {
    /// A literal-value update.
    #[must_use]
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// A functional update of the previous value.
    #[must_use]
    pub fn with(f: impl FnOnce(&T) -> T + 'static) -> Self {
        Self::With(Box::new(f))
    }

    /// Resolve against `current`, consuming the update.
    #[must_use]
    pub fn resolve(self, current: &T) -> T {
        match self {
            Self::Value(value) => value,
            Self::With(f) => f(current),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::With(_) => f.debug_tuple("With").finish_non_exhaustive(),
        }
    }
}

struct ObservableInner<T> {
    value: T,
    version: u64,
    /// Weak subscriber references; dead entries pruned on notify.
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** inner
/// state; both handles see the same value and share subscribers.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

// Manual Clone: shares the same Rc.
impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable holding `value`, at version 0, with no
    /// subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone the current value out.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Read the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Write a literal value. Suppressed when equal to the current one.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from a subscriber callback.
    pub fn set(&self, value: T) {
        self.apply(Update::Value(value));
    }

    /// Apply an [`Update`], resolving the functional form against the
    /// value held right now. Suppressed when the result is equal to
    /// the current value.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly, or if the update closure itself
    /// reads back into this observable.
    pub fn apply(&self, update: Update<T>) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let next = update.resolve(&inner.value);
            if next == inner.value {
                return;
            }
            inner.value = next;
            inner.version += 1;
            true
        };
        if changed {
            self.notify();
        }
    }

    /// Subscribe to value changes. The callback receives each new
    /// value. Dropping the returned guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().subscribers.push(weak);
        // The strong Rc is type-erased into the guard; the observable
        // only ever holds the weak side.
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Version counter: increments by 1 per value-changing write.
    /// Useful for dirty-checking without subscribing.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of registered subscribers, dead entries included until
    /// the next notification prunes them.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Notify live subscribers and prune dead ones.
    fn notify(&self) {
        let callbacks: Vec<CallbackRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        // Call outside the borrow so callbacks may read the value.
        let value = self.inner.borrow().value.clone();
        for cb in &callbacks {
            cb(&value);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the guard drops the only strong reference to the callback;
/// the observable's weak entry then fails to upgrade and is pruned on
/// the next notification cycle.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_set_and_version() {
        let obs = Observable::new(1);
        assert_eq!(obs.get(), 1);
        assert_eq!(obs.version(), 0);

        obs.set(2);
        assert_eq!(obs.get(), 2);
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn equal_write_is_suppressed() {
        let obs = Observable::new(5);
        let notified = Rc::new(Cell::new(0u32));
        let notified_clone = Rc::clone(&notified);
        let _sub = obs.subscribe(move |_| notified_clone.set(notified_clone.get() + 1));

        obs.set(5);
        assert_eq!(obs.version(), 0);
        assert_eq!(notified.get(), 0);
    }

    #[test]
    fn functional_update_sees_previous_value() {
        let obs = Observable::new(10);
        obs.apply(Update::with(|prev: &i32| prev + 5));
        assert_eq!(obs.get(), 15);
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn functional_update_returning_equal_value_is_suppressed() {
        let obs = Observable::new(10);
        obs.apply(Update::with(|prev: &i32| *prev));
        assert_eq!(obs.version(), 0);
    }

    #[test]
    fn with_reads_by_reference() {
        let obs = Observable::new(vec![1, 2, 3]);
        assert_eq!(obs.with(|v| v.len()), 3);
    }

    #[test]
    fn subscribers_notified_with_new_value() {
        let obs = Observable::new(0);
        let last = Rc::new(Cell::new(0));
        let last_clone = Rc::clone(&last);
        let _sub = obs.subscribe(move |v| last_clone.set(*v));

        obs.set(7);
        assert_eq!(last.get(), 7);
        obs.apply(Update::with(|prev: &i32| prev * 2));
        assert_eq!(last.get(), 14);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let obs = Observable::new(0);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let sub = obs.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        obs.set(1);
        assert_eq!(count.get(), 1);

        drop(sub);
        obs.set(2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dead_subscribers_pruned_on_notify() {
        let obs = Observable::new(0);
        let _live = obs.subscribe(|_| {});
        let dead = obs.subscribe(|_| {});
        drop(dead);
        assert_eq!(obs.subscriber_count(), 2);

        obs.set(1);
        assert_eq!(obs.subscriber_count(), 1);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let log_a = Rc::clone(&log);
        let _a = obs.subscribe(move |_| log_a.borrow_mut().push('a'));
        let log_b = Rc::clone(&log);
        let _b = obs.subscribe(move |_| log_b.borrow_mut().push('b'));

        obs.set(1);
        assert_eq!(*log.borrow(), vec!['a', 'b']);
    }

    #[test]
    fn clones_share_value_and_subscribers() {
        let a = Observable::new(0);
        let b = a.clone();
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let _sub = a.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        b.set(3);
        assert_eq!(a.get(), 3);
        assert_eq!(a.version(), 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn update_debug_formats() {
        let v: Update<i32> = Update::value(3);
        assert!(format!("{v:?}").contains("Value"));
        let w: Update<i32> = Update::with(|p| *p);
        assert!(format!("{w:?}").contains("With"));
    }
}
