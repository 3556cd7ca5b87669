#![forbid(unsafe_code)]

//! Trailing-edge debounce wrapper over an [`Observable`].
//!
//! # Design
//!
//! [`Debounced<T>`] accepts [`Update`] values through
//! [`call`](Debounced::call) and forwards them to its target
//! observable. With no delay configured it is a pass-through. With a
//! delay, each call replaces the pending update and restarts the
//! window; the pending update fires on the first
//! [`tick`](Debounced::tick) at least one full delay after the last
//! call. Rapid calls inside the window therefore collapse to the last
//! one (last-write-wins).
//!
//! The pending payload stays an [`Update`]: the functional form is
//! resolved against the target's value **at fire time**, not at call
//! time, so comparisons inside the update see the true latest state
//! even under coalesced delivery.
//!
//! Time never comes from a hidden clock: public methods read
//! `Instant::now()`, and each has a `*_at` twin taking an explicit
//! instant for deterministic tests. The host loop drives firing by
//! ticking, the same way a frame loop polls its timers.
//!
//! # Invariants
//!
//! 1. At most one update is pending at a time.
//! 2. A pending update never fires earlier than `delay` after the most
//!    recent call.
//! 3. [`cancel`](Debounced::cancel) drops the pending update; a
//!    cancelled update never reaches the target.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::observable::{Observable, Update};

struct DebouncedInner<T> {
    target: Observable<T>,
    delay: Option<Duration>,
    pending: Option<Update<T>>,
    last_call: Option<Instant>,
}

/// Debounced setter handle for an [`Observable`].
///
/// Cloning yields another handle onto the same pending-update slot, so
/// an observation sink can hold one handle while the owning tracker
/// keeps another for ticking and cancellation.
pub struct Debounced<T> {
    inner: Rc<RefCell<DebouncedInner<T>>>,
}

// Manual Clone: shares the same slot.
impl<T> Clone for Debounced<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Debounced<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Debounced")
            .field("delay", &inner.delay)
            .field("pending", &inner.pending.is_some())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Debounced<T> {
    /// Wrap `target` with an optional trailing-edge delay.
    #[must_use]
    pub fn new(target: Observable<T>, delay: Option<Duration>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DebouncedInner {
                target,
                delay,
                pending: None,
                last_call: None,
            })),
        }
    }

    /// The configured delay, if any.
    #[must_use]
    pub fn delay(&self) -> Option<Duration> {
        self.inner.borrow().delay
    }

    /// A handle to the wrapped target observable.
    #[must_use]
    pub fn target(&self) -> Observable<T> {
        self.inner.borrow().target.clone()
    }

    /// Submit an update, stamped with the current time.
    pub fn call(&self, update: Update<T>) {
        self.call_at(update, Instant::now());
    }

    /// Submit an update as of `now`. Pass-through when no delay is
    /// configured; otherwise the update becomes pending and the window
    /// restarts.
    pub fn call_at(&self, update: Update<T>, now: Instant) {
        let immediate = {
            let mut inner = self.inner.borrow_mut();
            if inner.delay.is_some() {
                let coalesced = inner.pending.is_some();
                inner.pending = Some(update);
                inner.last_call = Some(now);
                trace!(coalesced, "debounce window restarted");
                None
            } else {
                Some(update)
            }
        };
        // Borrow released; applying may notify subscribers.
        if let Some(update) = immediate {
            self.target().apply(update);
        }
    }

    /// Fire the pending update if the delay has elapsed. Returns true
    /// when an update was applied to the target.
    pub fn tick(&self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Tick as of `now`.
    pub fn tick_at(&self, now: Instant) -> bool {
        let fired = {
            let mut inner = self.inner.borrow_mut();
            let due = match (inner.delay, inner.last_call, inner.pending.is_some()) {
                (Some(delay), Some(last), true) => {
                    now.saturating_duration_since(last) >= delay
                }
                _ => false,
            };
            if due {
                inner.last_call = None;
                inner.pending.take()
            } else {
                None
            }
        };
        match fired {
            Some(update) => {
                trace!("debounced update fired");
                self.target().apply(update);
                true
            }
            None => false,
        }
    }

    /// Drop any pending update without applying it.
    pub fn cancel(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.pending.take().is_some() {
            trace!("pending debounced update cancelled");
        }
        inner.last_call = None;
    }

    /// True when an update is waiting for its window to elapse.
    #[must_use]
    pub fn pending(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }

    /// Time remaining until the pending update may fire, as of `now`.
    /// `None` when nothing is pending.
    #[must_use]
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        let inner = self.inner.borrow();
        inner.pending.as_ref()?;
        let delay = inner.delay?;
        let last = inner.last_call?;
        Some(delay.saturating_sub(now.saturating_duration_since(last)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn no_delay_is_pass_through() {
        let target = Observable::new(0);
        let debounced = Debounced::new(target.clone(), None);

        debounced.call(Update::value(5));
        assert_eq!(target.get(), 5);
        assert!(!debounced.pending());
    }

    #[test]
    fn update_held_until_delay_elapses() {
        let target = Observable::new(0);
        let debounced = Debounced::new(target.clone(), Some(ms(100)));
        let t0 = Instant::now();

        debounced.call_at(Update::value(5), t0);
        assert!(debounced.pending());
        assert_eq!(target.get(), 0);

        assert!(!debounced.tick_at(t0 + ms(99)));
        assert_eq!(target.get(), 0);

        assert!(debounced.tick_at(t0 + ms(100)));
        assert_eq!(target.get(), 5);
        assert!(!debounced.pending());
    }

    #[test]
    fn rapid_calls_collapse_to_last() {
        let target = Observable::new(0);
        let debounced = Debounced::new(target.clone(), Some(ms(50)));
        let t0 = Instant::now();

        debounced.call_at(Update::value(1), t0);
        debounced.call_at(Update::value(2), t0 + ms(10));
        debounced.call_at(Update::value(3), t0 + ms(20));

        // Window restarted by each call: not due 50ms after the first.
        assert!(!debounced.tick_at(t0 + ms(50)));
        assert!(debounced.tick_at(t0 + ms(70)));
        assert_eq!(target.get(), 3);
        assert_eq!(target.version(), 1);
    }

    #[test]
    fn cancel_drops_pending_update() {
        let target = Observable::new(0);
        let debounced = Debounced::new(target.clone(), Some(ms(50)));
        let t0 = Instant::now();

        debounced.call_at(Update::value(9), t0);
        debounced.cancel();

        assert!(!debounced.pending());
        assert!(!debounced.tick_at(t0 + ms(1000)));
        assert_eq!(target.get(), 0);
    }

    #[test]
    fn functional_update_resolves_at_fire_time() {
        let target = Observable::new(10);
        let debounced = Debounced::new(target.clone(), Some(ms(50)));
        let t0 = Instant::now();

        debounced.call_at(Update::with(|prev: &i32| prev + 1), t0);
        // The target moves underneath the pending update.
        target.set(100);

        debounced.tick_at(t0 + ms(50));
        assert_eq!(target.get(), 101);
    }

    #[test]
    fn time_until_fire_counts_down() {
        let target = Observable::new(0);
        let debounced = Debounced::new(target, Some(ms(100)));
        let t0 = Instant::now();

        assert_eq!(debounced.time_until_fire(t0), None);

        debounced.call_at(Update::value(1), t0);
        assert_eq!(debounced.time_until_fire(t0 + ms(30)), Some(ms(70)));
        assert_eq!(debounced.time_until_fire(t0 + ms(200)), Some(ms(0)));
    }

    #[test]
    fn tick_without_pending_is_noop() {
        let target = Observable::new(0);
        let debounced = Debounced::new(target.clone(), Some(ms(10)));
        assert!(!debounced.tick());
        assert_eq!(target.version(), 0);
    }

    #[test]
    fn clones_share_pending_slot() {
        let target = Observable::new(0);
        let a = Debounced::new(target.clone(), Some(ms(10)));
        let b = a.clone();
        let t0 = Instant::now();

        a.call_at(Update::value(4), t0);
        assert!(b.pending());
        assert!(b.tick_at(t0 + ms(10)));
        assert_eq!(target.get(), 4);
    }
}
