#![forbid(unsafe_code)]

//! The size-tracking unit: one element, one observation, one
//! observable size.
//!
//! [`SizeTracker`] binds an [`ElementRef`] to a [`BoxObserver`] and
//! keeps an [`Observable<Size>`] current with the element's
//! content-box dimensions:
//!
//! - **Create**: reads the element's client size (zero when the ref is
//!   empty), registers one observation, then re-reads synchronously so
//!   the exposed value is never stale before the first batch arrives.
//! - **Observe**: each batch contributes only its first entry; the
//!   entry's authoritative content-box fragment is routed through the
//!   debounced setter as a functional update that keeps the previous
//!   value when nothing changed, so equal reports notify nobody.
//! - **Dispose**: [`detach`](SizeTracker::detach) (or dropping the
//!   tracker) unregisters the observation at most once and cancels any
//!   pending debounced update; nothing fires after teardown.
//!
//! The host loop calls [`tick`](SizeTracker::tick) to let debounced
//! updates fire once their window elapses.
//!
//! # Example
//!
//! ```
//! use boxwatch_core::harness::{HarnessElement, HarnessObserver};
//! use boxwatch_core::{ElementRef, Size};
//! use boxwatch_reactive::{SizeTracker, TrackerConfig};
//!
//! let element = HarnessElement::new(640.0, 480.0);
//! let observer = HarnessObserver::new();
//! let tracker = SizeTracker::new(
//!     ElementRef::new(element.clone()),
//!     observer.clone(),
//!     TrackerConfig::new(),
//! );
//! assert_eq!(tracker.size(), Size::new(640.0, 480.0));
//!
//! observer.emit_resize(&element, Size::new(600.0, 480.0));
//! assert_eq!(tracker.size(), Size::new(600.0, 480.0));
//! ```
//!
//! # Known gap
//!
//! The tracker re-attaches only when its debounce delay changes
//! ([`set_debounce`](SizeTracker::set_debounce)). Swapping the
//! [`ElementRef`] target afterwards leaves the tracker observing the
//! handle captured at attach time; dispose and recreate the tracker to
//! follow the new target.

use std::rc::Rc;
use std::time::{Duration, Instant};

use boxwatch_core::{BoxObserver, ElementRef, Measurable, ObservationSink, ObservedEntry, Size};
use tracing::{debug, trace};

use crate::debounce::Debounced;
use crate::observable::{Observable, Subscription, Update};

/// Tracker configuration.
///
/// The one recognized option is the debounce delay for
/// observation-driven updates. It has no effect on the synchronous
/// reads performed at attach time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Delay applied to observation-driven updates. `None` applies
    /// updates immediately.
    pub debounce: Option<Duration>,
}

impl TrackerConfig {
    /// Config with no debouncing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debounce delay.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = Some(debounce);
        self
    }
}

/// Tracks one element's content-box size as observable state.
///
/// Generic over the element handle `E` and the platform observer `O`
/// so the same unit runs against a real platform backend or the
/// deterministic harness.
pub struct SizeTracker<E, O>
where
    E: Measurable + Clone + 'static,
    O: BoxObserver<E>,
{
    element: ElementRef<E>,
    observer: O,
    state: Observable<Size>,
    setter: Debounced<Size>,
    /// Element handle captured at attach time; present iff observing.
    observed: Option<E>,
    config: TrackerConfig,
}

impl<E, O> SizeTracker<E, O>
where
    E: Measurable + Clone + 'static,
    O: BoxObserver<E>,
{
    /// Create a tracker and attach it.
    ///
    /// The initial value is the element's current client size, or
    /// [`Size::ZERO`] when the ref is empty — in which case no
    /// observation is registered and the tracker stays idle.
    #[must_use]
    pub fn new(element: ElementRef<E>, observer: O, config: TrackerConfig) -> Self {
        let initial = element
            .get()
            .map(|e| e.client_size())
            .unwrap_or(Size::ZERO);
        let state = Observable::new(initial);
        let setter = Debounced::new(state.clone(), config.debounce);
        let mut tracker = Self {
            element,
            observer,
            state,
            setter,
            observed: None,
            config,
        };
        tracker.attach();
        tracker
    }

    /// The current size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.state.get()
    }

    /// A handle to the observable size state, for subscribing or
    /// version checks.
    #[must_use]
    pub fn state(&self) -> Observable<Size> {
        self.state.clone()
    }

    /// Subscribe to size changes. Equal reports produce no callback.
    pub fn subscribe(&self, callback: impl Fn(&Size) + 'static) -> Subscription {
        self.state.subscribe(callback)
    }

    /// True while an observation is registered.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.observed.is_some()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> TrackerConfig {
        self.config
    }

    /// Drive the debounce window with the current time. Returns true
    /// when a pending update fired.
    pub fn tick(&self) -> bool {
        self.setter.tick()
    }

    /// Drive the debounce window as of `now`.
    pub fn tick_at(&self, now: Instant) -> bool {
        self.setter.tick_at(now)
    }

    /// Change the debounce delay.
    ///
    /// An actual change rebuilds the debounced setter and re-runs the
    /// attachment: one unobserve, one observe, one fresh synchronous
    /// re-sync read. Setting the same delay again is a no-op.
    pub fn set_debounce(&mut self, debounce: Option<Duration>) {
        if self.config.debounce == debounce {
            return;
        }
        debug!(?debounce, "debounce delay changed; re-attaching");
        self.detach();
        self.config.debounce = debounce;
        self.setter = Debounced::new(self.state.clone(), debounce);
        self.attach();
    }

    /// Stop observing and cancel any pending debounced update.
    /// Idempotent; never fails.
    pub fn detach(&mut self) {
        let Some(element) = self.observed.take() else {
            return;
        };
        self.observer.unobserve(&element);
        self.setter.cancel();
        debug!("detached from element");
    }

    fn attach(&mut self) {
        let Some(element) = self.element.get() else {
            debug!("attach skipped: element ref is empty");
            return;
        };
        self.observer.observe(&element, Self::sink(&self.setter));
        // Synchronous re-sync, bypassing the debounce: the exposed
        // value must not be stale between attach and the first batch.
        let current = element.client_size();
        self.state.set(current);
        debug!(
            inline = current.inline_size,
            block = current.block_size,
            "attached to element"
        );
        self.observed = Some(element);
    }

    /// Build the observation sink routing batches into the setter.
    fn sink(setter: &Debounced<Size>) -> ObservationSink {
        let setter = setter.clone();
        Rc::new(move |entries: &[ObservedEntry]| {
            let Some(entry) = entries.first() else {
                return;
            };
            let Some(next) = entry.content_box.primary() else {
                return;
            };
            trace!(
                inline = next.inline_size,
                block = next.block_size,
                "content-box observation"
            );
            setter.call(Update::with(move |prev: &Size| {
                if *prev == next { *prev } else { next }
            }));
        })
    }
}

impl<E, O> std::fmt::Debug for SizeTracker<E, O>
where
    E: Measurable + Clone + 'static,
    O: BoxObserver<E>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SizeTracker")
            .field("size", &self.state.get())
            .field("attached", &self.observed.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl<E, O> Drop for SizeTracker<E, O>
where
    E: Measurable + Clone + 'static,
    O: BoxObserver<E>,
{
    fn drop(&mut self) {
        self.detach();
    }
}
