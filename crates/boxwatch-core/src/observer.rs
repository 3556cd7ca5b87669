#![forbid(unsafe_code)]

//! Observation contract: the platform size-observation primitive.
//!
//! # Delivery model
//!
//! An observer watches elements and delivers **batches** of
//! [`ObservedEntry`] values to the [`ObservationSink`] registered for
//! each element. A batch normally carries one entry per observed
//! element; consumers take the first entry and ignore the rest. Each
//! entry describes the element's content box (and border box) either
//! as a single measurement or as a sequence of per-fragment
//! measurements whose first item is authoritative.
//!
//! # Invariants
//!
//! 1. Sinks are invoked on the single UI thread, never concurrently.
//! 2. `unobserve` of an element that is not observed is a silent no-op.
//! 3. After `unobserve` returns, the sink registered for that element
//!    is not invoked again.

use std::rc::Rc;

use crate::size::Size;

/// A box measurement delivered either singularly or fragmented.
///
/// Fragmented boxes occur when an element is split across containers
/// (e.g. multi-column layout); the first fragment is authoritative.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxFragments {
    /// One measurement covering the whole box.
    Single(Size),
    /// Per-fragment measurements; the first item is authoritative.
    Sequence(Vec<Size>),
}

impl BoxFragments {
    /// The authoritative measurement, or `None` for an empty sequence.
    #[must_use]
    pub fn primary(&self) -> Option<Size> {
        match self {
            Self::Single(size) => Some(*size),
            Self::Sequence(fragments) => fragments.first().copied(),
        }
    }
}

/// One entry of an observation batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedEntry {
    /// Content-box measurement: the rendering box excluding border and
    /// padding. This is what size tracking consumes.
    pub content_box: BoxFragments,
    /// Border-box measurement: the rendering box including border and
    /// padding. Reported by the platform; not consumed by tracking.
    pub border_box: BoxFragments,
}

impl ObservedEntry {
    /// Create an entry from explicit content- and border-box descriptors.
    #[must_use]
    pub fn new(content_box: BoxFragments, border_box: BoxFragments) -> Self {
        Self {
            content_box,
            border_box,
        }
    }

    /// Create an entry whose content and border boxes both report
    /// `size` as a single measurement.
    #[must_use]
    pub fn of_size(size: Size) -> Self {
        Self::new(BoxFragments::Single(size), BoxFragments::Single(size))
    }
}

/// Callback receiving observation batches for one registered element.
///
/// Shared, single-threaded: the registrant keeps a clone, the observer
/// keeps another, both on the UI thread.
pub type ObservationSink = Rc<dyn Fn(&[ObservedEntry])>;

/// The platform size-observation primitive.
///
/// Implementations watch individual elements and deliver observation
/// batches to the sink registered with [`observe`](Self::observe).
/// How rapid layout changes are coalesced into batches is the
/// implementation's concern.
pub trait BoxObserver<E> {
    /// Begin observing `element`, delivering batches to `sink`.
    fn observe(&mut self, element: &E, sink: ObservationSink);

    /// Stop observing `element`. Must be a no-op (and must not panic)
    /// if `element` was never observed or was already unobserved.
    fn unobserve(&mut self, element: &E);
}
