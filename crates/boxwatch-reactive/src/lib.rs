#![forbid(unsafe_code)]

//! Reactive layer: observable state, debounced updates, size tracking.
//!
//! The one behavior this crate exists for: watch an element's
//! content-box size and expose it as reactive state, optionally
//! debounced. [`SizeTracker`] wires the pieces together; the pieces
//! are reusable on their own:
//!
//! - [`Observable`]: shared value with change notification and
//!   version tracking; equal writes are suppressed.
//! - [`Update`]: a state update as either a literal value or a
//!   function of the latest previous value.
//! - [`Debounced`]: trailing-edge debounce wrapper over an
//!   [`Observable`], driven by explicit ticks.
//! - [`SizeTracker`]: attaches a [`BoxObserver`](boxwatch_core::BoxObserver)
//!   to an element on creation, keeps an `Observable<Size>` current,
//!   and detaches on disposal.
//!
//! # Execution model
//!
//! Single-threaded and event-driven: observation sinks, debounce
//! ticks, and subscriber notifications all run on the host's UI
//! thread. The host loop is responsible for calling
//! [`SizeTracker::tick`] so debounced updates can fire.

pub mod debounce;
pub mod observable;
pub mod tracker;

pub use debounce::Debounced;
pub use observable::{Observable, Subscription, Update};
pub use tracker::{SizeTracker, TrackerConfig};
