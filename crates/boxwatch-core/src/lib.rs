#![forbid(unsafe_code)]

//! Core: size data model and box-observation contracts.
//!
//! # Role in boxwatch
//! `boxwatch-core` is the measurement layer. It owns the [`Size`] value
//! type, the element contract used to read client dimensions, and the
//! observer contract through which a platform reports content-box
//! changes. It knows nothing about reactive state or scheduling.
//!
//! # Primary responsibilities
//! - **[`Size`]**: non-negative inline/block dimensions of a box.
//! - **[`Measurable`] / [`ElementRef`]**: externally owned, nullable
//!   handle to an on-screen element.
//! - **[`BoxObserver`]**: the platform size-observation primitive,
//!   delivering batches of [`ObservedEntry`] values to a sink.
//!
//! # How it fits in the system
//! The reactive layer (`boxwatch-reactive`) consumes these contracts to
//! drive an observable size value. The deterministic [`harness`] backend
//! (behind the `test-helpers` feature) implements both contracts
//! in-process so the full pipeline can be exercised without a platform.

pub mod element;
pub mod observer;
pub mod size;

#[cfg(feature = "test-helpers")]
pub mod harness;

pub use element::{ElementRef, Measurable};
pub use observer::{BoxFragments, BoxObserver, ObservationSink, ObservedEntry};
pub use size::Size;
