//! metricflow core: accumulators, metric values, flush records, and the shared
//! error surface.
//!
//! This crate carries no threads or I/O. The agent crate builds the registry,
//! sinks, and the periodic flusher on top of it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here so a metrics bug can
//! never take the host process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod accumulator;
pub mod error;
pub mod record;
pub mod value;

pub use accumulator::{fixed_precision, Accumulator, Formatter, Numeric, NumericAccumulator};
/// Shared result type.
pub use error::{ErrorKind, MetricsError, Result};
pub use record::FlushRecord;
pub use value::{MetricKind, MetricValue};
