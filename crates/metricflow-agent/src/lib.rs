//! metricflow agent library entry.
//!
//! This crate wires the metric registry, output sinks, and the periodic
//! flusher into a cohesive aggregation stack. It is intended to be consumed by
//! the binary (`main.rs`), by host applications, and by integration tests.

pub mod config;
pub mod flusher;
pub mod registry;
pub mod sink;
pub mod workload;

pub use flusher::PeriodicFlusher;
pub use registry::{DiagnosticHook, MetricRegistry};
pub use sink::{FileSink, MemorySink, MetricSink};
