//! Concurrent additive accumulators.
//!
//! Integers are summed with a plain `fetch_add`. Floats are stored as their
//! bit pattern in an `AtomicU64` and summed with a compare-and-retry loop,
//! since there is no native atomic float add. Draining is always a single
//! `swap` to zero so an add racing the drain lands in exactly one snapshot.
//!
//! Concurrent float adds may be applied in any order, so the drained sum is
//! exact only up to floating-point rounding.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use crate::value::{MetricKind, MetricValue};

/// Optional per-metric rendering rule. Must be pure.
pub type Formatter<T> = Arc<dyn Fn(T) -> String + Send + Sync>;

/// Number types that can back an accumulator.
pub trait Numeric: Copy + Send + Sync + 'static {
    /// Atomic storage cell.
    type Cell: Send + Sync;
    /// Kind tag reported by accumulators of this type.
    const KIND: MetricKind;

    fn zero_cell() -> Self::Cell;
    fn add(cell: &Self::Cell, v: Self);
    fn load(cell: &Self::Cell) -> Self;
    fn take(cell: &Self::Cell) -> Self;
    /// Rendering used when no formatter is registered.
    fn render_default(self) -> String;
}

impl Numeric for i64 {
    type Cell = AtomicI64;
    const KIND: MetricKind = MetricKind::Integral;

    fn zero_cell() -> AtomicI64 {
        AtomicI64::new(0)
    }

    fn add(cell: &AtomicI64, v: i64) {
        cell.fetch_add(v, Ordering::Relaxed);
    }

    fn load(cell: &AtomicI64) -> i64 {
        cell.load(Ordering::Acquire)
    }

    fn take(cell: &AtomicI64) -> i64 {
        cell.swap(0, Ordering::AcqRel)
    }

    fn render_default(self) -> String {
        self.to_string()
    }
}

impl Numeric for f64 {
    type Cell = AtomicU64;
    const KIND: MetricKind = MetricKind::Floating;

    fn zero_cell() -> AtomicU64 {
        AtomicU64::new(0.0_f64.to_bits())
    }

    fn add(cell: &AtomicU64, v: f64) {
        let mut current = cell.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + v).to_bits();
            match cell.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    fn load(cell: &AtomicU64) -> f64 {
        f64::from_bits(cell.load(Ordering::Acquire))
    }

    fn take(cell: &AtomicU64) -> f64 {
        f64::from_bits(cell.swap(0.0_f64.to_bits(), Ordering::AcqRel))
    }

    /// Six fixed decimals.
    fn render_default(self) -> String {
        format!("{self:.6}")
    }
}

/// A single metric's running total.
pub struct NumericAccumulator<T: Numeric> {
    cell: T::Cell,
    formatter: Option<Formatter<T>>,
}

impl<T: Numeric> NumericAccumulator<T> {
    pub fn new() -> Self {
        Self { cell: T::zero_cell(), formatter: None }
    }

    pub fn with_formatter(formatter: Formatter<T>) -> Self {
        Self { cell: T::zero_cell(), formatter: Some(formatter) }
    }

    /// Add `value` to the running total. Never blocks.
    pub fn add(&self, value: T) {
        T::add(&self.cell, value);
    }

    /// Current total without resetting.
    pub fn value(&self) -> T {
        T::load(&self.cell)
    }

    /// Atomically read the total and reset it to zero.
    pub fn take(&self) -> T {
        T::take(&self.cell)
    }

    /// Drain the total and render it.
    pub fn snapshot_and_reset(&self) -> String {
        let v = self.take();
        self.render(v)
    }

    /// Render `v` with the registered formatter. A formatter that panics
    /// falls back to the default rendering.
    pub fn render(&self, v: T) -> String {
        let Some(f) = &self.formatter else {
            return v.render_default();
        };
        match panic::catch_unwind(AssertUnwindSafe(|| f(v))) {
            Ok(s) => s,
            Err(_) => {
                tracing::warn!(
                    kind = T::KIND.as_str(),
                    "metric formatter panicked, using default rendering"
                );
                v.render_default()
            }
        }
    }

    pub fn type_tag(&self) -> MetricKind {
        T::KIND
    }
}

impl<T: Numeric> Default for NumericAccumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Numeric + fmt::Debug> fmt::Debug for NumericAccumulator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericAccumulator")
            .field("kind", &T::KIND)
            .field("value", &self.value())
            .field("formatted", &self.formatter.is_some())
            .finish()
    }
}

/// Closed set of accumulator kinds stored by a registry.
#[derive(Debug)]
pub enum Accumulator {
    Integral(NumericAccumulator<i64>),
    Floating(NumericAccumulator<f64>),
}

impl Accumulator {
    pub fn kind(&self) -> MetricKind {
        match self {
            Accumulator::Integral(a) => a.type_tag(),
            Accumulator::Floating(a) => a.type_tag(),
        }
    }

    /// Apply `value` if its kind matches; returns the accumulator's kind otherwise.
    pub fn try_add(&self, value: MetricValue) -> std::result::Result<(), MetricKind> {
        match (self, value) {
            (Accumulator::Integral(a), MetricValue::Integral(v)) => {
                a.add(v);
                Ok(())
            }
            (Accumulator::Floating(a), MetricValue::Floating(v)) => {
                a.add(v);
                Ok(())
            }
            _ => Err(self.kind()),
        }
    }

    pub fn snapshot_and_reset(&self) -> String {
        match self {
            Accumulator::Integral(a) => a.snapshot_and_reset(),
            Accumulator::Floating(a) => a.snapshot_and_reset(),
        }
    }

    pub fn value(&self) -> MetricValue {
        match self {
            Accumulator::Integral(a) => MetricValue::Integral(a.value()),
            Accumulator::Floating(a) => MetricValue::Floating(a.value()),
        }
    }
}

/// Floating formatter with a fixed number of decimals.
///
/// Rounds the exact binary value to the nearest decimal, as `{:.N}` does,
/// so `1.005 + 2.005` renders as `3.01` with two digits.
pub fn fixed_precision(digits: usize) -> Formatter<f64> {
    Arc::new(move |v: f64| format!("{v:.digits$}"))
}
