//! Named metric registry.
//!
//! Metrics live in a `DashMap`, so `add` only takes a shard read lock and the
//! per-metric atomic does the rest. Flushes are serialized by a separate
//! mutex that writers never touch. Flush output is sorted by name to keep
//! deterministic ordering.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use metricflow_core::error::{MetricsError, Result};
use metricflow_core::{
    Accumulator, FlushRecord, Formatter, MetricKind, MetricValue, NumericAccumulator,
};

use crate::sink::MetricSink;

/// Callback receiving non-fatal errors (dropped adds, sink failures).
pub type DiagnosticHook = Arc<dyn Fn(&MetricsError) + Send + Sync>;

#[derive(Default)]
pub struct MetricRegistry {
    metrics: DashMap<String, Accumulator>,
    flush_lock: Mutex<()>,
    diagnostics: Option<DiagnosticHook>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that forwards non-fatal errors to `hook`.
    pub fn with_diagnostics(hook: DiagnosticHook) -> Self {
        Self {
            diagnostics: Some(hook),
            ..Self::default()
        }
    }

    /// Register `name` with the default rendering for `kind`.
    pub fn register(&self, name: &str, kind: MetricKind) -> Result<()> {
        let acc = match kind {
            MetricKind::Integral => Accumulator::Integral(NumericAccumulator::new()),
            MetricKind::Floating => Accumulator::Floating(NumericAccumulator::new()),
        };
        self.insert(name, acc)
    }

    pub fn register_integral(
        &self,
        name: &str,
        formatter: Option<Formatter<i64>>,
    ) -> Result<()> {
        let acc = match formatter {
            Some(f) => NumericAccumulator::with_formatter(f),
            None => NumericAccumulator::new(),
        };
        self.insert(name, Accumulator::Integral(acc))
    }

    pub fn register_floating(
        &self,
        name: &str,
        formatter: Option<Formatter<f64>>,
    ) -> Result<()> {
        let acc = match formatter {
            Some(f) => NumericAccumulator::with_formatter(f),
            None => NumericAccumulator::new(),
        };
        self.insert(name, Accumulator::Floating(acc))
    }

    /// Insert a prepared accumulator.
    ///
    /// Re-registering a name with the same kind keeps the existing metric
    /// (value and formatter untouched). A different kind is rejected.
    pub fn insert(&self, name: &str, acc: Accumulator) -> Result<()> {
        match self.metrics.entry(name.to_string()) {
            Entry::Occupied(e) => {
                let registered = e.get().kind();
                if registered != acc.kind() {
                    return Err(MetricsError::DuplicateMetricTypeConflict {
                        name: name.to_string(),
                        registered,
                        requested: acc.kind(),
                    });
                }
                tracing::debug!(metric = %name, kind = %registered, "metric already registered");
                Ok(())
            }
            Entry::Vacant(e) => {
                tracing::debug!(metric = %name, kind = %acc.kind(), "metric registered");
                e.insert(acc);
                Ok(())
            }
        }
    }

    /// Add `value` to `name`. Unknown names and kind mismatches are dropped
    /// and reported to diagnostics; this never fails the caller.
    pub fn add(&self, name: &str, value: impl Into<MetricValue>) {
        if let Err(e) = self.try_add(name, value) {
            self.report(&e);
        }
    }

    /// Like [`add`](Self::add) but returns the drop reason.
    pub fn try_add(&self, name: &str, value: impl Into<MetricValue>) -> Result<()> {
        let value = value.into();
        let acc = self
            .metrics
            .get(name)
            .ok_or_else(|| MetricsError::UnknownMetricName(name.to_string()))?;
        acc.try_add(value)
            .map_err(|expected| MetricsError::MetricTypeMismatch {
                name: name.to_string(),
                expected,
                actual: value.kind(),
            })
    }

    /// Drain every metric into a record without writing it anywhere.
    pub fn snapshot_all(&self) -> FlushRecord {
        let _guard = self.flush_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.drain()
    }

    /// Drain every metric and hand the record to `sink`.
    ///
    /// Values are reset even if the sink fails; that interval's data is lost.
    /// The diagnostic hook runs after the flush lock is released, so it may
    /// call back into the registry.
    pub fn flush_all(&self, sink: &dyn MetricSink) -> Result<()> {
        let guard = self.flush_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let record = self.drain();
        let written = sink.write(&record);
        drop(guard);

        written.map_err(|e| {
            tracing::warn!(error = %e, metrics = record.entries.len(), "flush dropped");
            self.report(&e);
            e
        })
    }

    fn drain(&self) -> FlushRecord {
        let mut entries: Vec<(String, String)> = self
            .metrics
            .iter()
            .map(|r| (r.key().clone(), r.value().snapshot_and_reset()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        FlushRecord::new(Local::now(), entries)
    }

    /// Current (unflushed) value of `name`.
    pub fn value_of(&self, name: &str) -> Option<MetricValue> {
        self.metrics.get(name).map(|r| r.value().value())
    }

    pub fn kind_of(&self, name: &str) -> Option<MetricKind> {
        self.metrics.get(name).map(|r| r.value().kind())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.metrics.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    fn report(&self, err: &MetricsError) {
        tracing::debug!(kind = err.kind().as_str(), error = %err, "metrics diagnostic");
        if let Some(hook) = &self.diagnostics {
            hook(err);
        }
    }
}
