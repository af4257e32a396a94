//! Periodic flush worker.
//!
//! One named OS thread drains the registry every `interval`. The wait after
//! each flush is `interval - elapsed` (never negative), so flush start times
//! stay on a fixed cadence. The wait is a `recv_timeout` on the stop channel,
//! so `stop` does not have to sit out the remaining interval.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use metricflow_core::error::{MetricsError, Result};

use crate::registry::MetricRegistry;
use crate::sink::MetricSink;

const THREAD_NAME: &str = "metricflow-flusher";

struct Worker {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

pub struct PeriodicFlusher {
    registry: Arc<MetricRegistry>,
    sink: Arc<dyn MetricSink>,
    flush_on_stop: bool,
    worker: Option<Worker>,
}

impl PeriodicFlusher {
    pub fn new(registry: Arc<MetricRegistry>, sink: Arc<dyn MetricSink>) -> Self {
        Self {
            registry,
            sink,
            flush_on_stop: false,
            worker: None,
        }
    }

    /// Emit one last record when stopping.
    pub fn flush_on_stop(mut self, enabled: bool) -> Self {
        self.flush_on_stop = enabled;
        self
    }

    /// True while the worker thread is alive.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Spawn the flush thread. The first flush happens immediately.
    pub fn start(&mut self, interval: Duration) -> Result<()> {
        if self.is_running() {
            return Err(MetricsError::FlusherAlreadyRunning);
        }
        // Reap a worker that exited on its own.
        self.stop();
        if interval.is_zero() {
            return Err(MetricsError::InvalidInterval("interval must be non-zero".into()));
        }

        let (stop_tx, stop_rx) = mpsc::channel();
        let registry = Arc::clone(&self.registry);
        let sink = Arc::clone(&self.sink);
        let flush_on_stop = self.flush_on_stop;

        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || run(&registry, sink.as_ref(), interval, &stop_rx, flush_on_stop))
            .map_err(|e| MetricsError::Internal(format!("spawn flusher failed: {e}")))?;

        tracing::info!(interval_ms = interval.as_millis() as u64, "flusher started");
        self.worker = Some(Worker { stop_tx, handle });
        Ok(())
    }

    /// Signal the worker and wait for it to exit. An in-progress flush
    /// completes first. No-op when not running.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        // The worker may already be gone; a closed channel stops it too.
        let _ = worker.stop_tx.send(());
        if worker.handle.join().is_err() {
            tracing::warn!("flusher thread panicked");
        } else {
            tracing::info!("flusher stopped");
        }
    }
}

impl Drop for PeriodicFlusher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    registry: &MetricRegistry,
    sink: &dyn MetricSink,
    interval: Duration,
    stop_rx: &mpsc::Receiver<()>,
    flush_on_stop: bool,
) {
    loop {
        let started = Instant::now();
        flush_once(registry, sink);

        let remaining = interval.saturating_sub(started.elapsed());
        match stop_rx.recv_timeout(remaining) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if flush_on_stop {
        flush_once(registry, sink);
    }
}

fn flush_once(registry: &MetricRegistry, sink: &dyn MetricSink) {
    match panic::catch_unwind(AssertUnwindSafe(|| registry.flush_all(sink))) {
        Ok(Ok(())) => {}
        // Already logged and reported by the registry.
        Ok(Err(_)) => tracing::trace!("flush cycle skipped"),
        Err(_) => tracing::warn!("flush panicked, cycle skipped"),
    }
}
