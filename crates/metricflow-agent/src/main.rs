//! metricflow demo agent
//!
//! - Registers the metrics declared in `metricflow.yaml` (or the path given as
//!   the first argument)
//! - Appends one line per interval to the configured log file
//! - Feeds simulated traffic until it runs out or Ctrl-C arrives

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use metricflow_agent::workload::{self, WorkloadPlan};
use metricflow_agent::{config, FileSink, MetricRegistry, PeriodicFlusher};
use metricflow_core::error::{MetricsError, Result};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "metricflow.yaml".into());
    if let Err(e) = run(&path).await {
        tracing::error!(error = %e, kind = e.kind().as_str(), "metricflow-agent failed");
        std::process::exit(1);
    }
}

async fn run(path: &str) -> Result<()> {
    let cfg = config::load_from_file(path)?;

    let registry = Arc::new(MetricRegistry::new());
    config::apply(&cfg, &registry)?;

    let sink = Arc::new(FileSink::new(&cfg.flusher.output));
    let mut flusher = PeriodicFlusher::new(Arc::clone(&registry), sink)
        .flush_on_stop(cfg.flusher.flush_on_stop);
    flusher.start(cfg.flusher.interval())?;
    tracing::info!(
        output = %cfg.flusher.output,
        metrics = registry.len(),
        "metricflow-agent running"
    );

    tokio::select! {
        _ = workload::run(Arc::clone(&registry), WorkloadPlan::default()) => {
            // Let the last samples land in a flush before shutting down.
            tokio::time::sleep(cfg.flusher.interval() * 2).await;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("ctrl-c received");
        }
    }

    // stop() joins the flush thread; keep that off the async workers.
    tokio::task::spawn_blocking(move || flusher.stop())
        .await
        .map_err(|e| MetricsError::Internal(format!("flusher shutdown failed: {e}")))
}
