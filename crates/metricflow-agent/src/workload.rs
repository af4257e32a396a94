//! Simulated application traffic for the demo binary.
//!
//! One task per configured metric feeds random samples into the registry at
//! a fixed tick, like request handlers or a CPU sampler would.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use metricflow_core::{MetricKind, MetricValue};

use crate::registry::MetricRegistry;

#[derive(Debug, Clone)]
pub struct WorkloadPlan {
    pub iterations: u32,
    pub tick: Duration,
}

impl Default for WorkloadPlan {
    fn default() -> Self {
        Self {
            iterations: 50,
            tick: Duration::from_millis(100),
        }
    }
}

/// Random sample for a metric of `kind`: a CPU-like load in `[0.5, 3.0)`
/// for floating metrics, a request count in `[30, 80)` for integral ones.
pub fn sample(kind: MetricKind) -> MetricValue {
    match kind {
        MetricKind::Floating => MetricValue::Floating(0.5 + rand::random::<f64>() * 2.5),
        MetricKind::Integral => MetricValue::Integral(30 + i64::from(rand::random::<u32>() % 50)),
    }
}

/// Drive every registered metric until the plan is exhausted.
pub async fn run(registry: Arc<MetricRegistry>, plan: WorkloadPlan) {
    let mut set = JoinSet::new();
    for name in registry.names() {
        let Some(kind) = registry.kind_of(&name) else { continue; };
        let registry = Arc::clone(&registry);
        let plan = plan.clone();
        set.spawn(async move {
            let mut ticker = tokio::time::interval(plan.tick);
            for _ in 0..plan.iterations {
                ticker.tick().await;
                registry.add(&name, sample(kind));
            }
        });
    }

    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            tracing::warn!(error = %e, "workload task failed");
        }
    }
}
