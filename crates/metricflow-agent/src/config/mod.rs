//! Agent config loader (strict parsing).

pub mod schema;

use std::fs;

use metricflow_core::error::{MetricsError, Result};
use metricflow_core::{fixed_precision, MetricKind};

use crate::registry::MetricRegistry;

pub use schema::{AgentConfig, FlusherSection, MetricConfig};

pub fn load_from_file(path: &str) -> Result<AgentConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricsError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AgentConfig> {
    let cfg: AgentConfig = serde_yaml::from_str(s)
        .map_err(|e| MetricsError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Register every configured metric on `registry`.
pub fn apply(cfg: &AgentConfig, registry: &MetricRegistry) -> Result<()> {
    for m in &cfg.metrics {
        match m.kind {
            MetricKind::Integral => registry.register_integral(&m.name, None)?,
            MetricKind::Floating => {
                registry.register_floating(&m.name, m.precision.map(fixed_precision))?
            }
        }
    }
    Ok(())
}
