use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;
use metricflow_core::error::{MetricsError, Result};
use metricflow_core::MetricKind;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub version: u32,

    #[serde(default)]
    pub flusher: FlusherSection,

    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::UnsupportedVersion);
        }
        if self.metrics.is_empty() {
            return Err(MetricsError::BadConfig("metrics must not be empty".into()));
        }

        self.flusher.validate()?;

        let mut seen = HashSet::new();
        for m in &self.metrics {
            m.validate()?;
            if !seen.insert(m.name.as_str()) {
                return Err(MetricsError::BadConfig(format!(
                    "metric {:?} declared more than once",
                    m.name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlusherSection {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default)]
    pub flush_on_stop: bool,
}

impl Default for FlusherSection {
    fn default() -> Self {
        Self {
            output: default_output(),
            interval_ms: default_interval_ms(),
            flush_on_stop: false,
        }
    }
}

impl FlusherSection {
    pub fn validate(&self) -> Result<()> {
        if self.output.trim().is_empty() {
            return Err(MetricsError::BadConfig("flusher.output must not be empty".into()));
        }
        if !(10..=3_600_000).contains(&self.interval_ms) {
            return Err(MetricsError::InvalidInterval(
                "flusher.interval_ms must be between 10 and 3600000".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_output() -> String {
    "metrics.log".into()
}
fn default_interval_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricConfig {
    pub name: String,
    pub kind: MetricKind,
    /// Fixed decimals for floating metrics.
    #[serde(default)]
    pub precision: Option<usize>,
}

impl MetricConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(MetricsError::BadConfig("metric name must not be empty".into()));
        }
        match (self.kind, self.precision) {
            (MetricKind::Integral, Some(_)) => Err(MetricsError::BadConfig(format!(
                "metric {:?}: precision only applies to floating metrics",
                self.name
            ))),
            (MetricKind::Floating, Some(p)) if p > 17 => Err(MetricsError::BadConfig(format!(
                "metric {:?}: precision must be at most 17",
                self.name
            ))),
            _ => Ok(()),
        }
    }
}
