//! Shared error type across metricflow crates.

use thiserror::Error;

use crate::value::MetricKind;

/// Stable error classification (used for diagnostics and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Name already registered with another kind.
    DuplicateMetricTypeConflict,
    /// Value kind does not match the registered metric.
    MetricTypeMismatch,
    /// Name was never registered.
    UnknownMetricName,
    /// Output destination could not be written.
    SinkWriteFailure,
    /// Flusher started twice.
    FlusherAlreadyRunning,
    /// Zero or out-of-range flush interval.
    InvalidInterval,
    /// Invalid configuration.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal failure.
    Internal,
}

impl ErrorKind {
    /// String representation used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::DuplicateMetricTypeConflict => "DUPLICATE_METRIC_TYPE_CONFLICT",
            ErrorKind::MetricTypeMismatch => "METRIC_TYPE_MISMATCH",
            ErrorKind::UnknownMetricName => "UNKNOWN_METRIC_NAME",
            ErrorKind::SinkWriteFailure => "SINK_WRITE_FAILURE",
            ErrorKind::FlusherAlreadyRunning => "FLUSHER_ALREADY_RUNNING",
            ErrorKind::InvalidInterval => "INVALID_INTERVAL",
            ErrorKind::BadConfig => "BAD_CONFIG",
            ErrorKind::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and agent.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metric {name:?} already registered as {registered}, cannot register as {requested}")]
    DuplicateMetricTypeConflict {
        name: String,
        registered: MetricKind,
        requested: MetricKind,
    },
    #[error("metric {name:?} is {expected}, got {actual} value")]
    MetricTypeMismatch {
        name: String,
        expected: MetricKind,
        actual: MetricKind,
    },
    #[error("unknown metric: {0:?}")]
    UnknownMetricName(String),
    #[error("sink write failed: {0}")]
    SinkWriteFailure(#[source] std::io::Error),
    #[error("flusher already running")]
    FlusherAlreadyRunning,
    #[error("invalid flush interval: {0}")]
    InvalidInterval(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricsError {
    /// Map the error to its stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetricsError::DuplicateMetricTypeConflict { .. } => {
                ErrorKind::DuplicateMetricTypeConflict
            }
            MetricsError::MetricTypeMismatch { .. } => ErrorKind::MetricTypeMismatch,
            MetricsError::UnknownMetricName(_) => ErrorKind::UnknownMetricName,
            MetricsError::SinkWriteFailure(_) => ErrorKind::SinkWriteFailure,
            MetricsError::FlusherAlreadyRunning => ErrorKind::FlusherAlreadyRunning,
            MetricsError::InvalidInterval(_) => ErrorKind::InvalidInterval,
            MetricsError::BadConfig(_) => ErrorKind::BadConfig,
            MetricsError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
            MetricsError::Internal(_) => ErrorKind::Internal,
        }
    }
}
