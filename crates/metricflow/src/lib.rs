//! Top-level facade crate for metricflow.
//!
//! Re-exports the core types and the agent library so users can depend on a single crate.

pub mod core {
    pub use metricflow_core::*;
}

pub mod agent {
    pub use metricflow_agent::*;
}
