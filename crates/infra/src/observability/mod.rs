//! Observability collaborators for the table client
//!
//! Hook implementations that can be registered on a
//! [`crate::api::TableClient`]:
//!
//! - [`TracingHook`]: one structured log event per operation
//! - [`metrics::OperationMetrics`]: in-process counters and latency
//!   percentiles
//!
//! ## Design Principles
//!
//! 1. **Poison Recovery**: metric mutexes recover from poisoning with a
//!    warning instead of panicking inside a caller's operation.
//! 2. **Ring Buffers**: `VecDeque` for O(1) eviction of old samples.
//! 3. **Non-blocking hooks**: hooks run on the operation's task and only
//!    touch atomics or short critical sections.

pub mod metrics;
pub mod tracing_hook;

pub use metrics::{OperationMetrics, OperationMetricsSnapshot};
pub use tracing_hook::TracingHook;

/// Metrics error type
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Empty data set - cannot calculate aggregate metric
    #[error("Empty data: cannot calculate {metric}")]
    EmptyData {
        /// Metric name that failed (e.g., "P95", "P50")
        metric: &'static str,
    },
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
