//! Metrics collection modules

pub mod operations;

pub use operations::{OperationMetrics, OperationMetricsSnapshot};
