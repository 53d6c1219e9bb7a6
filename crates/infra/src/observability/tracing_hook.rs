//! Structured log output for finished operations

use rowbridge_core::OperationHook;
use rowbridge_domain::OperationEvent;
use tracing::{info, warn};

/// [`OperationHook`] emitting one `tracing` event per operation
///
/// `info` for successes, `warn` for failures. Never records credentials,
/// tokens, or field values.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHook;

impl TracingHook {
    pub const fn new() -> Self {
        Self
    }
}

impl OperationHook for TracingHook {
    fn on_operation(&self, event: &OperationEvent) {
        let table = event.table.as_ref().map_or("-", |table| table.as_str());
        let elapsed_ms = u64::try_from(event.duration.as_millis()).unwrap_or(u64::MAX);

        if event.outcome.is_success() {
            info!(
                table,
                kind = %event.kind,
                elapsed_ms,
                retry_count = event.retry_count,
                "Operation succeeded"
            );
        } else {
            warn!(
                table,
                kind = %event.kind,
                elapsed_ms,
                retry_count = event.retry_count,
                outcome = event.outcome.label(),
                "Operation failed"
            );
        }
    }
}
