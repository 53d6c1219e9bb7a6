//! Observability hook port
//!
//! A narrow callback invoked synchronously once per operation, after its
//! outcome is known. Storage, aggregation, and export are the business of
//! whoever registers the hook.

use std::fmt;
use std::sync::Arc;

use rowbridge_domain::OperationEvent;

/// Receives one [`OperationEvent`] per finished operation
///
/// Called on the operation's own task, so implementations must not block.
pub trait OperationHook: Send + Sync {
    /// Observe a finished operation
    fn on_operation(&self, event: &OperationEvent);
}

impl<F> OperationHook for F
where
    F: Fn(&OperationEvent) + Send + Sync,
{
    fn on_operation(&self, event: &OperationEvent) {
        self(event);
    }
}

/// Hook that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl OperationHook for NoopHook {
    fn on_operation(&self, _event: &OperationEvent) {}
}

/// Dispatches each event to several hooks in registration order
#[derive(Clone, Default)]
pub struct FanoutHook {
    hooks: Vec<Arc<dyn OperationHook>>,
}

impl FanoutHook {
    /// Empty fan-out
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register another hook
    #[must_use]
    pub fn with(mut self, hook: Arc<dyn OperationHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Number of registered hooks
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// `true` when no hooks are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for FanoutHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutHook").field("hooks", &self.hooks.len()).finish()
    }
}

impl OperationHook for FanoutHook {
    fn on_operation(&self, event: &OperationEvent) {
        for hook in &self.hooks {
            hook.on_operation(event);
        }
    }
}
