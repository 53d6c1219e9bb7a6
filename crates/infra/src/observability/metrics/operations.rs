//! Per-operation metrics fed by the observability hook
//!
//! Tracks totals per operation kind, failures per error kind, resubmissions,
//! and a ring buffer of durations for P50/P95/P99.
//!
//! ## Design
//! - **VecDeque ring buffer** for O(1) eviction (not Vec with remove(0))
//! - **Poison-safe locking** with explicit match pattern (no .expect())
//! - **SeqCst ordering** for counters read together in snapshots

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use rowbridge_core::OperationHook;
use rowbridge_domain::{ErrorKind, OperationEvent, OperationKind, OperationOutcome};
use serde::Serialize;

use crate::observability::{MetricsError, MetricsResult};

/// Samples kept for percentile calculations
pub const DURATION_SAMPLE_CAPACITY: usize = 1000;

const KINDS: [OperationKind; 4] = [
    OperationKind::Query,
    OperationKind::Create,
    OperationKind::Update,
    OperationKind::Delete,
];

const fn slot(kind: OperationKind) -> usize {
    match kind {
        OperationKind::Query => 0,
        OperationKind::Create => 1,
        OperationKind::Update => 2,
        OperationKind::Delete => 3,
    }
}

/// In-process [`OperationHook`] aggregating operation events
#[derive(Debug)]
pub struct OperationMetrics {
    totals: [AtomicU64; 4],
    failures: Mutex<BTreeMap<ErrorKind, u64>>,
    retries: AtomicU64,
    /// Operation durations in milliseconds (ring buffer, max 1000)
    durations: Mutex<VecDeque<u64>>,
}

/// Point-in-time copy of [`OperationMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationMetricsSnapshot {
    pub totals: BTreeMap<OperationKind, u64>,
    pub failures: BTreeMap<ErrorKind, u64>,
    pub total_retries: u64,
    pub samples: usize,
}

impl Default for OperationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationMetrics {
    pub fn new() -> Self {
        Self {
            totals: [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)],
            failures: Mutex::new(BTreeMap::new()),
            retries: AtomicU64::new(0),
            durations: Mutex::new(VecDeque::with_capacity(DURATION_SAMPLE_CAPACITY)),
        }
    }

    /// Fold one event into the counters
    pub fn record(&self, event: &OperationEvent) {
        self.totals[slot(event.kind)].fetch_add(1, Ordering::SeqCst);
        self.retries.fetch_add(u64::from(event.retry_count), Ordering::SeqCst);

        if let OperationOutcome::Failure(kind) = event.outcome {
            let mut failures = lock_recovering(&self.failures, "OperationMetrics::failures");
            *failures.entry(kind).or_insert(0) += 1;
        }

        let ms = u64::try_from(event.duration.as_millis()).unwrap_or(u64::MAX);
        let mut durations = lock_recovering(&self.durations, "OperationMetrics::durations");
        durations.push_back(ms);
        if durations.len() > DURATION_SAMPLE_CAPACITY {
            durations.pop_front();
        }
    }

    /// Operations of `kind` observed so far
    pub fn total(&self, kind: OperationKind) -> u64 {
        self.totals[slot(kind)].load(Ordering::SeqCst)
    }

    /// Failures with error kind `kind`
    pub fn failures(&self, kind: ErrorKind) -> u64 {
        lock_recovering(&self.failures, "OperationMetrics::failures")
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }

    /// Sum of `retry_count` over all events
    pub fn total_retries(&self) -> u64 {
        self.retries.load(Ordering::SeqCst)
    }

    /// Get P50 (median) operation duration in milliseconds
    ///
    /// Returns `MetricsError::EmptyData` if no samples recorded.
    pub fn p50_duration_ms(&self) -> MetricsResult<u64> {
        self.percentile_duration(0.50, "P50")
    }

    /// Get P95 operation duration in milliseconds
    ///
    /// Returns `MetricsError::EmptyData` if no samples recorded.
    pub fn p95_duration_ms(&self) -> MetricsResult<u64> {
        self.percentile_duration(0.95, "P95")
    }

    /// Get P99 operation duration in milliseconds
    ///
    /// Returns `MetricsError::EmptyData` if no samples recorded.
    pub fn p99_duration_ms(&self) -> MetricsResult<u64> {
        self.percentile_duration(0.99, "P99")
    }

    pub fn snapshot(&self) -> OperationMetricsSnapshot {
        OperationMetricsSnapshot {
            totals: KINDS.iter().map(|kind| (*kind, self.total(*kind))).collect(),
            failures: lock_recovering(&self.failures, "OperationMetrics::failures").clone(),
            total_retries: self.total_retries(),
            samples: lock_recovering(&self.durations, "OperationMetrics::durations").len(),
        }
    }

    /// Nearest-rank percentile over a sorted copy of the ring buffer.
    /// Holds the lock for the whole calculation for a consistent snapshot.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn percentile_duration(&self, percentile: f64, metric: &'static str) -> MetricsResult<u64> {
        let durations = lock_recovering(&self.durations, "OperationMetrics::durations");

        if durations.is_empty() {
            return Err(MetricsError::EmptyData { metric });
        }

        let mut sorted: Vec<u64> = durations.iter().copied().collect();
        sorted.sort_unstable();

        let index = ((sorted.len() as f64 * percentile) as usize).min(sorted.len() - 1);
        Ok(sorted[index])
    }
}

impl OperationHook for OperationMetrics {
    fn on_operation(&self, event: &OperationEvent) {
        self.record(event);
    }
}

fn lock_recovering<'a, T>(mutex: &'a Mutex<T>, metric: &'static str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poison_err) => {
            tracing::warn!(metric, "Mutex poisoned, recovering data");
            poison_err.into_inner()
        }
    }
}
