//! Operation events handed to observability hooks

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::table::TableReference;
use crate::errors::{DataAccessError, ErrorKind};

/// Logical operation performed through the façade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Query,
    Create,
    Update,
    Delete,
}

impl OperationKind {
    /// Reads may be resubmitted after a transient network failure
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::Query)
    }

    /// Stable label for log fields and metric tags
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum OperationOutcome {
    Success,
    Failure(ErrorKind),
}

impl OperationOutcome {
    /// Outcome of a finished operation
    #[must_use]
    pub fn of<T>(result: &Result<T, DataAccessError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(err) => Self::Failure(err.kind()),
        }
    }

    /// `true` for [`OperationOutcome::Success`]
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Stable label for log fields and metric tags
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure(kind) => kind.label(),
        }
    }
}

/// One finished operation, reported after its outcome is determined
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationEvent {
    /// Target table; `None` for table listing
    pub table: Option<TableReference>,
    pub kind: OperationKind,
    /// Wall time from entry to outcome, including retries
    pub duration: Duration,
    pub outcome: OperationOutcome,
    /// Resubmissions after the first attempt (re-auth and network retries)
    pub retry_count: u32,
    pub occurred_at: DateTime<Utc>,
}
