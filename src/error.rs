//! Error types for the workflow scheduler.
//!
//! `SchedulerError` is what a caller of a dispatch run sees. The collaborator
//! errors (`FetchError`, `ActionError`) are what `RecordSource` and
//! `ActionInvoker` implementations return; the dispatcher wraps them with the
//! page number or record identifier that was in flight.

use crate::config::ConfigurationError;
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a [`RecordSource`](crate::client::RecordSource)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Authentication error: {0}")]
    Authentication(String),
    #[error("Query syntax error: {0}")]
    QuerySyntax(String),
    /// The source returned a page that breaks the paging contract
    #[error("Paging protocol violation: {0}")]
    ProtocolViolation(String),
}

/// Failure reported by an [`ActionInvoker`](crate::client::ActionInvoker)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Action invocation failed: {0}")]
    Invocation(String),
    #[error("Action rejected by target service: {0}")]
    Rejected(String),
    #[error("Action {action_id} not found")]
    NotFound { action_id: Uuid },
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Malformed query document: {reason}")]
    MalformedQuery { reason: String },

    #[error("Invalid paging state: page {page}, count {count} (both must be >= 1)")]
    InvalidPaging { page: u32, count: u32 },

    #[error("Fetch failed on page {page}: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: FetchError,
    },

    #[error("Fetch of page {page} timed out after {timeout_ms}ms")]
    FetchTimeout { page: u32, timeout_ms: u64 },

    #[error("Page limit of {max_pages} exceeded before the source reported its last page")]
    PageLimitExceeded { max_pages: u32 },

    #[error("Action failed for record {record_id} after {dispatched} successful dispatches: {source}")]
    Action {
        record_id: Uuid,
        dispatched: usize,
        #[source]
        source: ActionError,
    },

    #[error("Action for record {record_id} timed out after {timeout_ms}ms ({dispatched} dispatched before it)")]
    ActionTimeout {
        record_id: Uuid,
        dispatched: usize,
        timeout_ms: u64,
    },

    #[error("Run cancelled during {stage}")]
    Cancelled { stage: String },

    #[error("Invalid job: {0}")]
    InvalidJob(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl SchedulerError {
    pub fn malformed_query<R: std::fmt::Display>(reason: R) -> Self {
        Self::MalformedQuery {
            reason: reason.to_string(),
        }
    }

    /// Stable short name for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedQuery { .. } => "malformed_query",
            Self::InvalidPaging { .. } => "invalid_paging",
            Self::Fetch { .. } => "fetch",
            Self::FetchTimeout { .. } => "fetch_timeout",
            Self::PageLimitExceeded { .. } => "page_limit_exceeded",
            Self::Action { .. } => "action",
            Self::ActionTimeout { .. } => "action_timeout",
            Self::Cancelled { .. } => "cancelled",
            Self::InvalidJob(_) => "invalid_job",
            Self::InvalidState(_) => "invalid_state",
            Self::Configuration(_) => "configuration",
        }
    }

    /// Number of records dispatched before a dispatch-phase failure
    pub fn dispatched_before_failure(&self) -> Option<usize> {
        match self {
            Self::Action { dispatched, .. } | Self::ActionTimeout { dispatched, .. } => {
                Some(*dispatched)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_carries_page_context() {
        let err = SchedulerError::Fetch {
            page: 3,
            source: FetchError::Transport("connection reset".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Fetch failed on page 3: Transport error: connection reset"
        );
        assert_eq!(err.kind(), "fetch");
        assert_eq!(err.dispatched_before_failure(), None);
    }

    #[test]
    fn action_error_reports_dispatched_prefix() {
        let record_id = Uuid::new_v4();
        let err = SchedulerError::Action {
            record_id,
            dispatched: 2,
            source: ActionError::Invocation("boom".to_string()),
        };
        assert!(err.to_string().contains(&record_id.to_string()));
        assert_eq!(err.dispatched_before_failure(), Some(2));
    }

    #[test]
    fn source_chain_is_preserved() {
        use std::error::Error as _;
        let err = SchedulerError::Fetch {
            page: 1,
            source: FetchError::Authentication("expired token".to_string()),
        };
        let source = err.source().expect("fetch error has a source");
        assert_eq!(source.to_string(), "Authentication error: expired token");
    }
}
