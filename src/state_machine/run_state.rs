use crate::error::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one dispatch run.
///
/// `Fetching(1, no cookie)` → `Fetching(n + 1, cookie)` while pages remain →
/// `Dispatching` per record → `Done`. Any non-terminal state may fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RunState {
    Fetching { page: u32, has_cookie: bool },
    Dispatching { next: usize, total: usize },
    Done,
    Failed,
}

impl RunState {
    pub fn initial() -> Self {
        Self::Fetching {
            page: 1,
            has_cookie: false,
        }
    }

    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// A page came back. With more pages the run keeps fetching; otherwise it
    /// moves on to dispatching the `accumulated` records.
    pub fn page_fetched(self, has_more: bool, accumulated: usize) -> Result<Self> {
        match self {
            Self::Fetching { page, .. } if has_more => Ok(Self::Fetching {
                page: page.saturating_add(1),
                has_cookie: true,
            }),
            Self::Fetching { .. } => Ok(Self::dispatching(0, accumulated)),
            other => Err(invalid_transition(other, "page_fetched")),
        }
    }

    /// One more record was dispatched successfully
    pub fn record_dispatched(self) -> Result<Self> {
        match self {
            Self::Dispatching { next, total } if next < total => {
                Ok(Self::dispatching(next + 1, total))
            }
            other => Err(invalid_transition(other, "record_dispatched")),
        }
    }

    pub fn fail(self) -> Result<Self> {
        if self.is_terminal() {
            return Err(invalid_transition(self, "fail"));
        }
        Ok(Self::Failed)
    }

    /// Dispatch position `next` of `total`; collapses to `Done` once nothing is left
    pub fn dispatching(next: usize, total: usize) -> Self {
        if next >= total {
            Self::Done
        } else {
            Self::Dispatching { next, total }
        }
    }
}

fn invalid_transition(state: RunState, event: &str) -> SchedulerError {
    SchedulerError::InvalidState(format!("cannot apply '{event}' in state {state}"))
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetching { page, .. } => write!(f, "fetching(page {page})"),
            Self::Dispatching { next, total } => write!(f, "dispatching({next}/{total})"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_happy_path() {
        let state = RunState::initial();
        assert_eq!(
            state,
            RunState::Fetching {
                page: 1,
                has_cookie: false
            }
        );

        let state = state.page_fetched(true, 2).unwrap();
        assert_eq!(
            state,
            RunState::Fetching {
                page: 2,
                has_cookie: true
            }
        );

        let state = state.page_fetched(false, 3).unwrap();
        assert_eq!(state, RunState::Dispatching { next: 0, total: 3 });

        let state = state
            .record_dispatched()
            .and_then(RunState::record_dispatched)
            .and_then(RunState::record_dispatched)
            .unwrap();
        assert_eq!(state, RunState::Done);
        assert!(state.is_terminal());
    }

    #[test]
    fn empty_result_set_finishes_immediately() {
        let state = RunState::initial().page_fetched(false, 0).unwrap();
        assert_eq!(state, RunState::Done);
    }

    #[test]
    fn rejects_out_of_order_events() {
        assert!(RunState::initial().record_dispatched().is_err());
        assert!(RunState::Done.page_fetched(false, 0).is_err());
        assert!(RunState::Done.fail().is_err());
        assert!(RunState::Failed.fail().is_err());
        assert_eq!(RunState::initial().fail().unwrap(), RunState::Failed);
    }

    #[test]
    fn display_names() {
        assert_eq!(RunState::initial().to_string(), "fetching(page 1)");
        assert_eq!(
            RunState::Dispatching { next: 2, total: 5 }.to_string(),
            "dispatching(2/5)"
        );
        assert_eq!(RunState::Done.to_string(), "done");
    }
}
