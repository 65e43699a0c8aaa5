//! # Scheduler Configuration System
//!
//! YAML-based configuration for dispatch runs. A single file holds the base
//! configuration; top-level `development`, `test` and `production` sections
//! are merged over it for the active environment.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use workflow_scheduler::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//!
//! let page_size = manager.config().job.page_size;
//! let concurrency = manager.config().execution.dispatch_concurrency;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::system;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring workflow-scheduler.yaml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// What to query and what to run per record
    pub job: JobConfig,

    /// Loop bounds, timeouts and dispatch concurrency
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Required configuration surface of a dispatch run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JobConfig {
    /// FetchXML-style query text
    pub query: String,

    /// Action (workflow) invoked once per retrieved record
    pub target_action_id: Uuid,

    /// Records requested per page
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Hard stop for the fetch loop; `None` lets the source decide
    pub max_pages: Option<u32>,

    /// Per-page fetch timeout; `None` waits indefinitely
    pub fetch_timeout_ms: Option<u64>,

    /// Per-record action timeout; `None` waits indefinitely
    pub action_timeout_ms: Option<u64>,

    /// Action invocations allowed in flight at once
    pub dispatch_concurrency: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_pages: Some(system::DEFAULT_MAX_PAGES),
            fetch_timeout_ms: Some(system::DEFAULT_FETCH_TIMEOUT_MS),
            action_timeout_ms: Some(system::DEFAULT_ACTION_TIMEOUT_MS),
            dispatch_concurrency: system::DEFAULT_DISPATCH_CONCURRENCY,
        }
    }
}

impl ExecutionConfig {
    /// No page cap, no timeouts, sequential dispatch
    pub fn unbounded() -> Self {
        Self {
            max_pages: None,
            fetch_timeout_ms: None,
            action_timeout_ms: None,
            dispatch_concurrency: system::DEFAULT_DISPATCH_CONCURRENCY,
        }
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn action_timeout(&self) -> Option<Duration> {
        self.action_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_pages == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "execution.max_pages",
                "0",
                "must be at least 1 or omitted",
            ));
        }
        if self.fetch_timeout_ms == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "execution.fetch_timeout_ms",
                "0",
                "must be greater than zero or omitted",
            ));
        }
        if self.action_timeout_ms == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "execution.action_timeout_ms",
                "0",
                "must be greater than zero or omitted",
            ));
        }
        if self.dispatch_concurrency == 0
            || self.dispatch_concurrency > system::MAX_DISPATCH_CONCURRENCY
        {
            return Err(ConfigurationError::invalid_value(
                "execution.dispatch_concurrency",
                self.dispatch_concurrency.to_string(),
                format!("must be between 1 and {}", system::MAX_DISPATCH_CONCURRENCY),
            ));
        }
        Ok(())
    }
}

impl JobConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.query.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "query",
                "job configuration",
            ));
        }
        if self.target_action_id.is_nil() {
            return Err(ConfigurationError::invalid_value(
                "job.target_action_id",
                self.target_action_id.to_string(),
                "must not be the nil UUID",
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "job.page_size",
                self.page_size.to_string(),
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.job.validate()?;
        self.execution.validate()
    }
}
