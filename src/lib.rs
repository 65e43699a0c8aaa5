#![allow(clippy::doc_markdown)] // Allow technical terms like FetchXML in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Workflow Scheduler
//!
//! Cursor-paginated bulk retrieval followed by per-record action dispatch.
//!
//! ## Overview
//!
//! A scheduled job names a declarative query, an action, and a page size. The
//! scheduler pages through the query's results by writing the paging state
//! (`page`, `count`, `paging-cookie`) onto the query document's root element,
//! accumulates every record, and then invokes the action once per record in
//! retrieval order.
//!
//! The data service and the action service stay behind two narrow async
//! traits, [`RecordSource`] and [`ActionInvoker`]; transports, credentials and
//! connection management belong to their implementations.
//!
//! ## Module Organization
//!
//! - [`query_builder`] - Query documents and the paging cursor rewrite
//! - [`models`] - Records, pages, dispatch requests, jobs and run summaries
//! - [`client`] - Collaborator traits and closure adapters
//! - [`orchestration`] - The paginated bulk dispatcher
//! - [`state_machine`] - Run lifecycle states
//! - [`config`] - YAML configuration with environment overrides
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup and helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use uuid::Uuid;
//! use workflow_scheduler::client::{FnActionInvoker, FnRecordSource};
//! use workflow_scheduler::models::{BulkDispatchJob, DispatchRequest, PageResult, Record};
//! use workflow_scheduler::query_builder::QueryDocument;
//! use workflow_scheduler::PaginatedBulkDispatcher;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), workflow_scheduler::SchedulerError> {
//! let query = QueryDocument::parse(r#"<fetch><entity name="account"/></fetch>"#)?;
//! let job = BulkDispatchJob::new(query, Uuid::new_v4(), 250)?;
//!
//! let source = FnRecordSource::new(|_query: QueryDocument| async move {
//!     Ok(PageResult::last(vec![Record::new(Uuid::new_v4())]))
//! });
//! let invoker = FnActionInvoker::new(|_request: DispatchRequest| async move { Ok(()) });
//!
//! let dispatcher = PaginatedBulkDispatcher::new(Arc::new(source), Arc::new(invoker));
//! let summary = dispatcher.run(&job, &CancellationToken::new()).await?;
//! assert_eq!(summary.dispatched, 1);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod query_builder;
pub mod state_machine;

pub use client::{ActionInvoker, FnActionInvoker, FnRecordSource, RecordSource};
pub use config::{ConfigManager, ExecutionConfig, JobConfig, SchedulerConfig};
pub use constants::paging;
pub use error::{ActionError, FetchError, Result, SchedulerError};
pub use models::{BulkDispatchJob, DispatchRequest, DispatchSummary, PageResult, Record};
pub use orchestration::{CollectedRecords, PaginatedBulkDispatcher};
pub use query_builder::{PagingState, QueryCursorBuilder, QueryDocument};
pub use state_machine::RunState;
