//! # Client Collaborators
//!
//! Traits the dispatcher calls into, plus closure adapters for callers that
//! would rather pass two async functions than implement a trait.
//!
//! ## Usage
//!
//! ```rust
//! use workflow_scheduler::client::{ActionInvoker, FnActionInvoker, FnRecordSource, RecordSource};
//! use workflow_scheduler::models::{DispatchRequest, PageResult};
//! use workflow_scheduler::query_builder::QueryDocument;
//!
//! let source = FnRecordSource::new(|_query: QueryDocument| async move {
//!     Ok(PageResult::last(Vec::new()))
//! });
//! let invoker = FnActionInvoker::new(|_request: DispatchRequest| async move { Ok(()) });
//! # let _ = (source.name(), invoker.name());
//! ```

pub mod traits;

pub use traits::{ActionInvoker, FnActionInvoker, FnRecordSource, RecordSource};
