//! # Orchestration Engine
//!
//! Runs a bulk dispatch: cursor-paginated retrieval through a
//! [`RecordSource`](crate::client::RecordSource) followed by one action
//! invocation per record through an [`ActionInvoker`](crate::client::ActionInvoker).
//!
//! ## Core Components
//!
//! - **PaginatedBulkDispatcher**: fetch loop, accumulation and ordered dispatch
//! - **CollectedRecords**: output of the fetch phase when run on its own

pub mod dispatcher;

pub use dispatcher::{CollectedRecords, PaginatedBulkDispatcher};
