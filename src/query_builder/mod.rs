//! # Query Builder System
//!
//! Cursor threading for FetchXML-style declarative queries.
//!
//! ## Overview
//!
//! Paged sources expect the paging position inside the query itself: the root
//! element carries `page`, `count` and, from the second page on, the opaque
//! `paging-cookie` the source returned with the previous page. This module
//! owns that transformation.
//!
//! ## Key Components
//!
//! - [`document`] - Validated query documents with root attribute access
//! - [`cursor`] - Paging state and the immutable paging-attribute rewrite
//!
//! ## Example Usage
//!
//! ```rust
//! use workflow_scheduler::query_builder::{PagingState, QueryCursorBuilder, QueryDocument};
//!
//! # fn main() -> Result<(), workflow_scheduler::SchedulerError> {
//! let base = QueryDocument::parse(r#"<fetch><entity name="contact"/></fetch>"#)?;
//! let first = QueryCursorBuilder::build(&base, &PagingState::first(250))?;
//! assert_eq!(first.attribute("page"), Some("1"));
//! assert_eq!(first.attribute("paging-cookie"), None);
//! # Ok(())
//! # }
//! ```

pub mod cursor;
pub mod document;

pub use cursor::{PagingState, QueryCursorBuilder};
pub use document::QueryDocument;
