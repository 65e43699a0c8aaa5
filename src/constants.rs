//! # System Constants
//!
//! Reserved paging attribute names, run lifecycle event names, and the
//! operational defaults of the scheduler.

/// Root element attributes owned by the paging cursor.
///
/// Every other attribute on the root element belongs to the query author and
/// is never touched.
pub mod paging {
    pub const PAGING_COOKIE_ATTR: &str = "paging-cookie";
    pub const PAGE_ATTR: &str = "page";
    pub const COUNT_ATTR: &str = "count";

    /// Reserved attributes in the order they are written onto the root element
    pub const RESERVED_ATTRS: &[&str] = &[PAGING_COOKIE_ATTR, PAGE_ATTR, COUNT_ATTR];

    /// First page number of every run
    pub const FIRST_PAGE: u32 = 1;

    pub fn is_reserved(name: &[u8]) -> bool {
        RESERVED_ATTRS.iter().any(|attr| attr.as_bytes() == name)
    }
}

/// Run lifecycle events emitted through structured logging
pub mod events {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_COMPLETED: &str = "run.completed";
    pub const RUN_FAILED: &str = "run.failed";
    pub const PAGE_REQUESTED: &str = "page.requested";
    pub const PAGE_FETCHED: &str = "page.fetched";
    pub const RECORD_DISPATCHED: &str = "record.dispatched";
    pub const RECORD_FAILED: &str = "record.failed";
}

pub mod system {
    /// Default hard stop for the fetch loop
    pub const DEFAULT_MAX_PAGES: u32 = 10_000;

    pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;
    pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 30_000;

    /// Sequential dispatch
    pub const DEFAULT_DISPATCH_CONCURRENCY: usize = 1;

    pub const MAX_DISPATCH_CONCURRENCY: usize = 64;
}
