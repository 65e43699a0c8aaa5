pub mod dispatch_request;
pub mod job;
pub mod page_result;
pub mod record;
pub mod summary;

// Re-export core models for easy access
pub use dispatch_request::DispatchRequest;
pub use job::BulkDispatchJob;
pub use page_result::PageResult;
pub use record::Record;
pub use summary::DispatchSummary;
