//! Mock collaborators for dispatcher tests
//!
//! Both mocks record every call so tests can assert on exactly what the
//! dispatcher sent and in which order.

pub mod mock_action_invoker;
pub mod mock_record_source;

pub use mock_action_invoker::MockActionInvoker;
pub use mock_record_source::MockRecordSource;

use uuid::Uuid;
use workflow_scheduler::models::Record;

/// Record with a readable label in its attributes
pub fn labelled(label: &str) -> Record {
    Record::new(Uuid::new_v4()).with_attribute("label", label)
}

pub fn label_of(record: &Record) -> String {
    record
        .attribute("label")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string()
}
