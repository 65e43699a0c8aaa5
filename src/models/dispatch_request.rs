use super::record::Record;
use uuid::Uuid;

/// Request to run the target action against one record.
///
/// Built by the dispatcher at dispatch time and handed to the invoker by value.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    target_action_id: Uuid,
    record: Record,
}

impl DispatchRequest {
    pub fn new(target_action_id: Uuid, record: Record) -> Self {
        Self {
            target_action_id,
            record,
        }
    }

    pub fn target_action_id(&self) -> Uuid {
        self.target_action_id
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_id(&self) -> Uuid {
        self.record.id
    }
}
