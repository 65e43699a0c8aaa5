use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of a completed dispatch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchSummary {
    pub run_id: Uuid,
    pub pages_fetched: u32,
    pub records_retrieved: usize,
    /// Records the action was successfully invoked for
    pub dispatched: usize,
    pub started_at: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }
}
