//! Recording action invoker

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;
use workflow_scheduler::error::ActionError;
use workflow_scheduler::models::DispatchRequest;
use workflow_scheduler::ActionInvoker;

#[derive(Clone, Default)]
pub struct MockActionInvoker {
    /// Every request in the order it reached the invoker
    attempts: Arc<Mutex<Vec<DispatchRequest>>>,
    failing: Arc<HashSet<Uuid>>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockActionInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(record_ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            failing: Arc::new(record_ids.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn attempts(&self) -> Vec<DispatchRequest> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempted_ids(&self) -> Vec<Uuid> {
        self.attempts().iter().map(DispatchRequest::record_id).collect()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActionInvoker for MockActionInvoker {
    async fn invoke(&self, request: DispatchRequest) -> Result<(), ActionError> {
        let record_id = request.record_id();
        self.attempts.lock().unwrap().push(request);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&record_id) {
            return Err(ActionError::Invocation(format!(
                "workflow refused record {record_id}"
            )));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock_action_invoker"
    }
}
