//! Scripted record source

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use workflow_scheduler::error::FetchError;
use workflow_scheduler::models::PageResult;
use workflow_scheduler::query_builder::QueryDocument;
use workflow_scheduler::RecordSource;

/// Returns scripted pages in order and remembers every query it was sent
#[derive(Clone, Default)]
pub struct MockRecordSource {
    pages: Arc<Mutex<VecDeque<Result<PageResult, FetchError>>>>,
    queries: Arc<Mutex<Vec<QueryDocument>>>,
    /// Keep answering with more pages once the script runs out
    endless: bool,
    delay: Option<Duration>,
}

impl MockRecordSource {
    pub fn with_pages(pages: Vec<PageResult>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(pages.into_iter().map(Ok).collect())),
            ..Default::default()
        }
    }

    pub fn with_results(results: Vec<Result<PageResult, FetchError>>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(results.into_iter().collect())),
            ..Default::default()
        }
    }

    /// Source that always reports more pages
    pub fn endless() -> Self {
        Self {
            endless: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queries(&self) -> Vec<QueryDocument> {
        self.queries.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordSource for MockRecordSource {
    async fn fetch_page(&self, query: &QueryDocument) -> Result<PageResult, FetchError> {
        let call = {
            let mut queries = self.queries.lock().unwrap();
            queries.push(query.clone());
            queries.len()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.endless {
            return Ok(PageResult::more(Vec::new(), format!("cookie-{call}")));
        }

        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".to_string())))
    }

    fn name(&self) -> &'static str {
        "mock_record_source"
    }
}
