//! # Paginated Bulk Dispatcher
//!
//! Drives a run in two phases. The fetch phase threads the paging cursor
//! through the query document page after page until the source reports no
//! more results. The dispatch phase then submits one `DispatchRequest` per
//! accumulated record, in retrieval order, through a bounded worker pool.
//!
//! ```text
//! Fetching(1, none) ─► Fetching(n + 1, cookie) ─► … ─► Dispatching ─► Done
//!        │                      │                          │
//!        └──────────────────────┴──────────► Failed ◄──────┘
//! ```
//!
//! Every failure is fatal to the run. Nothing already dispatched is rolled
//! back; action failures report how many records were dispatched before them.

use crate::client::{ActionInvoker, RecordSource};
use crate::config::ExecutionConfig;
use crate::constants::events;
use crate::error::{Result, SchedulerError};
use crate::logging::{log_dispatch_operation, log_error, log_page_operation};
use crate::models::{BulkDispatchJob, DispatchRequest, DispatchSummary, PageResult, Record};
use crate::query_builder::{PagingState, QueryCursorBuilder, QueryDocument};
use crate::state_machine::RunState;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Records gathered by the fetch phase
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedRecords {
    /// Retrieval order: page order, then order within the page
    pub records: Vec<Record>,
    pub pages_fetched: u32,
}

/// A failed phase: the error plus the state transition it caused
#[derive(Debug)]
struct RunFailure {
    failed_in: RunState,
    state: RunState,
    error: SchedulerError,
}

impl RunFailure {
    fn new(failed_in: RunState, error: SchedulerError) -> Self {
        // A run that already reached a terminal state keeps it
        let state = failed_in.fail().unwrap_or(failed_in);
        Self {
            failed_in,
            state,
            error,
        }
    }
}

/// Fetch-then-dispatch driver over injected collaborators.
///
/// Holds no per-run state; every call to [`run`](Self::run) owns its query
/// and accumulator, so one dispatcher can serve concurrent runs.
pub struct PaginatedBulkDispatcher<S: ?Sized, A: ?Sized> {
    source: Arc<S>,
    invoker: Arc<A>,
    execution: ExecutionConfig,
}

impl<S, A> PaginatedBulkDispatcher<S, A>
where
    S: RecordSource + ?Sized,
    A: ActionInvoker + ?Sized,
{
    /// Create a dispatcher with the default execution bounds
    pub fn new(source: Arc<S>, invoker: Arc<A>) -> Self {
        Self {
            source,
            invoker,
            execution: ExecutionConfig::default(),
        }
    }

    /// Create a dispatcher with explicit execution bounds, rejecting zero
    /// page caps, zero timeouts and out-of-range concurrency
    pub fn with_config(
        source: Arc<S>,
        invoker: Arc<A>,
        execution: ExecutionConfig,
    ) -> Result<Self> {
        execution.validate()?;
        Ok(Self {
            source,
            invoker,
            execution,
        })
    }

    /// Fetch every page of `job`'s query, then invoke the target action once
    /// per retrieved record.
    pub async fn run(
        &self,
        job: &BulkDispatchJob,
        cancel: &CancellationToken,
    ) -> Result<DispatchSummary> {
        let run_id = Uuid::new_v4();
        let span = info_span!("dispatch_run", run_id = %run_id);

        async move {
            let started_at = Utc::now();
            let clock = Instant::now();

            info!(
                event = events::RUN_STARTED,
                source = self.source.name(),
                invoker = self.invoker.name(),
                target_action_id = %job.target_action_id(),
                page_size = job.page_size(),
                "▶️ Bulk dispatch run started"
            );

            let outcome = async {
                let collected = self.collect(run_id, job, cancel).await?;
                let records_retrieved = collected.records.len();
                let dispatched = self
                    .dispatch(run_id, job.target_action_id(), collected.records, cancel)
                    .await?;
                Ok::<_, RunFailure>((collected.pages_fetched, records_retrieved, dispatched))
            }
            .await;

            match outcome {
                Ok((pages_fetched, records_retrieved, dispatched)) => {
                    let summary = DispatchSummary {
                        run_id,
                        pages_fetched,
                        records_retrieved,
                        dispatched,
                        started_at,
                        elapsed: clock.elapsed(),
                    };
                    info!(
                        event = events::RUN_COMPLETED,
                        pages_fetched,
                        records_retrieved,
                        dispatched,
                        elapsed_ms = summary.elapsed.as_millis() as u64,
                        "✅ Bulk dispatch run completed"
                    );
                    Ok(summary)
                }
                Err(RunFailure {
                    failed_in,
                    state,
                    error,
                }) => {
                    warn!(
                        event = events::RUN_FAILED,
                        kind = error.kind(),
                        failed_in = %failed_in,
                        state = %state,
                        dispatched = error.dispatched_before_failure(),
                        "Bulk dispatch run failed"
                    );
                    log_error(
                        "paginated_bulk_dispatcher",
                        "run",
                        &error.to_string(),
                        Some(&format!("run_id={run_id}")),
                    );
                    Err(error)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Fetch phase only: page through the query and return every record in
    /// retrieval order
    pub async fn collect_records(
        &self,
        job: &BulkDispatchJob,
        cancel: &CancellationToken,
    ) -> Result<CollectedRecords> {
        self.collect(Uuid::new_v4(), job, cancel)
            .await
            .map_err(|failure| failure.error)
    }

    /// Dispatch phase only: invoke `job`'s action once per record, in order.
    /// Returns the number of records dispatched.
    pub async fn dispatch_records(
        &self,
        job: &BulkDispatchJob,
        records: Vec<Record>,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        self.dispatch(Uuid::new_v4(), job.target_action_id(), records, cancel)
            .await
            .map_err(|failure| failure.error)
    }

    async fn collect(
        &self,
        run_id: Uuid,
        job: &BulkDispatchJob,
        cancel: &CancellationToken,
    ) -> std::result::Result<CollectedRecords, RunFailure> {
        let mut state = RunState::initial();
        let outcome = self.fetch_pages(run_id, job, cancel, &mut state).await;
        outcome.map_err(|error| RunFailure::new(state, error))
    }

    async fn fetch_pages(
        &self,
        run_id: Uuid,
        job: &BulkDispatchJob,
        cancel: &CancellationToken,
        state: &mut RunState,
    ) -> Result<CollectedRecords> {
        let mut paging = PagingState::first(job.page_size());
        let mut records = Vec::new();
        let mut pages_fetched: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(SchedulerError::Cancelled {
                    stage: format!("fetch of page {}", paging.page),
                });
            }
            if let Some(max_pages) = self.execution.max_pages {
                if paging.page > max_pages {
                    return Err(SchedulerError::PageLimitExceeded { max_pages });
                }
            }

            let query = QueryCursorBuilder::build(job.query(), &paging)?;
            debug!(
                event = events::PAGE_REQUESTED,
                page = paging.page,
                has_cookie = paging.cookie.is_some(),
                state = %state,
                "Requesting page"
            );

            let started = Instant::now();
            let page = self.fetch_page(&query, paging.page, cancel).await?;
            pages_fetched += 1;

            let has_more = page.has_more();
            let (page_records, next_cookie) = page.into_parts();
            log_page_operation(
                run_id,
                paging.page,
                events::PAGE_FETCHED,
                Some(page_records.len()),
                Some(has_more),
                Some(started.elapsed().as_millis() as u64),
            );

            records.extend(page_records);
            *state = state.page_fetched(has_more, records.len())?;

            if !has_more {
                break;
            }
            paging = paging.next(next_cookie);
        }

        debug!(
            pages_fetched,
            records = records.len(),
            state = %state,
            "Fetch phase complete"
        );

        Ok(CollectedRecords {
            records,
            pages_fetched,
        })
    }

    async fn fetch_page(
        &self,
        query: &QueryDocument,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<PageResult> {
        let fetch = async {
            let result = match self.execution.fetch_timeout() {
                Some(limit) => tokio::time::timeout(limit, self.source.fetch_page(query))
                    .await
                    .map_err(|_| SchedulerError::FetchTimeout {
                        page,
                        timeout_ms: limit.as_millis() as u64,
                    })?,
                None => self.source.fetch_page(query).await,
            };
            result.map_err(|source| SchedulerError::Fetch { page, source })
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SchedulerError::Cancelled {
                stage: format!("fetch of page {page}"),
            }),
            result = fetch => result,
        }
    }

    async fn dispatch(
        &self,
        run_id: Uuid,
        target_action_id: Uuid,
        records: Vec<Record>,
        cancel: &CancellationToken,
    ) -> std::result::Result<usize, RunFailure> {
        let mut state = RunState::dispatching(0, records.len());
        let outcome = self
            .dispatch_all(run_id, target_action_id, records, cancel, &mut state)
            .await;
        outcome.map_err(|error| RunFailure::new(state, error))
    }

    async fn dispatch_all(
        &self,
        run_id: Uuid,
        target_action_id: Uuid,
        records: Vec<Record>,
        cancel: &CancellationToken,
        state: &mut RunState,
    ) -> Result<usize> {
        let total = records.len();
        let concurrency = self.execution.dispatch_concurrency.max(1);
        let mut dispatched = 0;

        debug!(total, concurrency, state = %state, "Dispatch phase starting");

        // `buffered` starts invocations in record order and yields their
        // outcomes in that same order, so the first error seen belongs to the
        // earliest failing record and everything before it succeeded.
        let mut outcomes = stream::iter(records.into_iter().enumerate())
            .map(|(index, record)| {
                self.dispatch_one(run_id, target_action_id, index, record, cancel)
            })
            .buffered(concurrency);

        while let Some(outcome) = outcomes.next().await {
            outcome?;
            dispatched += 1;
            *state = state.record_dispatched()?;
        }

        debug!(dispatched, state = %state, "Dispatch phase complete");
        Ok(dispatched)
    }

    async fn dispatch_one(
        &self,
        run_id: Uuid,
        target_action_id: Uuid,
        index: usize,
        record: Record,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let record_id = record.id;

        if cancel.is_cancelled() {
            return Err(SchedulerError::Cancelled {
                stage: format!("dispatch of record {record_id}"),
            });
        }

        let request = DispatchRequest::new(target_action_id, record);
        let outcome = match self.execution.action_timeout() {
            Some(limit) => {
                match tokio::time::timeout(limit, self.invoker.invoke(request)).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        log_dispatch_operation(
                            run_id,
                            record_id,
                            target_action_id,
                            events::RECORD_FAILED,
                            Some("timed out"),
                        );
                        return Err(SchedulerError::ActionTimeout {
                            record_id,
                            dispatched: index,
                            timeout_ms: limit.as_millis() as u64,
                        });
                    }
                }
            }
            None => self.invoker.invoke(request).await,
        };

        match outcome {
            Ok(()) => {
                log_dispatch_operation(
                    run_id,
                    record_id,
                    target_action_id,
                    events::RECORD_DISPATCHED,
                    None,
                );
                Ok(())
            }
            Err(source) => {
                log_dispatch_operation(
                    run_id,
                    record_id,
                    target_action_id,
                    events::RECORD_FAILED,
                    Some(&source.to_string()),
                );
                Err(SchedulerError::Action {
                    record_id,
                    dispatched: index,
                    source,
                })
            }
        }
    }
}
