//! # Collaborator Traits
//!
//! The dispatcher knows nothing about transports, credentials or the remote
//! data service. It reaches the outside world through these two traits.

use crate::error::{ActionError, FetchError};
use crate::models::{DispatchRequest, PageResult};
use crate::query_builder::QueryDocument;
use async_trait::async_trait;
use std::future::Future;

/// Executes a paged declarative query against a data service
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the page described by `query`.
    ///
    /// The paging attributes (`page`, `count`, `paging-cookie`) are already
    /// present on the query's root element. Implementations return the records
    /// of that page in source order, and a cookie when more pages remain.
    async fn fetch_page(&self, query: &QueryDocument) -> Result<PageResult, FetchError>;

    /// Name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Invokes a named action (workflow, process) against a single record
#[async_trait]
pub trait ActionInvoker: Send + Sync {
    async fn invoke(&self, request: DispatchRequest) -> Result<(), ActionError>;

    /// Name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// [`RecordSource`] backed by an async closure
pub struct FnRecordSource<F> {
    fetch: F,
}

impl<F, Fut> FnRecordSource<F>
where
    F: Fn(QueryDocument) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PageResult, FetchError>> + Send,
{
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl<F, Fut> RecordSource for FnRecordSource<F>
where
    F: Fn(QueryDocument) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PageResult, FetchError>> + Send,
{
    async fn fetch_page(&self, query: &QueryDocument) -> Result<PageResult, FetchError> {
        (self.fetch)(query.clone()).await
    }

    fn name(&self) -> &'static str {
        "fn_record_source"
    }
}

/// [`ActionInvoker`] backed by an async closure
pub struct FnActionInvoker<F> {
    act: F,
}

impl<F, Fut> FnActionInvoker<F>
where
    F: Fn(DispatchRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ActionError>> + Send,
{
    pub fn new(act: F) -> Self {
        Self { act }
    }
}

#[async_trait]
impl<F, Fut> ActionInvoker for FnActionInvoker<F>
where
    F: Fn(DispatchRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ActionError>> + Send,
{
    async fn invoke(&self, request: DispatchRequest) -> Result<(), ActionError> {
        (self.act)(request).await
    }

    fn name(&self) -> &'static str {
        "fn_action_invoker"
    }
}
