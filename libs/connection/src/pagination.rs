//! Page cursors over list endpoints.
//!
//! A [`PaginatedCollection`] holds one page of items plus whatever it needs
//! to fetch the page after it. [`ListRequest`] is the usual way to get one:
//! it describes the list call (transport, path, interceptors) and re-issues
//! it with the next page number on demand.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use connection_core::{ApiResponseBodyData, ApiResponseMetadataPagination, RequestParameters};
use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::error::Error;
use crate::response::Interceptor;
use crate::transport::Transport;
use crate::verbs;

/// Fetches the page of a collection selected by the given parameters.
#[async_trait]
pub trait PageFetcher<T: Send + 'static>: Send + Sync {
    async fn fetch_page(&self, params: RequestParameters) -> Result<PaginatedCollection<T>, Error>;
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for F
where
    T: Send + 'static,
    F: Fn(RequestParameters) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PaginatedCollection<T>, Error>> + Send + 'static,
{
    async fn fetch_page(&self, params: RequestParameters) -> Result<PaginatedCollection<T>, Error> {
        (self)(params).await
    }
}

/// One page of `T` plus the means to walk forward.
pub struct PaginatedCollection<T: Send + 'static> {
    items: Vec<T>,
    metadata: ApiResponseMetadataPagination,
    request_parameters: RequestParameters,
    fetch_next: Option<Arc<dyn PageFetcher<T>>>,
}

impl<T: Send + 'static> PaginatedCollection<T> {
    /// Servers that omit `current_page` (or report one behind the request)
    /// get the requested page recorded instead, so the cursor always moves
    /// forward.
    pub fn new(
        items: Vec<T>,
        mut metadata: ApiResponseMetadataPagination,
        request_parameters: RequestParameters,
        fetch_next: Option<Arc<dyn PageFetcher<T>>>,
    ) -> Self {
        metadata.current_page = metadata.current_page.max(request_parameters.page_number());
        Self {
            items,
            metadata,
            request_parameters,
            fetch_next,
        }
    }

    pub fn from_envelope(
        envelope: ApiResponseBodyData<Vec<T>>,
        request_parameters: RequestParameters,
        fetch_next: Option<Arc<dyn PageFetcher<T>>>,
    ) -> Self {
        let metadata = envelope.metadata.pagination;
        Self::new(envelope.data, metadata, request_parameters, fetch_next)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn metadata(&self) -> &ApiResponseMetadataPagination {
        &self.metadata
    }

    /// Parameters that produced this page.
    pub fn request_parameters(&self) -> &RequestParameters {
        &self.request_parameters
    }

    pub fn has_next(&self) -> bool {
        self.metadata.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.metadata.has_previous()
    }

    /// Same filters, sorts and page size, one page further.
    pub fn next_page_parameters(&self) -> RequestParameters {
        self.request_parameters.with_page(self.metadata.current_page.saturating_add(1))
    }

    /// Fetch the following page.
    pub async fn next(&self) -> Result<PaginatedCollection<T>, Error> {
        let Some((params, fetcher)) = self.next_request() else {
            return Err(Error::NoNextPage {
                current_page: self.metadata.current_page,
                total_pages: self.metadata.total_pages,
            });
        };
        let page = fetcher.fetch_page(params).await?;
        Ok(page.bind(fetcher))
    }

    /// This page followed by every later page, fetched lazily one at a time.
    /// The stream ends after the last page or after the first error.
    pub fn into_pages(self) -> impl Stream<Item = Result<PaginatedCollection<T>, Error>> + Send {
        stream::unfold(Walk::Ready(self), |state| async move {
            let page = match state {
                Walk::Ready(page) => page,
                Walk::Pending(Some((params, fetcher))) => {
                    let fetched = fetcher.fetch_page(params).await;
                    match fetched {
                        Ok(page) => page.bind(fetcher),
                        Err(err) => return Some((Err(err), Walk::Pending(None))),
                    }
                }
                Walk::Pending(None) => return None,
            };
            let next = page.next_request();
            Some((Ok(page), Walk::Pending(next)))
        })
    }

    // Pages from fetchers that do not bind themselves keep walking with the
    // fetcher that produced them.
    fn bind(mut self, fetcher: Arc<dyn PageFetcher<T>>) -> Self {
        self.fetch_next.get_or_insert(fetcher);
        self
    }

    fn next_request(&self) -> Option<NextRequest<T>> {
        if !self.has_next() {
            return None;
        }
        self.fetch_next
            .as_ref()
            .map(|fetcher| (self.next_page_parameters(), Arc::clone(fetcher)))
    }
}

impl<T: Send + 'static + std::fmt::Debug> std::fmt::Debug for PaginatedCollection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedCollection")
            .field("items", &self.items)
            .field("metadata", &self.metadata)
            .field("request_parameters", &self.request_parameters)
            .field("has_fetcher", &self.fetch_next.is_some())
            .finish()
    }
}

type NextRequest<T> = (RequestParameters, Arc<dyn PageFetcher<T>>);

enum Walk<T: Send + 'static> {
    Ready(PaginatedCollection<T>),
    Pending(Option<NextRequest<T>>),
}

/// Description of a list call: which transport, which path, which
/// interceptors. Parameters are supplied per page.
#[derive(Clone)]
pub struct ListRequest {
    transport: Arc<dyn Transport>,
    path: String,
    interceptors: Arc<[Interceptor]>,
}

impl ListRequest {
    pub fn new(transport: Arc<dyn Transport>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
            interceptors: Arc::from(Vec::new()),
        }
    }

    pub fn with_interceptors(mut self, interceptors: impl IntoIterator<Item = Interceptor>) -> Self {
        self.interceptors = interceptors.into_iter().collect();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn interceptors(&self) -> &[Interceptor] {
        &self.interceptors
    }

    /// Fetch one page. The returned cursor re-uses this request for `next()`.
    pub async fn page<T>(&self, params: RequestParameters) -> Result<PaginatedCollection<T>, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let envelope =
            verbs::get::<Vec<T>, _>(&*self.transport, &self.path, &params, &self.interceptors).await?;
        let fetcher: Arc<dyn PageFetcher<T>> = Arc::new(self.clone());
        Ok(PaginatedCollection::from_envelope(envelope, params, Some(fetcher)))
    }

    /// Every item of every page, starting at the page in `params`.
    pub async fn all<T>(&self, params: RequestParameters) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned + Send + 'static,
    {
        invoke_request_all::<T, _>(self, params).await
    }
}

impl std::fmt::Debug for ListRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListRequest")
            .field("path", &self.path)
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T> PageFetcher<T> for ListRequest
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, params: RequestParameters) -> Result<PaginatedCollection<T>, Error> {
        self.page(params).await
    }
}

/// GET one page of `path` as a cursor.
pub async fn get_paginated<T>(
    transport: Arc<dyn Transport>,
    path: &str,
    params: RequestParameters,
    interceptors: &[Interceptor],
) -> Result<PaginatedCollection<T>, Error>
where
    T: DeserializeOwned + Send + 'static,
{
    ListRequest::new(transport, path)
        .with_interceptors(interceptors.iter().cloned())
        .page(params)
        .await
}

/// Fetch every page in order and concatenate the items.
///
/// Starts at the page in `params` (page 1 when unset) and stops once the
/// current page reaches `total_pages`. Any failure aborts the walk and
/// discards what was collected.
#[instrument(name = "connection.invoke_request_all", skip_all)]
pub async fn invoke_request_all<T, F>(fetcher: &F, params: RequestParameters) -> Result<Vec<T>, Error>
where
    T: Send + 'static,
    F: PageFetcher<T> + ?Sized,
{
    let mut params = match params.requested_page() {
        Some(_) => params,
        None => params.page(1),
    };
    let mut items = Vec::new();

    loop {
        let page = fetcher.fetch_page(params).await?;
        let meta = *page.metadata();
        debug!(
            current_page = meta.current_page,
            total_pages = meta.total_pages,
            items = page.items().len(),
            "fetched page"
        );

        let next = page.has_next().then(|| page.next_page_parameters());
        items.extend(page.into_items());
        match next {
            Some(next) => params = next,
            None => break,
        }
    }

    Ok(items)
}
