//! Server-side paginated collections.

use std::marker::PhantomData;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use url::Url;

use crate::client::CanaryClient;
use crate::error::{CanaryError, Result};
use crate::resource::{ApiResource, Resource};

/// A lazy, once-through sequence over a resource's collection endpoint.
///
/// Pages are fetched on demand as the caller advances; nothing is requested
/// until the first [`try_next`](Self::try_next) or [`size`](Self::size)
/// call. Page numbers are 1-based on the wire. The sequence is finite,
/// bounded by the server-reported total and the optional client-side
/// [`limit`](Self::limit), and is not restartable: construct a new
/// collection to iterate again.
///
/// # Example
///
/// ```no_run
/// use canaryapi::{ApiResource, CanaryClient, Detection};
///
/// # async fn example() -> canaryapi::Result<()> {
/// let client = CanaryClient::from_env()?;
/// let mut detections = Detection::all(&client).limit(10);
/// while let Some(mut detection) = detections.try_next().await? {
///     println!("{}", detection.headline().await?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Collection<T> {
    client: CanaryClient,
    /// Explicit endpoint override, used for nested collections reachable
    /// only through an embedded URL. `None` means the kind's default path.
    url: Option<Url>,
    since: Option<DateTime<Utc>>,
    limit: Option<u64>,

    // Cursor state. `current_page` is `None` until the first page load;
    // `total` is the server-reported item count, known from then on.
    current_page: Option<u32>,
    page_items: Vec<Value>,
    page_pos: usize,
    overall_pos: u64,
    total: Option<u64>,

    marker: PhantomData<fn() -> T>,
}

impl<T: ApiResource> Collection<T> {
    /// Collection over the kind's default endpoint.
    pub fn new(client: CanaryClient) -> Self {
        Self::with_endpoint(client, None)
    }

    /// Collection over an explicit absolute URL, e.g. a detection's
    /// embedded indicators URL.
    pub fn at_url(client: CanaryClient, url: Url) -> Self {
        Self::with_endpoint(client, Some(url))
    }

    fn with_endpoint(client: CanaryClient, url: Option<Url>) -> Self {
        Self {
            client,
            url,
            since: None,
            limit: None,
            current_page: None,
            page_items: Vec::new(),
            page_pos: 0,
            overall_pos: 0,
            total: None,
            marker: PhantomData,
        }
    }

    /// Only return items newer than the given time. Sent to the server as
    /// the `since` query parameter on every page request.
    ///
    /// Must be set before iteration begins. Note the protocol has no
    /// snapshot cursor: if the server's sort order changes between page
    /// fetches, a filtered iteration may skip or repeat items.
    #[must_use]
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Cap the number of items the sequence yields. Client-side only; does
    /// not affect [`size`](Self::size). Must be set before iteration
    /// begins.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Total number of items in the collection as reported by the server,
    /// unaffected by [`limit`](Self::limit).
    ///
    /// Loads page 1 as a side effect if no page has been loaded yet.
    pub async fn size(&mut self) -> Result<u64> {
        match self.total {
            Some(total) => Ok(total),
            None => self.load_page(1).await,
        }
    }

    /// Number of items iteration will yield: `min(size, limit)` when a
    /// limit is set, else `size`. May load page 1, like
    /// [`size`](Self::size).
    pub async fn len(&mut self) -> Result<u64> {
        let size = self.size().await?;
        Ok(match self.limit {
            Some(limit) => size.min(limit),
            None => size,
        })
    }

    /// Advance the sequence, fetching the next page from the server when
    /// the current one is exhausted. Returns `Ok(None)` once the sequence
    /// has ended; items are yielded in server page order as full
    /// (non-snippet) resources.
    ///
    /// A page fetch failure propagates as a transport error and leaves the
    /// cursor unchanged, so the sequence should be treated as terminated.
    pub async fn try_next(&mut self) -> Result<Option<T>> {
        // First call: load page 1.
        if self.current_page.is_none() {
            self.load_page(1).await?;
        }

        // We hit the client-side limit.
        if let Some(limit) = self.limit {
            if self.overall_pos >= limit {
                return Ok(None);
            }
        }

        // We ran out of items.
        if self.overall_pos >= self.total.unwrap_or(0) {
            return Ok(None);
        }

        // Current page exhausted: fetch the next one.
        if self.page_pos >= self.page_items.len() {
            let next_page = self.current_page.map_or(1, |page| page + 1);
            self.load_page(next_page).await?;
        }

        let raw = self
            .page_items
            .get(self.page_pos)
            .cloned()
            .ok_or_else(|| CanaryError::MalformedResponse {
                kind: T::KIND,
                reason: "server returned fewer items than meta.total_items".to_string(),
            })?;
        let resource = Resource::full(self.client.clone(), T::KIND, raw)?;

        self.overall_pos += 1;
        self.page_pos += 1;
        Ok(Some(T::from_resource(resource)))
    }

    /// Drain the remainder of the sequence into a `Vec`.
    pub async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }

    fn endpoint(&self) -> Result<Url> {
        match &self.url {
            Some(url) => Ok(url.clone()),
            None => self.client.join(&T::path()),
        }
    }

    fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(since) = self.since {
            query.push((
                "since".to_string(),
                since.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
        query
    }

    /// Fetch one page and install it as the current cursor position.
    /// State is only touched after a successful fetch, so a failed load
    /// leaves the collection exactly as it was. Returns the server total.
    async fn load_page(&mut self, page: u32) -> Result<u64> {
        let url = self.endpoint()?;
        tracing::debug!(kind = T::KIND, page, url = %url, "loading page");
        let raw = self.client.get_page(&url, &self.query(), page).await?;

        self.current_page = Some(page);
        self.page_items = raw.items;
        self.page_pos = 0;
        self.total = Some(raw.total_items);
        Ok(raw.total_items)
    }
}
