//! Lazy pagination over server-provided continuation links
//!
//! List routes return `{"value": [...], "@nextLink": "..."}` pages. The
//! continuation link carries `$skip`/`$top` cursor parameters which are
//! parsed by key name from the query string; parameter order within the
//! link is not guaranteed by the service.

use std::collections::VecDeque;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::core::errors::Result;

/// Pagination cursor extracted from a continuation link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageCursor {
    /// Offset into the full result set
    pub skip: u64,
    /// Page-size hint
    pub top: u64,
}

impl PageCursor {
    /// Parse `$skip` and `$top` out of a continuation URL's query string.
    ///
    /// Keys are matched by exact name; absent or unparsable values default
    /// to 0. An unparsable link yields the zero cursor.
    pub fn from_continuation(link: &str) -> Self {
        let Ok(url) = Url::parse(link) else {
            return Self::default();
        };

        let mut cursor = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "$skip" => cursor.skip = value.parse().unwrap_or(0),
                "$top" => cursor.top = value.parse().unwrap_or(0),
                _ => {}
            }
        }
        cursor
    }
}

/// One page of results plus the link to the next one, if any
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items of this page, in server order
    pub items: Vec<T>,
    /// Continuation link; `None` means this is the last page
    pub continuation: Option<String>,
}

/// Fetches pages on behalf of a [`Paginator`]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// The item type of the paged collection
    type Item: Send;

    /// Fetch the first page
    async fn first_page(&self) -> Result<Page<Self::Item>>;

    /// Fetch a subsequent page at the given cursor
    async fn next_page(&self, cursor: PageCursor) -> Result<Page<Self::Item>>;
}

enum PagerState {
    NotStarted,
    Active,
    Exhausted,
}

/// A lazy, forward-only, non-restartable sequence of paged items.
///
/// Page N+1 is fetched only once every item of page N has been consumed.
/// A fetch failure is yielded once; afterwards the sequence is exhausted.
/// `&mut self` on [`next`](Paginator::next) makes the single-consumer
/// contract explicit; share a paginator only behind external
/// synchronization.
pub struct Paginator<F: PageFetcher> {
    fetcher: F,
    buffer: VecDeque<F::Item>,
    continuation: Option<String>,
    state: PagerState,
}

impl<F: PageFetcher> Paginator<F> {
    /// Create a paginator; nothing is fetched until the first `next` call
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            buffer: VecDeque::new(),
            continuation: None,
            state: PagerState::NotStarted,
        }
    }

    /// Yield the next item, fetching the next page when the current one is
    /// drained. Returns `None` once the sequence is exhausted.
    pub async fn next(&mut self) -> Option<Result<F::Item>> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }

            let fetched = match self.state {
                PagerState::Exhausted => return None,
                PagerState::NotStarted => self.fetcher.first_page().await,
                PagerState::Active => match self.continuation.take() {
                    None => {
                        self.state = PagerState::Exhausted;
                        return None;
                    }
                    Some(link) => {
                        let cursor = PageCursor::from_continuation(&link);
                        debug!(skip = cursor.skip, top = cursor.top, "fetching next page");
                        self.fetcher.next_page(cursor).await
                    }
                },
            };

            match fetched {
                Ok(page) => {
                    self.buffer = page.items.into();
                    self.continuation = page.continuation;
                    self.state = PagerState::Active;
                }
                Err(e) => {
                    self.state = PagerState::Exhausted;
                    return Some(Err(e));
                }
            }
        }
    }

    /// Drain the remaining items into a vector, stopping at the first error
    pub async fn collect_all(mut self) -> Result<Vec<F::Item>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(items)
    }
}
