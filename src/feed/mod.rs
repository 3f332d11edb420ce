//! Verse feed: a paged, append-only list of verses with optimistic likes.
//!
//! The feed is a plain state machine and never touches the network itself.
//! Operations that need a round-trip hand back a request value
//! ([`PageRequest`], [`LikeRequest`]); the caller executes it and passes the
//! result to [`Feed::complete_load`] or [`Feed::complete_like`].
//!
//! Every request captures the feed's generation when it is issued. Changing
//! the source URL bumps the generation, so completions that belong to an
//! earlier query are recognised and dropped instead of overwriting the
//! current list. Generations come from a process-wide counter, so a feed
//! built to replace another never reuses a number the old one handed out.
//!
//! ```text
//!            set_url(non-empty)            success/failure
//!   Empty ─────────────────────▶ Loading ─────────────────▶ Loaded
//!     ▲                                                     │   ▲
//!     │ set_url(_)                       prefetch threshold │   │ page appended
//!     └──────────────────── (any state)                     ▼   │
//!                                                        LoadingMore
//! ```

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{PaginationMetadata, Verse, VersePage};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Remaining unseen verses at which the next page is requested
pub const DEFAULT_PREFETCH_THRESHOLD: usize = 2;

/// Coarse lifecycle of a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    /// No source and nothing to show
    Empty,
    /// First page in flight, nothing visible yet
    Loading,
    /// Verses visible, nothing in flight
    Loaded,
    /// Verses visible while the next page is in flight
    LoadingMore,
}

/// A page fetch the caller must perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Source URL without the page parameter
    pub url: String,
    /// 1-based page number
    pub page: u32,
    /// Append to the list instead of replacing it
    pub append: bool,
    generation: u64,
}

impl PageRequest {
    /// URL with the `page` query parameter attached
    pub fn page_url(&self) -> String {
        page_url(&self.url, self.page)
    }

    /// Feed generation this request was issued under
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// A like toggle that has been applied locally and must be sent to the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeRequest {
    /// Index the toggle was applied to
    pub index: usize,
    /// Id of the verse at that index
    pub verse_id: u64,
    /// `liked` value before the optimistic flip
    pub previous: bool,
    generation: u64,
}

impl LikeRequest {
    /// Value the verse shows until the server answers
    pub const fn liked(&self) -> bool {
        !self.previous
    }

    /// Feed generation this request was issued under
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened when a page result was handed back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was applied
    Applied {
        /// Number of verses the page contributed
        added: usize,
    },
    /// The fetch failed; the list is unchanged
    Failed {
        /// Failures in a row, including this one
        consecutive_failures: u32,
    },
    /// The result belonged to an earlier source and was dropped
    Stale,
}

/// What happened when a like result was handed back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    /// The server accepted the toggle
    Confirmed,
    /// The server rejected it and the optimistic flip was undone
    RolledBack {
        /// Index that was restored
        index: usize,
    },
    /// The verse is no longer in the list; nothing to restore
    Stale,
}

/// Backend operations a feed depends on
#[allow(async_fn_in_trait)]
pub trait VerseSource {
    /// Error returned by the backend
    type Error: Display;

    /// Fetch one page; `page_url` already carries the `page` parameter
    async fn fetch_page(&self, page_url: &str) -> Result<VersePage, Self::Error>;

    /// Flip the like state of a verse on the server
    async fn toggle_like(&self, verse_id: u64) -> Result<(), Self::Error>;
}

/// Point `feed` at `url` and keep paging until `max_pages` pages are in,
/// the source has no next page, or a fetch fails
pub async fn load_pages<S: VerseSource>(
    feed: &mut Feed,
    source: &S,
    url: &str,
    max_pages: usize,
) -> Vec<LoadOutcome> {
    let mut outcomes = Vec::new();
    let mut request = feed.set_url(url);

    while let Some(current) = request.take() {
        let result = source.fetch_page(&current.page_url()).await;
        let outcome = feed.complete_load(&current, result);
        outcomes.push(outcome);

        if !matches!(outcome, LoadOutcome::Applied { .. }) || outcomes.len() >= max_pages {
            break;
        }
        request = feed.on_visible_index_change(feed.verses().len().saturating_sub(1));
    }

    outcomes
}

/// Attach a `page` parameter, using `&` when the URL already has a query
pub fn page_url(url: &str, page: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}page={page}")
}

/// State of one verse feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    url: String,
    verses: Vec<Verse>,
    index: usize,
    requested_index: usize,
    current_page: u32,
    pagination: Option<PaginationMetadata>,
    loading: bool,
    generation: u64,
    prefetch_threshold: usize,
    consecutive_failures: u32,
}

impl Default for Feed {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Feed {
    /// Create an empty feed that opens at `requested_index` after each replace
    pub fn new(requested_index: usize) -> Self {
        Self {
            url: String::new(),
            verses: Vec::new(),
            index: 0,
            requested_index,
            current_page: 1,
            pagination: None,
            loading: false,
            generation: next_generation(),
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
            consecutive_failures: 0,
        }
    }

    /// Override the prefetch threshold
    pub const fn with_prefetch_threshold(mut self, threshold: usize) -> Self {
        self.prefetch_threshold = threshold;
        self
    }

    // ==================== Source ====================

    /// Point the feed at a new source, discarding everything it holds.
    ///
    /// Returns the first-page request when `url` is non-empty.
    pub fn set_url(&mut self, url: impl Into<String>) -> Option<PageRequest> {
        self.reset();
        self.url = url.into();
        let url = self.url.clone();
        self.load(&url, 1, false)
    }

    /// Show a fixed list of verses with no backing source
    pub fn set_verses(&mut self, verses: Vec<Verse>) {
        self.reset();
        self.url.clear();
        self.verses = verses;
        self.index = self.clamped(self.requested_index);
    }

    /// Re-fetch the current source from page 1.
    ///
    /// The failure streak survives, so repeated retries keep counting.
    pub fn reload(&mut self) -> Option<PageRequest> {
        if self.url.is_empty() {
            return None;
        }
        let failures = self.consecutive_failures;
        let url = self.url.clone();
        let request = self.set_url(url);
        self.consecutive_failures = failures;
        request
    }

    fn reset(&mut self) {
        self.generation = next_generation();
        self.verses.clear();
        self.index = 0;
        self.current_page = 1;
        self.pagination = None;
        self.loading = false;
        self.consecutive_failures = 0;
    }

    // ==================== Loading ====================

    /// Start fetching `page` of `url`.
    ///
    /// Returns `None` when the URL is empty or a fetch is already in flight.
    pub fn load(&mut self, url: &str, page: u32, append: bool) -> Option<PageRequest> {
        if url.is_empty() {
            return None;
        }
        if self.loading {
            tracing::debug!(url, page, "Page fetch already in flight, dropping request");
            return None;
        }

        self.loading = true;
        Some(PageRequest {
            url: url.to_string(),
            page,
            append,
            generation: self.generation,
        })
    }

    /// Hand back the result of a [`PageRequest`]
    pub fn complete_load<E: Display>(
        &mut self,
        request: &PageRequest,
        result: Result<VersePage, E>,
    ) -> LoadOutcome {
        if request.generation != self.generation {
            tracing::debug!(
                url = %request.url,
                page = request.page,
                "Dropping page from a previous source"
            );
            return LoadOutcome::Stale;
        }

        self.loading = false;

        match result {
            Ok(page) => {
                let added = page.verses.len();
                if request.append {
                    self.verses.extend(page.verses);
                } else {
                    self.verses = page.verses;
                    self.index = self.clamped(self.requested_index);
                }
                self.pagination = Some(page.pagination);
                self.current_page = request.page;
                self.consecutive_failures = 0;
                LoadOutcome::Applied { added }
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                tracing::warn!(url = %request.url, page = request.page, "Fetch verses failed: {e}");
                LoadOutcome::Failed {
                    consecutive_failures: self.consecutive_failures,
                }
            }
        }
    }

    // ==================== Navigation ====================

    /// Record the visible index, returning a next-page request when the
    /// reader is within the prefetch threshold of the end
    pub fn on_visible_index_change(&mut self, index: usize) -> Option<PageRequest> {
        self.index = self.clamped(index);

        let remaining = self.verses.len().saturating_sub(self.index + 1);
        if remaining > self.prefetch_threshold || self.loading {
            return None;
        }

        let pagination = self.pagination.as_ref()?;
        let next = pagination.next?;
        if self.current_page >= pagination.pages {
            return None;
        }

        let url = self.url.clone();
        self.load(&url, next, true)
    }

    /// Move to the next verse (stops at the last one)
    pub fn next(&mut self) -> Option<PageRequest> {
        if self.verses.is_empty() {
            return None;
        }
        self.on_visible_index_change(self.index + 1)
    }

    /// Move to the previous verse (stops at the first one)
    pub fn prev(&mut self) -> Option<PageRequest> {
        if self.verses.is_empty() {
            return None;
        }
        self.on_visible_index_change(self.index.saturating_sub(1))
    }

    fn clamped(&self, index: usize) -> usize {
        index.min(self.verses.len().saturating_sub(1))
    }

    // ==================== Likes ====================

    /// Flip `liked` on the verse at `index` right away.
    ///
    /// Returns `None` when there is no verse there or it has no id.
    pub fn toggle_like(&mut self, index: usize) -> Option<LikeRequest> {
        let verse = self.verses.get_mut(index)?;
        let verse_id = verse.id?;
        let previous = verse.liked;
        verse.liked = !previous;

        Some(LikeRequest {
            index,
            verse_id,
            previous,
            generation: self.generation,
        })
    }

    /// Hand back the result of a [`LikeRequest`], undoing its flip on failure.
    ///
    /// The server toggles, so a failed request is reverted by flipping the
    /// current value. Overlapping toggles on one verse stay in step with the
    /// server whatever order they fail in.
    pub fn complete_like<E: Display>(
        &mut self,
        request: &LikeRequest,
        result: Result<(), E>,
    ) -> LikeOutcome {
        let Err(e) = result else {
            return LikeOutcome::Confirmed;
        };

        tracing::warn!(verse_id = request.verse_id, "Toggle like failed: {e}");

        if request.generation != self.generation {
            return LikeOutcome::Stale;
        }

        let position = if self
            .verses
            .get(request.index)
            .is_some_and(|v| v.id == Some(request.verse_id))
        {
            Some(request.index)
        } else {
            self.verses
                .iter()
                .position(|v| v.id == Some(request.verse_id))
        };

        match position {
            Some(index) => {
                let verse = &mut self.verses[index];
                verse.liked = !verse.liked;
                LikeOutcome::RolledBack { index }
            }
            None => LikeOutcome::Stale,
        }
    }

    // ==================== Accessors ====================

    /// Current lifecycle phase
    pub fn phase(&self) -> FeedPhase {
        match (self.loading, self.verses.is_empty()) {
            (true, true) => FeedPhase::Loading,
            (true, false) => FeedPhase::LoadingMore,
            (false, true) if self.url.is_empty() => FeedPhase::Empty,
            (false, _) => FeedPhase::Loaded,
        }
    }

    /// Source URL (empty when showing fixed verses or nothing)
    pub fn url(&self) -> &str {
        &self.url
    }

    /// All verses fetched so far, in fetch order
    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    /// Visible index
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Visible verse
    pub fn current(&self) -> Option<&Verse> {
        self.verses.get(self.index)
    }

    /// Last page applied
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Pagination metadata of the last applied page
    pub const fn pagination(&self) -> Option<&PaginationMetadata> {
        self.pagination.as_ref()
    }

    /// Whether a page fetch is in flight
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Current generation
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Page fetch failures in a row
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Whether there is nothing to show and no source to fetch from
    pub fn shows_placeholder(&self) -> bool {
        self.url.is_empty() && self.verses.is_empty()
    }
}
