//! Search-as-you-type debouncing
//!
//! The TUI polls [`SearchDebouncer::poll`] on every tick; a query is released
//! once it has been stable for the quiet period and is long enough.

use std::time::{Duration, Instant};

/// Default quiet period before a query fires
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Shortest query that is sent to the server
pub const SEARCH_MIN_CHARS: usize = 2;

/// Debounced search query
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    query: String,
    last_change: Option<Instant>,
    delay: Duration,
    min_chars: usize,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE, SEARCH_MIN_CHARS)
    }
}

impl SearchDebouncer {
    /// Create a debouncer with a quiet period and minimum query length
    pub const fn new(delay: Duration, min_chars: usize) -> Self {
        Self {
            query: String::new(),
            last_change: None,
            delay,
            min_chars,
        }
    }

    /// Current query text
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Whether the current query is too short to search
    pub fn is_too_short(&self) -> bool {
        self.query.trim().chars().count() < self.min_chars
    }

    /// Replace the query, restarting the quiet period
    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        self.query = query.into();
        self.last_change = Some(now);
    }

    /// Append a character
    pub fn push(&mut self, c: char, now: Instant) {
        self.query.push(c);
        self.last_change = Some(now);
    }

    /// Remove the last character
    pub fn pop(&mut self, now: Instant) {
        if self.query.pop().is_some() {
            self.last_change = Some(now);
        }
    }

    /// Forget the query and any pending search
    pub fn clear(&mut self) {
        self.query.clear();
        self.last_change = None;
    }

    /// Whether a change is waiting for its quiet period
    pub const fn is_pending(&self) -> bool {
        self.last_change.is_some()
    }

    /// Release the query once the quiet period has elapsed.
    ///
    /// Returns `None` while the user is still typing, and also consumes (and
    /// drops) a settled query that is shorter than the minimum.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let last_change = self.last_change?;
        if now.saturating_duration_since(last_change) < self.delay {
            return None;
        }

        self.last_change = None;
        if self.is_too_short() {
            return None;
        }
        Some(self.query.trim().to_string())
    }
}
