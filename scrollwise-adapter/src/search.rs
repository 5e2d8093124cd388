use std::fmt::Display;

use scrollwise::Debouncer;

/// Default quiet period before a typed query is issued.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

const SEARCH_FAILED: &str = "Search failed";

/// A query that became due. Hand it to the search backend and pass `seq` back to
/// [`DebouncedSearch::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: String,
}

/// Debounced query state for a search box.
///
/// Typing goes through [`Self::set_query`]; the host's tick calls [`Self::poll`] and runs
/// whatever request comes out. Only the result of the most recently issued request is kept.
#[derive(Debug)]
pub struct DebouncedSearch<R> {
    query: String,
    debouncer: Debouncer<String>,
    next_seq: u64,
    in_flight: Option<u64>,
    results: Option<R>,
    error: Option<String>,
}

impl<R> Default for DebouncedSearch<R> {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE_MS)
    }
}

impl<R> DebouncedSearch<R> {
    pub fn new(wait_ms: u64) -> Self {
        Self {
            query: String::new(),
            debouncer: Debouncer::new(wait_ms),
            next_seq: 0,
            in_flight: None,
            results: None,
            error: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> Option<&R> {
        self.results.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Updates the query text.
    ///
    /// A blank query clears results and error at once and nothing is scheduled. Any request
    /// already in flight is abandoned.
    pub fn set_query(&mut self, query: impl Into<String>, now_ms: u64) {
        self.query = query.into();
        if self.query.trim().is_empty() {
            self.debouncer.cancel();
            self.in_flight = None;
            self.results = None;
            self.error = None;
            return;
        }
        self.debouncer.call(self.query.clone(), now_ms);
    }

    /// Issues the pending query once it has been quiet for the debounce period.
    pub fn poll(&mut self, now_ms: u64) -> Option<SearchRequest> {
        let query = self.debouncer.poll(now_ms)?;
        self.next_seq += 1;
        let seq = self.next_seq;
        self.in_flight = Some(seq);
        self.error = None;
        swdebug!(seq, query = %query, "search issued");
        Some(SearchRequest { seq, query })
    }

    /// Applies a search outcome. Returns `false` for results of superseded requests.
    ///
    /// Errors are stored by their `Display` text; an empty message becomes "Search failed".
    pub fn complete<E: Display>(&mut self, seq: u64, result: Result<R, E>) -> bool {
        if self.in_flight != Some(seq) {
            swtrace!(seq, "stale search result dropped");
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(results) => self.results = Some(results),
            Err(err) => {
                let message = err.to_string();
                self.error = Some(if message.is_empty() {
                    SEARCH_FAILED.to_owned()
                } else {
                    message
                });
            }
        }
        true
    }

    pub fn dispose(&mut self) {
        self.debouncer.dispose();
        self.in_flight = None;
    }
}
