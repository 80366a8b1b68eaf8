use std::time::{Duration, Instant};

use crate::error::SearchError;
use crate::search::debounce::Debouncer;
use crate::search::model::Photo;

pub const SEARCH_FAILED_MESSAGE: &str = "Error fetching images. Please try again later.";
pub const NO_RESULTS_MESSAGE: &str = "No images found. Try a different search!";
pub const IDLE_MESSAGE: &str = "Type a query to search for photos.";

/// A search the view should dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: String,
}

/// What the message line under the search box shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchStatus {
    Loading,
    Error(&'static str),
    /// A query was made and nothing matched
    Empty,
    /// Nothing typed and nothing shown yet
    Idle,
    Results(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResultAction {
    Select(String),
    Download(String),
}

/// The two buttons under a result tile: select hands over the display URL,
/// download fetches the full-resolution one.
pub fn tile_actions(photo: &Photo) -> [ResultAction; 2] {
    [
        ResultAction::Select(photo.urls.regular.clone()),
        ResultAction::Download(photo.urls.full.clone()),
    ]
}

/// Search-view state, independent of egui.
pub struct SearchState {
    query: String,
    results: Vec<Photo>,
    loading: bool,
    error: Option<&'static str>,
    debouncer: Debouncer<String>,
    next_seq: u64,
    latest: Option<u64>,
}

impl SearchState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            loading: false,
            error: None,
            debouncer: Debouncer::new(debounce),
            next_seq: 0,
            latest: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Photo] {
        &self.results
    }

    /// Whether the manual search button is enabled.
    pub fn can_search(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Record an edit of the query box and restart the debounce timer.
    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        self.query = query.into();
        if self.can_search() {
            self.debouncer.schedule(self.query.trim().to_string(), now);
        } else {
            self.debouncer.cancel();
        }
    }

    /// Fire the debounced search once its quiet period has passed.
    pub fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        let query = self.debouncer.poll(now)?;
        Some(self.issue(query))
    }

    pub fn search_now(&mut self) -> Option<SearchRequest> {
        if !self.can_search() {
            return None;
        }
        self.debouncer.cancel();
        let query = self.query.trim().to_string();
        Some(self.issue(query))
    }

    /// How long until [`poll`](Self::poll) may produce a request.
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        self.debouncer.remaining(now)
    }

    fn issue(&mut self, query: String) -> SearchRequest {
        self.next_seq += 1;
        self.latest = Some(self.next_seq);
        self.loading = true;
        self.error = None;
        SearchRequest {
            seq: self.next_seq,
            query,
        }
    }

    /// Apply the outcome of request `seq`. Responses to superseded requests
    /// are dropped; returns whether this one was applied.
    pub fn finish(&mut self, seq: u64, outcome: Result<Vec<Photo>, SearchError>) -> bool {
        if self.latest != Some(seq) {
            tracing::debug!("Dropping response to superseded search #{}", seq);
            return false;
        }
        self.loading = false;
        match outcome {
            Ok(photos) => {
                self.results = photos;
                self.error = None;
            }
            Err(e) => {
                tracing::error!("Error fetching images: {}", e);
                self.error = Some(SEARCH_FAILED_MESSAGE);
            }
        }
        true
    }

    /// Request `seq` ended without a response, e.g. its worker panicked.
    /// Treated as a failure if it was the newest request.
    pub fn abandon(&mut self, seq: u64) -> bool {
        if self.latest != Some(seq) {
            return false;
        }
        tracing::error!("Search #{} ended without a response", seq);
        self.loading = false;
        self.error = Some(SEARCH_FAILED_MESSAGE);
        true
    }

    /// Loading beats error, error beats empty, empty beats results.
    pub fn status(&self) -> SearchStatus {
        if self.loading {
            SearchStatus::Loading
        } else if let Some(message) = self.error {
            SearchStatus::Error(message)
        } else if self.results.is_empty() {
            if self.can_search() {
                SearchStatus::Empty
            } else {
                SearchStatus::Idle
            }
        } else {
            SearchStatus::Results(self.results.len())
        }
    }
}
