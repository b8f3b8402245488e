/// Search and autocomplete controller for the detail listing.
///
/// Owns the query, the current result list and the suggestion dropdown.
/// Autocomplete is debounced through a single timer slot and every request
/// carries a sequence number; a response whose number is no longer the
/// latest is dropped. Committed searches are not sequenced: the last one to
/// resolve wins.
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use detail_common::api::DetailApi;
use detail_common::model::Detail;

use crate::config::Config;
use crate::timer::TimerSlot;

const LOAD_FAILED: &str = "Failed to load details.";
const SEARCH_FAILED: &str = "Search failed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPhase {
    /// No filter applied; the full listing is shown.
    Idle,
    /// A listing or search request is in flight.
    Searching,
    /// Filtered results are shown.
    Results,
    /// The last listing or search failed.
    Error(String),
}

/// Read-only copy of the controller state, taken for rendering.
#[derive(Debug, Clone)]
pub struct SearchSnapshot {
    pub phase: SearchPhase,
    pub query: String,
    pub details: Vec<Detail>,
    pub suggestions: Vec<String>,
    pub suggestions_visible: bool,
    pub focused: bool,
    /// An autocomplete timer is armed and has not fired yet.
    pub autocomplete_pending: bool,
}

struct SearchState {
    phase: SearchPhase,
    query: String,
    details: Vec<Detail>,
    suggestions: Vec<String>,
    suggestions_visible: bool,
    focused: bool,
    autocomplete_seq: u64,
    debounce: TimerSlot,
    blur_hide: TimerSlot,
}

impl SearchState {
    /// Drop any pending autocomplete and make in-flight responses stale.
    fn invalidate_autocomplete(&mut self) {
        self.debounce.cancel();
        self.autocomplete_seq += 1;
    }
}

#[derive(Clone)]
pub struct SearchController {
    api: Arc<dyn DetailApi>,
    config: Config,
    state: Arc<Mutex<SearchState>>,
}

impl SearchController {
    pub fn new(api: Arc<dyn DetailApi>, config: Config) -> Self {
        let state = SearchState {
            phase: SearchPhase::Idle,
            query: String::new(),
            details: Vec::new(),
            suggestions: Vec::new(),
            suggestions_visible: false,
            focused: false,
            autocomplete_seq: 0,
            debounce: TimerSlot::default(),
            blur_hide: TimerSlot::default(),
        };
        Self {
            api,
            config,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn snapshot(&self) -> SearchSnapshot {
        let state = self.state.lock().await;
        SearchSnapshot {
            phase: state.phase.clone(),
            query: state.query.clone(),
            details: state.details.clone(),
            suggestions: state.suggestions.clone(),
            suggestions_visible: state.suggestions_visible,
            focused: state.focused,
            autocomplete_pending: state.debounce.is_pending(),
        }
    }

    /// Load the unfiltered listing.
    pub async fn load_all(&self) {
        self.state.lock().await.phase = SearchPhase::Searching;

        let result = self.api.list_details().await;

        let mut state = self.state.lock().await;
        match result {
            Ok(details) => {
                info!(count = details.len(), "loaded detail listing");
                state.details = details;
                state.phase = SearchPhase::Idle;
            }
            Err(e) => {
                warn!(kind = %e.kind, status = e.status, error = %e, "failed to load details");
                state.phase = SearchPhase::Error(e.display_message(LOAD_FAILED));
            }
        }
    }

    /// Keystroke in the search field. Typing implies focus.
    ///
    /// Queries shorter than the autocomplete threshold clear the dropdown
    /// immediately; longer ones (re)arm the debounce timer.
    pub async fn input(&self, text: &str) {
        let mut state = self.state.lock().await;
        state.query = text.to_string();
        state.focused = true;
        state.blur_hide.cancel();
        state.invalidate_autocomplete();

        let trimmed = text.trim();
        if trimmed.chars().count() < self.config.min_autocomplete_chars {
            state.suggestions.clear();
            state.suggestions_visible = false;
            return;
        }

        let seq = state.autocomplete_seq;
        let query = trimmed.to_string();
        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.state);
        state.debounce.arm(self.config.debounce, async move {
            debug!(query = %query, seq, "requesting autocomplete");
            let suggestions = api.autocomplete(&query).await;

            let mut state = shared.lock().await;
            if state.autocomplete_seq != seq {
                debug!(
                    query = %query,
                    seq,
                    latest = state.autocomplete_seq,
                    "dropping stale autocomplete response"
                );
                return;
            }
            state.suggestions_visible = state.focused && !suggestions.is_empty();
            state.suggestions = suggestions;
        });
    }

    /// Pick an entry from the dropdown: the query becomes its text and a full
    /// search for exactly that text is issued.
    pub async fn select_suggestion(&self, text: &str) {
        {
            let mut state = self.state.lock().await;
            state.invalidate_autocomplete();
            state.query = text.to_string();
            state.suggestions.clear();
            state.suggestions_visible = false;
        }
        self.run_search(text).await;
    }

    /// Commit the current query. A blank query falls back to the full listing.
    pub async fn submit(&self) {
        let query = {
            let mut state = self.state.lock().await;
            state.invalidate_autocomplete();
            state.suggestions_visible = false;
            state.query.trim().to_string()
        };

        if query.is_empty() {
            self.load_all().await;
        } else {
            self.run_search(&query).await;
        }
    }

    /// Reset the query and dropdown, then reload the full listing.
    pub async fn clear(&self) {
        {
            let mut state = self.state.lock().await;
            state.invalidate_autocomplete();
            state.query.clear();
            state.suggestions.clear();
            state.suggestions_visible = false;
        }
        self.load_all().await;
    }

    pub async fn focus(&self) {
        let mut state = self.state.lock().await;
        state.focused = true;
        state.blur_hide.cancel();
        if !state.suggestions.is_empty() {
            state.suggestions_visible = true;
        }
    }

    /// Losing focus hides the dropdown only after the grace delay, so a
    /// selection made in the meantime is processed before the hide lands.
    pub async fn blur(&self) {
        let mut state = self.state.lock().await;
        state.focused = false;
        let shared = Arc::clone(&self.state);
        state.blur_hide.arm(self.config.blur_grace, async move {
            let mut state = shared.lock().await;
            if !state.focused {
                state.suggestions_visible = false;
            }
        });
    }

    async fn run_search(&self, query: &str) {
        self.state.lock().await.phase = SearchPhase::Searching;

        let result = self.api.search_details(query).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(details) => {
                info!(query, count = details.len(), "search complete");
                state.details = details;
                state.phase = SearchPhase::Results;
            }
            Err(e) => {
                warn!(query, kind = %e.kind, status = e.status, error = %e, "search failed");
                state.phase = SearchPhase::Error(e.display_message(SEARCH_FAILED));
            }
        }
    }
}
