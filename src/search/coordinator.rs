//! Search state machine.
//!
//! The coordinator owns the current [`SearchParams`] and hands out a
//! [`FetchTicket`] whenever they change. Callers run the fetch however they
//! like and report back with [`SearchCoordinator::complete`]; only the most
//! recently issued ticket is committed, so a slow earlier request can never
//! overwrite newer state.

use crate::search::pagination::{page_count, PageSelection};
use crate::search::{SearchError, SearchPage, SearchParams, MAX_PER_PAGE};

pub type TicketId = u64;

/// A fetch the caller should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: TicketId,
    pub params: SearchParams,
    pub per_page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Empty keyword, nothing searched
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug)]
pub struct SearchCoordinator {
    per_page: u32,
    params: SearchParams,
    phase: SearchPhase,
    result: Option<SearchPage>,
    /// Keyword `result` was fetched for
    result_keyword: String,
    error_message: Option<String>,
    last_issued: TicketId,
}

impl SearchCoordinator {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            params: SearchParams::default(),
            phase: SearchPhase::Idle,
            result: None,
            result_keyword: String::new(),
            error_message: None,
            last_issued: 0,
        }
    }

    /// The debounced keyword changed. Always starts again from page 1.
    ///
    /// An empty keyword clears results and errors without a request, and
    /// invalidates anything still in flight.
    pub fn keyword_settled(&mut self, keyword: &str) -> Option<FetchTicket> {
        let params = SearchParams::first_page(keyword);

        if params.is_empty() {
            tracing::debug!("keyword cleared");
            self.params = params;
            self.last_issued += 1;
            self.phase = SearchPhase::Idle;
            self.result = None;
            self.error_message = None;
            return None;
        }

        Some(self.issue(params))
    }

    /// A page link was selected (zero-based index); keeps the keyword.
    pub fn select_page(&mut self, selection: PageSelection) -> Option<FetchTicket> {
        if self.params.is_empty() {
            return None;
        }

        if self.result.is_some() && self.current_result().is_none() {
            tracing::debug!(index = selection.index, "ignoring page selection while a new keyword loads");
            return None;
        }

        let known_pages = self.page_count();
        if self.current_result().is_some() && selection.index >= known_pages {
            tracing::debug!(index = selection.index, known_pages, "ignoring out of range page");
            return None;
        }

        let params = self.params.with_page(selection.page_number());
        Some(self.issue(params))
    }

    /// "Back to page 1": clear the error and refetch the first page.
    pub fn reset(&mut self) -> Option<FetchTicket> {
        self.error_message = None;
        if self.params.is_empty() {
            self.phase = SearchPhase::Idle;
            return None;
        }

        let params = self.params.with_page(1);
        Some(self.issue(params))
    }

    /// Report the outcome of ticket `id`.
    ///
    /// Returns `false` (and changes nothing) when a newer ticket has been
    /// issued since.
    pub fn complete(&mut self, id: TicketId, outcome: Result<SearchPage, SearchError>) -> bool {
        if id != self.last_issued || self.phase != SearchPhase::Loading {
            tracing::debug!(ticket = id, latest = self.last_issued, "discarding stale search response");
            return false;
        }

        match outcome {
            Ok(page) => {
                self.phase = SearchPhase::Success;
                self.result = Some(page);
                self.result_keyword = self.params.keyword.clone();
                self.error_message = None;
            }
            Err(err) if !err.is_user_visible() => {
                self.phase = SearchPhase::Idle;
                self.result = None;
            }
            Err(err) => {
                tracing::debug!(error = %err, "search failed");
                self.phase = SearchPhase::Error;
                self.result = None;
                self.error_message = Some(err.to_string());
            }
        }
        true
    }

    fn issue(&mut self, params: SearchParams) -> FetchTicket {
        self.last_issued += 1;
        self.params = params.clone();
        self.phase = SearchPhase::Loading;
        self.error_message = None;

        tracing::debug!(
            ticket = self.last_issued,
            keyword = %params.keyword,
            page = params.page,
            "issuing search"
        );

        FetchTicket {
            id: self.last_issued,
            params,
            per_page: self.per_page,
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn result(&self) -> Option<&SearchPage> {
        self.result.as_ref()
    }

    /// The held result, only while it belongs to the current keyword.
    ///
    /// Right after a keyword change the previous keyword's page stays on
    /// screen until the new one arrives; it must not drive paging.
    pub fn current_result(&self) -> Option<&SearchPage> {
        self.result
            .as_ref()
            .filter(|_| self.result_keyword == self.params.keyword)
    }

    /// Error to display; never shown together with results
    pub fn error_message(&self) -> Option<&str> {
        match self.phase {
            SearchPhase::Error => self.error_message.as_deref(),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Loading
    }

    /// Pages available for the current result, 0 without one
    pub fn page_count(&self) -> usize {
        self.current_result()
            .map_or(0, |r| page_count(r.total_count, self.per_page))
    }

    /// Zero-based index of the current page
    pub fn current_page_index(&self) -> usize {
        self.params.page.saturating_sub(1) as usize
    }
}
