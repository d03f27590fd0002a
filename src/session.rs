//! Browse state for a list view: current mode, paging cursor, accumulated
//! items, and the single in-flight guard that rejects overlapping fetches.
//!
//! State transitions are pure so they can be tested without a network;
//! [`BrowseSession::fetch_next`] is the only async entry point and drives
//! exactly one request through the client per call.

use crate::client::SankaClient;
use crate::models::ListItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowseMode {
    #[default]
    Latest,
    Trending,
    Recommend,
    Search,
}

/// The next page the session wants fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Latest(u16),
    Popular,
    Recommend,
    Search(String),
}

#[derive(Debug)]
pub struct BrowseSession {
    mode: BrowseMode,
    page: u16,
    query: String,
    items: Vec<ListItem>,
    exhausted: bool,
    loading: bool,
}

impl Default for BrowseSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowseSession {
    pub fn new() -> Self {
        Self {
            mode: BrowseMode::Latest,
            page: 1,
            query: String::new(),
            items: Vec::new(),
            exhausted: false,
            loading: false,
        }
    }

    pub fn mode(&self) -> BrowseMode {
        self.mode
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Switches mode and resets accumulated state. Re-selecting the current
    /// mode is a no-op, except for Search which restarts with its query.
    pub fn set_mode(&mut self, mode: BrowseMode) {
        if mode == self.mode && mode != BrowseMode::Search {
            return;
        }

        self.mode = mode;
        if mode != BrowseMode::Search {
            self.query.clear();
        }
        self.reset();
    }

    /// Enters search mode with a fresh query.
    pub fn set_query(&mut self, query: &str) {
        self.mode = BrowseMode::Search;
        self.query = query.trim().to_owned();
        self.reset();
    }

    /// Claims the in-flight slot and returns the request to issue. `None`
    /// while a fetch is outstanding, when paging is exhausted, or when search
    /// mode has no query yet.
    pub fn begin(&mut self) -> Option<PageRequest> {
        if self.loading || self.exhausted {
            return None;
        }

        let request = match self.mode {
            BrowseMode::Latest => PageRequest::Latest(self.page),
            BrowseMode::Trending => PageRequest::Popular,
            BrowseMode::Recommend => PageRequest::Recommend,
            BrowseMode::Search => {
                if self.query.is_empty() {
                    return None;
                }
                PageRequest::Search(self.query.clone())
            }
        };

        self.loading = true;
        Some(request)
    }

    /// Appends one fetched page and advances the cursor. An empty page, or
    /// any single-shot mode, closes paging.
    pub fn apply_page(&mut self, page_items: Vec<ListItem>) {
        self.loading = false;

        if page_items.is_empty() {
            self.exhausted = true;
            return;
        }

        self.items.extend(page_items);

        // Only the latest feed has paginated endpoints; the other modes are
        // one request per reset.
        match self.mode {
            BrowseMode::Latest => self.page += 1,
            _ => self.exhausted = true,
        }
    }

    /// Releases the in-flight slot after a failed fetch; paging state is
    /// untouched so the same page can be retried.
    pub fn fail(&mut self) {
        self.loading = false;
    }

    /// Drives one request through the client. Returns the number of items
    /// appended, zero when there was nothing to fetch.
    pub async fn fetch_next(&mut self, client: &SankaClient) -> anyhow::Result<usize> {
        let request = match self.begin() {
            Some(request) => request,
            None => return Ok(0),
        };

        let result = match &request {
            PageRequest::Latest(page) => client.latest(*page).await,
            PageRequest::Popular => client.popular().await,
            PageRequest::Recommend => client.recommend().await,
            PageRequest::Search(query) => client.search(query).await,
        };

        match result {
            Ok(page_items) => {
                let fetched = page_items.len();
                self.apply_page(page_items);
                Ok(fetched)
            }
            Err(err) => {
                self.fail();
                Err(err)
            }
        }
    }

    fn reset(&mut self) {
        self.page = 1;
        self.items.clear();
        self.exhausted = false;
    }
}
