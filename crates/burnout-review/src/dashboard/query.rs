//! Paging and filtering state shared by the dashboard listing and the
//! pending-review queue.
//!
//! The UI-facing [`QueryState`] is 0-based; the backend pages from 1. The
//! translation happens exactly once, in [`QueryState::request`]. Every fetch
//! is stamped with a [`QueryTicket`] and only the ticket for the latest
//! generation may publish, so late responses for superseded queries are
//! dropped.

use std::fmt;

use serde::Serialize;

pub const ALLOWED_PAGE_SIZES: [u32; 4] = [5, 10, 25, 50];
const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PageSize(u32);

impl PageSize {
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE)
    }
}

impl TryFrom<u32> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if ALLOWED_PAGE_SIZES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidPageSize(value))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPageSize(pub u32);

impl fmt::Display for InvalidPageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page size {} is not one of {:?}",
            self.0, ALLOWED_PAGE_SIZES
        )
    }
}

impl std::error::Error for InvalidPageSize {}

/// Optional narrowing applied server-side. Blank values are stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListFilters {
    department: Option<String>,
    status: Option<String>,
    trend: Option<String>,
}

impl ListFilters {
    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn trend(&self) -> Option<&str> {
        self.trend.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.department.is_none() && self.status.is_none() && self.trend.is_none()
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryState {
    page_index: usize,
    page_size: PageSize,
    filters: ListFilters,
}

impl QueryState {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_index: 0,
            page_size,
            filters: ListFilters::default(),
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn filters(&self) -> &ListFilters {
        &self.filters
    }

    pub fn set_page_index(&mut self, page_index: usize) -> bool {
        let changed = self.page_index != page_index;
        self.page_index = page_index;
        changed
    }

    pub fn set_page_size(&mut self, page_size: PageSize) -> bool {
        if self.page_size == page_size {
            return false;
        }
        self.page_size = page_size;
        self.page_index = 0;
        true
    }

    pub fn set_department(&mut self, department: Option<String>) -> bool {
        let department = clean(department);
        Self::replace_filter(&mut self.filters.department, department, &mut self.page_index)
    }

    pub fn set_status(&mut self, status: Option<String>) -> bool {
        let status = clean(status);
        Self::replace_filter(&mut self.filters.status, status, &mut self.page_index)
    }

    pub fn set_trend(&mut self, trend: Option<String>) -> bool {
        let trend = clean(trend);
        Self::replace_filter(&mut self.filters.trend, trend, &mut self.page_index)
    }

    pub fn clear_filters(&mut self) -> bool {
        if self.filters.is_empty() {
            return false;
        }
        self.filters = ListFilters::default();
        self.page_index = 0;
        true
    }

    fn replace_filter(
        slot: &mut Option<String>,
        value: Option<String>,
        page_index: &mut usize,
    ) -> bool {
        if *slot == value {
            return false;
        }
        *slot = value;
        *page_index = 0;
        true
    }

    /// Backend request parameters for the current state.
    pub fn request(&self) -> PageRequest {
        PageRequest {
            page: u32::try_from(self.page_index)
                .unwrap_or(u32::MAX - 1)
                .saturating_add(1),
            page_size: self.page_size.get(),
            department: self.filters.department.clone(),
            status: self.filters.status.clone(),
            trend: self.filters.trend.clone(),
        }
    }
}

/// Wire-level page request. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    pub department: Option<String>,
    pub status: Option<String>,
    pub trend: Option<String>,
}

impl PageRequest {
    /// Query-string pairs. Absent filters are omitted, never sent empty.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        let filters = [
            ("department", &self.department),
            ("status", &self.status),
            ("trend", &self.trend),
        ];
        for (key, value) in filters {
            if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        pairs
    }

    /// Zero-based offset of the first row on this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

/// Client-side slicing for endpoints that return the whole collection.
pub fn paginate<T: Clone>(all: &[T], request: &PageRequest) -> Page<T> {
    let items = all
        .iter()
        .skip(request.offset())
        .take(request.page_size as usize)
        .cloned()
        .collect();
    Page {
        items,
        total_count: all.len() as u64,
    }
}

/// Stamp for one in-flight fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    generation: u64,
    pub request: PageRequest,
}

impl QueryTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Published,
    /// A newer query was issued after this ticket; the response was dropped.
    Superseded,
    /// The page came back empty past the first page; the index moved back
    /// and the caller must fetch again.
    SteppedBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingState {
    NotLoaded,
    Empty,
    Populated,
}

/// Published result of a paged, filtered list plus the state that produced it.
#[derive(Debug, Clone)]
pub struct PagedFilteredQuery<T> {
    state: QueryState,
    published: Option<QueryState>,
    generation: u64,
    page: Page<T>,
    loaded: bool,
    last_error: Option<String>,
}

impl<T> PagedFilteredQuery<T> {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            state: QueryState::new(page_size),
            published: None,
            generation: 0,
            page: Page::default(),
            loaded: false,
            last_error: None,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn page(&self) -> &Page<T> {
        &self.page
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn listing_state(&self) -> ListingState {
        match (self.loaded, self.page.items.is_empty()) {
            (false, _) => ListingState::NotLoaded,
            (true, true) => ListingState::Empty,
            (true, false) => ListingState::Populated,
        }
    }

    pub fn total_pages(&self) -> usize {
        let size = self.state.page_size.get() as u64;
        self.page.total_count.div_ceil(size) as usize
    }

    /// Mutates the query state; any effective change invalidates in-flight
    /// tickets.
    pub fn update<F>(&mut self, change: F) -> bool
    where
        F: FnOnce(&mut QueryState) -> bool,
    {
        let changed = change(&mut self.state);
        if changed {
            self.generation += 1;
        }
        changed
    }

    /// Starts a fetch for the current state.
    pub fn issue(&mut self) -> QueryTicket {
        self.generation += 1;
        QueryTicket {
            generation: self.generation,
            request: self.state.request(),
        }
    }

    pub fn is_current(&self, ticket: &QueryTicket) -> bool {
        ticket.generation == self.generation
    }

    pub fn apply(&mut self, ticket: &QueryTicket, page: Page<T>) -> ApplyOutcome {
        if !self.is_current(ticket) {
            return ApplyOutcome::Superseded;
        }

        let index = self.state.page_index;
        if page.items.is_empty() && index > 0 {
            let size = self.state.page_size.get() as u64;
            let last_index = page.total_count.div_ceil(size).saturating_sub(1) as usize;
            self.state.page_index = (index - 1).min(last_index);
            self.generation += 1;
            return ApplyOutcome::SteppedBack;
        }

        self.page = page;
        self.published = Some(self.state.clone());
        self.loaded = true;
        self.last_error = None;
        ApplyOutcome::Published
    }

    /// Records a failed fetch. The previous page stays visible and the state
    /// falls back to the one that produced it, so filters and page index
    /// always describe the rows on screen.
    pub fn fail(&mut self, ticket: &QueryTicket, error: &impl fmt::Display) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        if let Some(published) = &self.published {
            self.state.clone_from(published);
        }
        self.last_error = Some(error.to_string());
        true
    }

    /// Drops published rows locally, e.g. after a review leaves the queue.
    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.page.items.len();
        self.page.items.retain(keep);
        let removed = before - self.page.items.len();
        self.page.total_count = self.page.total_count.saturating_sub(removed as u64);
        removed
    }
}
