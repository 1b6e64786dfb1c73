use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::normalizer::{normalize, EmployeeRiskView};
use super::query::{
    ApplyOutcome, ListFilters, ListingState, Page, PageSize, PagedFilteredQuery, QueryState,
};
use super::{DashboardSummary, Department};
use crate::api::{bounded, BurnoutApi, ClientError};
use crate::config::ControllerSettings;

/// Orchestrates the main employee risk listing.
pub struct DashboardController<A> {
    api: Arc<A>,
    settings: ControllerSettings,
    token: CancellationToken,
    state: Mutex<DashboardState>,
}

struct DashboardState {
    query: PagedFilteredQuery<EmployeeRiskView>,
    summary: Option<DashboardSummary>,
    departments: Vec<Department>,
}

/// Everything a view needs to render the listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub items: Vec<EmployeeRiskView>,
    pub total_count: u64,
    pub page_index: usize,
    pub page_size: PageSize,
    pub total_pages: usize,
    pub filters: ListFilters,
    pub listing_state: ListingState,
    pub is_loaded: bool,
    pub last_error: Option<String>,
    pub summary: Option<DashboardSummary>,
    pub departments: Vec<Department>,
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("page {requested} is out of range; the listing has {total_pages} page(s)")]
    PageOutOfRange { requested: usize, total_pages: usize },
}

impl<A> DashboardController<A>
where
    A: BurnoutApi,
{
    pub fn new(api: Arc<A>, settings: ControllerSettings) -> Self {
        Self {
            api,
            settings,
            token: CancellationToken::new(),
            state: Mutex::new(DashboardState {
                query: PagedFilteredQuery::new(settings.page_size),
                summary: None,
                departments: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches the page described by the current query state.
    ///
    /// An overlapping call that issued later wins; this call then returns the
    /// snapshot as it stands without publishing its own response.
    pub async fn refresh(&self) -> Result<DashboardSnapshot, DashboardError> {
        loop {
            let ticket = self.state().query.issue();
            debug!(
                generation = ticket.generation(),
                page = ticket.request.page,
                "dashboard fetch issued"
            );

            let outcome = bounded(
                &self.token,
                self.settings.request_timeout,
                self.api.dashboard(&ticket.request),
            )
            .await;

            let mut state = self.state();
            let response = match outcome {
                Ok(response) => response,
                Err(err) => {
                    if state.query.fail(&ticket, &err) {
                        warn!(error = %err, "dashboard fetch failed; keeping previous page");
                    }
                    return Err(err.into());
                }
            };

            let page = Page {
                items: response.employees.iter().map(normalize).collect(),
                total_count: response.total,
            };
            match state.query.apply(&ticket, page) {
                ApplyOutcome::Published => {
                    state.summary = response.summary;
                    info!(
                        total = response.total,
                        page = ticket.request.page,
                        "dashboard page published"
                    );
                    return Ok(state.snapshot());
                }
                ApplyOutcome::Superseded => {
                    debug!(
                        generation = ticket.generation(),
                        "discarding superseded dashboard response"
                    );
                    return Ok(state.snapshot());
                }
                ApplyOutcome::SteppedBack => {
                    debug!(
                        page_index = state.query.state().page_index(),
                        "dashboard page emptied; stepping back"
                    );
                }
            }
        }
    }

    /// Populates the department filter options.
    pub async fn load_departments(&self) -> Result<Vec<Department>, DashboardError> {
        let departments = bounded(
            &self.token,
            self.settings.request_timeout,
            self.api.departments(),
        )
        .await?;
        self.state().departments = departments.clone();
        Ok(departments)
    }

    pub async fn set_department(
        &self,
        department: Option<String>,
    ) -> Result<DashboardSnapshot, DashboardError> {
        self.apply_query(|state| state.set_department(department)).await
    }

    pub async fn set_status(
        &self,
        status: Option<String>,
    ) -> Result<DashboardSnapshot, DashboardError> {
        self.apply_query(|state| state.set_status(status)).await
    }

    pub async fn set_trend(&self, trend: Option<String>) -> Result<DashboardSnapshot, DashboardError> {
        self.apply_query(|state| state.set_trend(trend)).await
    }

    pub async fn clear_filters(&self) -> Result<DashboardSnapshot, DashboardError> {
        self.apply_query(QueryState::clear_filters).await
    }

    pub async fn set_page_size(
        &self,
        page_size: PageSize,
    ) -> Result<DashboardSnapshot, DashboardError> {
        self.apply_query(|state| state.set_page_size(page_size)).await
    }

    /// Moves to a 0-based page. Once a page has loaded, indexes past the
    /// last page are rejected without a request.
    pub async fn set_page(&self, page_index: usize) -> Result<DashboardSnapshot, DashboardError> {
        {
            let state = self.state();
            let total_pages = state.query.total_pages();
            if state.query.is_loaded() && page_index > 0 && page_index >= total_pages {
                return Err(DashboardError::PageOutOfRange {
                    requested: page_index,
                    total_pages,
                });
            }
        }
        self.apply_query(|state| state.set_page_index(page_index)).await
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.state().snapshot()
    }

    /// Applies several query edits at once and fetches the result. A page
    /// index past the end steps back to the last page that has rows.
    pub async fn apply_query<F>(&self, change: F) -> Result<DashboardSnapshot, DashboardError>
    where
        F: FnOnce(&mut QueryState) -> bool,
    {
        self.state().query.update(change);
        self.refresh().await
    }
}

impl DashboardState {
    fn snapshot(&self) -> DashboardSnapshot {
        let query = &self.query;
        DashboardSnapshot {
            items: query.page().items.clone(),
            total_count: query.page().total_count,
            page_index: query.state().page_index(),
            page_size: query.state().page_size(),
            total_pages: query.total_pages(),
            filters: query.state().filters().clone(),
            listing_state: query.listing_state(),
            is_loaded: query.is_loaded(),
            last_error: query.last_error().map(str::to_string),
            summary: self.summary,
            departments: self.departments.clone(),
        }
    }
}

impl<A> Drop for DashboardController<A> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
