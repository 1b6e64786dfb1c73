use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::domain::{PendingReview, ReviewDetail, VerdictDraft};
use super::workflow::{Attempt, ReviewStage, ReviewState, ReviewWorkflow, WorkflowError};
use crate::api::{bounded, BurnoutApi, ClientError};
use crate::config::ControllerSettings;
use crate::dashboard::query::{paginate, ApplyOutcome, ListingState, PageSize, PagedFilteredQuery};

/// Owns the pending-review listing and at most one open review.
pub struct ReviewQueueController<A> {
    api: Arc<A>,
    settings: ControllerSettings,
    token: CancellationToken,
    state: Mutex<QueueState>,
}

struct QueueState {
    query: PagedFilteredQuery<PendingReview>,
    workflow: ReviewWorkflow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueSnapshot {
    pub items: Vec<PendingReview>,
    pub total_count: u64,
    pub page_index: usize,
    pub page_size: PageSize,
    pub total_pages: usize,
    pub listing_state: ListingState,
    pub is_loaded: bool,
    pub last_error: Option<String>,
    pub review: ReviewState,
}

#[derive(Debug, thiserror::Error)]
pub enum ReviewQueueError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    /// The backend no longer treats the review as pending. The queue has
    /// been refreshed.
    #[error("review {review_id} is no longer pending: {source}")]
    Stale {
        review_id: i64,
        #[source]
        source: ClientError,
    },
    #[error("review {0} was cancelled before it finished loading")]
    Abandoned(i64),
    #[error("page {requested} is out of range; the queue has {total_pages} page(s)")]
    PageOutOfRange { requested: usize, total_pages: usize },
}

impl<A> ReviewQueueController<A>
where
    A: BurnoutApi,
{
    pub fn new(api: Arc<A>, settings: ControllerSettings) -> Self {
        Self {
            api,
            settings,
            token: CancellationToken::new(),
            state: Mutex::new(QueueState {
                query: PagedFilteredQuery::new(settings.page_size),
                workflow: ReviewWorkflow::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-fetches the pending set and slices out the current page.
    pub async fn refresh(&self) -> Result<QueueSnapshot, ReviewQueueError> {
        loop {
            let ticket = self.state().query.issue();
            debug!(
                generation = ticket.generation(),
                page = ticket.request.page,
                "pending reviews fetch issued"
            );

            let outcome = bounded(
                &self.token,
                self.settings.request_timeout,
                self.api.pending_reviews(),
            )
            .await;

            let mut state = self.state();
            let pending = match outcome {
                Ok(pending) => pending,
                Err(err) => {
                    if state.query.fail(&ticket, &err) {
                        warn!(error = %err, "pending reviews fetch failed; keeping previous page");
                    }
                    return Err(err.into());
                }
            };

            let total = pending.len();
            match state.query.apply(&ticket, paginate(&pending, &ticket.request)) {
                ApplyOutcome::Published => {
                    info!(total, page = ticket.request.page, "pending reviews published");
                    return Ok(state.snapshot());
                }
                ApplyOutcome::Superseded => {
                    debug!(
                        generation = ticket.generation(),
                        "discarding superseded pending reviews response"
                    );
                    return Ok(state.snapshot());
                }
                ApplyOutcome::SteppedBack => {
                    debug!(
                        page_index = state.query.state().page_index(),
                        "pending page emptied; stepping back"
                    );
                }
            }
        }
    }

    /// Moves to a 0-based page of the queue.
    pub async fn set_page(&self, page_index: usize) -> Result<QueueSnapshot, ReviewQueueError> {
        {
            let mut state = self.state();
            let total_pages = state.query.total_pages();
            if state.query.is_loaded() && page_index > 0 && page_index >= total_pages {
                return Err(ReviewQueueError::PageOutOfRange {
                    requested: page_index,
                    total_pages,
                });
            }
            state.query.update(|query| query.set_page_index(page_index));
        }
        self.refresh().await
    }

    pub async fn set_page_size(&self, page_size: PageSize) -> Result<QueueSnapshot, ReviewQueueError> {
        self.state()
            .query
            .update(|query| query.set_page_size(page_size));
        self.refresh().await
    }

    /// Loads the detail for `review_id`, then the history that follows its
    /// log. The history request uses the log id from the detail response.
    pub async fn open_review(&self, review_id: i64) -> Result<ReviewDetail, ReviewQueueError> {
        let attempt = self.state().workflow.begin(review_id)?;
        info!(review_id, "opening review");

        let payload = match bounded(
            &self.token,
            self.settings.request_timeout,
            self.api.review_detail(review_id),
        )
        .await
        {
            Ok(payload) => payload,
            Err(err) => return Err(self.fail(attempt, ReviewStage::Detail, err)),
        };

        if !self.state().workflow.is_current(attempt) {
            debug!(review_id, "review cancelled during detail fetch");
            return Err(ReviewQueueError::Abandoned(review_id));
        }

        let log_id = payload.log_data.id;
        let history = match bounded(
            &self.token,
            self.settings.request_timeout,
            self.api.subsequent_logs(log_id),
        )
        .await
        {
            Ok(history) => history,
            Err(err) => return Err(self.fail(attempt, ReviewStage::History, err)),
        };

        let detail = ReviewDetail::assemble(payload, history);
        match self.state().workflow.detail_loaded(attempt, detail.clone()) {
            Ok(()) => {
                info!(
                    review_id,
                    log_id,
                    history = detail.history.len(),
                    "review awaiting verdict"
                );
                Ok(detail)
            }
            Err(WorkflowError::StaleAttempt) => Err(ReviewQueueError::Abandoned(review_id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Validates the verdict locally and sends it once. On success the
    /// review leaves the local queue and the listing is re-fetched.
    pub async fn submit_verdict(
        &self,
        draft: &VerdictDraft,
    ) -> Result<QueueSnapshot, ReviewQueueError> {
        let (attempt, submission) = self
            .state()
            .workflow
            .submit(draft, self.settings.notes_max_chars)?;
        let review_id = attempt.review_id();
        info!(review_id, is_correct = submission.is_correct, "submitting verdict");

        let outcome = bounded(
            &self.token,
            self.settings.request_timeout,
            self.api.submit_review(review_id, &submission),
        )
        .await;

        match outcome {
            Ok(_) => {
                {
                    let mut state = self.state();
                    state.workflow.submitted(attempt)?;
                    state.query.retain(|review| review.id != review_id);
                }
                info!(review_id, "verdict accepted");

                match self.refresh().await {
                    Ok(snapshot) => Ok(snapshot),
                    Err(err) => {
                        warn!(review_id, error = %err, "queue refresh after verdict failed");
                        Ok(self.snapshot())
                    }
                }
            }
            Err(err) if err.is_stale_review() => {
                self.state().workflow.fail(attempt, ReviewStage::Submission, err.to_string());
                warn!(review_id, error = %err, "review is stale; refreshing queue");
                if let Err(refresh_err) = self.refresh().await {
                    warn!(error = %refresh_err, "queue refresh after stale review failed");
                }
                Err(ReviewQueueError::Stale {
                    review_id,
                    source: err,
                })
            }
            Err(err) => Err(self.fail(attempt, ReviewStage::Submission, err)),
        }
    }

    /// Abandons the open review, if any. Refused once the verdict is sent.
    pub fn cancel_review(&self) -> Result<Option<i64>, ReviewQueueError> {
        let cancelled = self.state().workflow.cancel()?;
        if let Some(review_id) = cancelled {
            info!(review_id, "review cancelled");
        }
        Ok(cancelled)
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.state().snapshot()
    }

    fn fail(&self, attempt: Attempt, stage: ReviewStage, err: ClientError) -> ReviewQueueError {
        let review_id = attempt.review_id();
        let recorded = self.state().workflow.fail(attempt, stage, err.to_string());
        if !recorded {
            debug!(review_id, ?stage, error = %err, "discarding failure for stale review attempt");
            return ReviewQueueError::Abandoned(review_id);
        }
        warn!(review_id, ?stage, error = %err, "review step failed");
        err.into()
    }
}

impl QueueState {
    fn snapshot(&self) -> QueueSnapshot {
        let query = &self.query;
        QueueSnapshot {
            items: query.page().items.clone(),
            total_count: query.page().total_count,
            page_index: query.state().page_index(),
            page_size: query.state().page_size(),
            total_pages: query.total_pages(),
            listing_state: query.listing_state(),
            is_loaded: query.is_loaded(),
            last_error: query.last_error().map(str::to_string),
            review: self.workflow.state().clone(),
        }
    }
}

impl<A> Drop for ReviewQueueController<A> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
