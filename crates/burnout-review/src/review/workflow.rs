//! Pure state machine for one pending review.
//!
//! The workflow performs no I/O. The owning controller asks it for an
//! [`Attempt`] before each suspension point and reports the outcome back
//! with the same attempt. Outcomes for an attempt that is no longer current
//! (the review was cancelled or replaced meanwhile) are rejected, which is
//! how results of already-dispatched requests get discarded.

use std::mem;

use serde::Serialize;
use tracing::debug;

use super::domain::{ReviewDetail, ReviewSubmission, ReviewVerdict, VerdictDraft, VerdictError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStage {
    Detail,
    History,
    Submission,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReviewState {
    #[default]
    Idle,
    DetailLoading {
        review_id: i64,
    },
    AwaitingVerdict {
        detail: Box<ReviewDetail>,
    },
    Submitting {
        detail: Box<ReviewDetail>,
        verdict: ReviewVerdict,
    },
    Done {
        review_id: i64,
    },
    Errored {
        review_id: i64,
        stage: ReviewStage,
        message: String,
    },
}

impl ReviewState {
    pub fn review_id(&self) -> Option<i64> {
        match self {
            ReviewState::Idle => None,
            ReviewState::DetailLoading { review_id }
            | ReviewState::Done { review_id }
            | ReviewState::Errored { review_id, .. } => Some(*review_id),
            ReviewState::AwaitingVerdict { detail } | ReviewState::Submitting { detail, .. } => {
                Some(detail.review_id())
            }
        }
    }

    /// States that hold the single review slot.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ReviewState::DetailLoading { .. }
                | ReviewState::AwaitingVerdict { .. }
                | ReviewState::Submitting { .. }
        )
    }

    fn name(&self) -> &'static str {
        match self {
            ReviewState::Idle => "idle",
            ReviewState::DetailLoading { .. } => "detail_loading",
            ReviewState::AwaitingVerdict { .. } => "awaiting_verdict",
            ReviewState::Submitting { .. } => "submitting",
            ReviewState::Done { .. } => "done",
            ReviewState::Errored { .. } => "errored",
        }
    }
}

/// Identifies one pass through the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    sequence: u64,
    review_id: i64,
}

impl Attempt {
    pub fn review_id(&self) -> i64 {
        self.review_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("review {active} is still open; finish or cancel it first")]
    Busy { active: i64 },
    #[error("no review is waiting for a verdict")]
    NotAwaitingVerdict,
    #[error(transparent)]
    InvalidVerdict(#[from] VerdictError),
    #[error("the review attempt was cancelled or replaced")]
    StaleAttempt,
    #[error("the verdict for review {review_id} has already been sent")]
    SubmissionInFlight { review_id: i64 },
}

#[derive(Debug, Default)]
pub struct ReviewWorkflow {
    state: ReviewState,
    sequence: u64,
}

impl ReviewWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn detail(&self) -> Option<&ReviewDetail> {
        match &self.state {
            ReviewState::AwaitingVerdict { detail } | ReviewState::Submitting { detail, .. } => {
                Some(&**detail)
            }
            _ => None,
        }
    }

    /// `Idle`, `Done` or `Errored` → `DetailLoading`.
    pub fn begin(&mut self, review_id: i64) -> Result<Attempt, WorkflowError> {
        if let Some(active) = self.state.review_id().filter(|_| self.state.is_active()) {
            return Err(WorkflowError::Busy { active });
        }

        self.sequence += 1;
        self.transition(ReviewState::DetailLoading { review_id });
        Ok(self.attempt(review_id))
    }

    pub fn is_current(&self, attempt: Attempt) -> bool {
        attempt.sequence == self.sequence && self.state.review_id() == Some(attempt.review_id)
    }

    /// `DetailLoading` → `AwaitingVerdict`.
    pub fn detail_loaded(
        &mut self,
        attempt: Attempt,
        detail: ReviewDetail,
    ) -> Result<(), WorkflowError> {
        if !self.is_current(attempt) || !matches!(self.state, ReviewState::DetailLoading { .. }) {
            return Err(WorkflowError::StaleAttempt);
        }
        self.transition(ReviewState::AwaitingVerdict {
            detail: Box::new(detail),
        });
        Ok(())
    }

    /// `AwaitingVerdict` → `Submitting`. An invalid draft leaves the state
    /// untouched.
    pub fn submit(
        &mut self,
        draft: &VerdictDraft,
        notes_max_chars: usize,
    ) -> Result<(Attempt, ReviewSubmission), WorkflowError> {
        let ReviewState::AwaitingVerdict { .. } = self.state else {
            return Err(WorkflowError::NotAwaitingVerdict);
        };
        let verdict = draft.validate(notes_max_chars)?;

        let ReviewState::AwaitingVerdict { detail } = mem::take(&mut self.state) else {
            return Err(WorkflowError::NotAwaitingVerdict);
        };
        let review_id = detail.review_id();
        let submission = verdict.to_submission();
        self.transition(ReviewState::Submitting { detail, verdict });
        Ok((self.attempt(review_id), submission))
    }

    /// `Submitting` → `Done`. Drops the detail.
    pub fn submitted(&mut self, attempt: Attempt) -> Result<i64, WorkflowError> {
        if !self.is_current(attempt) || !matches!(self.state, ReviewState::Submitting { .. }) {
            return Err(WorkflowError::StaleAttempt);
        }
        self.transition(ReviewState::Done {
            review_id: attempt.review_id,
        });
        Ok(attempt.review_id)
    }

    /// `DetailLoading` or `Submitting` → `Errored`. Returns `false` when the
    /// attempt is stale and the failure was discarded.
    pub fn fail(&mut self, attempt: Attempt, stage: ReviewStage, message: impl Into<String>) -> bool {
        let failable = matches!(
            self.state,
            ReviewState::DetailLoading { .. } | ReviewState::Submitting { .. }
        );
        if !self.is_current(attempt) || !failable {
            return false;
        }
        self.transition(ReviewState::Errored {
            review_id: attempt.review_id,
            stage,
            message: message.into(),
        });
        true
    }

    /// Abandons the current review and returns to `Idle`. Any attempt still
    /// in flight becomes stale. Refused once the verdict has been sent.
    pub fn cancel(&mut self) -> Result<Option<i64>, WorkflowError> {
        if let ReviewState::Submitting { detail, .. } = &self.state {
            return Err(WorkflowError::SubmissionInFlight {
                review_id: detail.review_id(),
            });
        }

        let review_id = self.state.review_id();
        if review_id.is_some() {
            self.sequence += 1;
            self.transition(ReviewState::Idle);
        }
        Ok(review_id)
    }

    fn attempt(&self, review_id: i64) -> Attempt {
        Attempt {
            sequence: self.sequence,
            review_id,
        }
    }

    fn transition(&mut self, next: ReviewState) {
        debug!(
            from = self.state.name(),
            to = next.name(),
            review_id = next.review_id().or(self.state.review_id()),
            "review workflow transition"
        );
        self.state = next;
    }
}
