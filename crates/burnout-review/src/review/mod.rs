//! Human-in-the-loop review of pending predictions.

pub mod domain;
pub mod queue;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use domain::{
    confidence_percentage, DailyLogRecord, LogMetrics, PendingReview, ReviewDetail,
    ReviewDetailPayload, ReviewSubmission, ReviewVerdict, SubsequentLogEntry, VerdictDraft,
    VerdictError,
};
pub use queue::{QueueSnapshot, ReviewQueueController, ReviewQueueError};
pub use workflow::{Attempt, ReviewStage, ReviewState, ReviewWorkflow, WorkflowError};
