//! Request-execution capability consumed by the controllers.
//!
//! Controllers never talk to `reqwest` directly: they receive an
//! `Arc<impl BurnoutApi>` at construction so tests can substitute a scripted
//! backend, and every call goes through [`bounded`] so it carries both an
//! explicit ceiling and the owning controller's cancellation token.

mod http;
pub(crate) mod wire;

#[cfg(test)]
pub(crate) mod scripted;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::dashboard::{DashboardPage, Department, PageRequest};
use crate::logs::DailyLogCreate;
use crate::review::{
    DailyLogRecord, PendingReview, ReviewDetailPayload, ReviewSubmission, SubsequentLogEntry,
};

pub use http::HttpBurnoutApi;
pub use wire::parse_timestamp;

/// One method per backend endpoint the review client consumes.
#[async_trait]
pub trait BurnoutApi: Send + Sync {
    /// `GET /dashboard`; `request.page` is already 1-based.
    async fn dashboard(&self, request: &PageRequest) -> Result<DashboardPage, ClientError>;

    /// `GET /departments`
    async fn departments(&self) -> Result<Vec<Department>, ClientError>;

    /// `GET /reviews/pending`
    async fn pending_reviews(&self) -> Result<Vec<PendingReview>, ClientError>;

    /// `GET /reviews/{id}`
    async fn review_detail(&self, review_id: i64) -> Result<ReviewDetailPayload, ClientError>;

    /// `GET /daily-logs/{log_id}/subsequent`
    async fn subsequent_logs(&self, log_id: i64) -> Result<Vec<SubsequentLogEntry>, ClientError>;

    /// `POST /reviews/{id}/submit`; the backend echoes the reviewed prediction.
    async fn submit_review(
        &self,
        review_id: i64,
        submission: &ReviewSubmission,
    ) -> Result<PendingReview, ClientError>;

    /// `POST /daily-logs/`
    async fn create_daily_log(&self, log: &DailyLogCreate) -> Result<DailyLogRecord, ClientError>;

    /// `POST /daily-logs/generate-random`
    async fn generate_random_logs(&self, batch_size: u32) -> Result<Value, ClientError>;

    /// `POST /predictions/train`
    async fn train_model(&self) -> Result<Value, ClientError>;
}

/// Failures raised at the backend boundary.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (connect, DNS, TLS, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("request exceeded the {0:?} ceiling")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Backend rejections that mean the local view of a review is out of date.
    pub fn is_stale_review(&self) -> bool {
        matches!(
            self,
            ClientError::Api {
                status: 400 | 404 | 409,
                ..
            }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

/// Runs `call` until it completes, `limit` elapses, or `token` is cancelled.
pub async fn bounded<T, F>(
    token: &CancellationToken,
    limit: Duration,
    call: F,
) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::select! {
        _ = token.cancelled() => Err(ClientError::Cancelled),
        outcome = tokio::time::timeout(limit, call) => match outcome {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(limit)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_reports_timeout() {
        let token = CancellationToken::new();
        let outcome: Result<(), ClientError> = bounded(&token, Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(outcome, Err(ClientError::Timeout(_))));
    }

    #[tokio::test]
    async fn bounded_honors_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let outcome: Result<u8, ClientError> =
            bounded(&token, Duration::from_secs(5), std::future::pending()).await;

        assert!(outcome.expect_err("cancelled").is_cancelled());
    }

    #[test]
    fn stale_review_statuses() {
        let stale = ClientError::Api {
            status: 409,
            body: "already reviewed".to_string(),
        };
        let server = ClientError::Api {
            status: 500,
            body: "boom".to_string(),
        };
        assert!(stale.is_stale_review());
        assert!(!server.is_stale_review());
        assert!(!ClientError::Cancelled.is_stale_review());
    }
}
