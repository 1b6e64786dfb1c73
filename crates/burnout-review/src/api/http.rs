use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::{BurnoutApi, ClientError};
use crate::config::ApiConfig;
use crate::dashboard::{DashboardPage, Department, PageRequest};
use crate::logs::DailyLogCreate;
use crate::review::{
    DailyLogRecord, PendingReview, ReviewDetailPayload, ReviewSubmission, SubsequentLogEntry,
};

/// `reqwest`-backed client for the prediction backend.
#[derive(Debug, Clone)]
pub struct HttpBurnoutApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBurnoutApi {
    /// Builds a client whose every request is capped at the configured timeout.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Reuses an existing [`reqwest::Client`] for connection pooling.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, ClientError> {
        debug!(path, "GET");
        let response = self.client.get(self.url(path)).query(query).send().await?;
        Self::parse_response(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "POST");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::parse_response(response).await
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl BurnoutApi for HttpBurnoutApi {
    async fn dashboard(&self, request: &PageRequest) -> Result<DashboardPage, ClientError> {
        self.get_json("/dashboard", &request.query_pairs()).await
    }

    async fn departments(&self) -> Result<Vec<Department>, ClientError> {
        self.get_json("/departments", &[]).await
    }

    async fn pending_reviews(&self) -> Result<Vec<PendingReview>, ClientError> {
        self.get_json("/reviews/pending", &[]).await
    }

    async fn review_detail(&self, review_id: i64) -> Result<ReviewDetailPayload, ClientError> {
        self.get_json(&format!("/reviews/{review_id}"), &[]).await
    }

    async fn subsequent_logs(&self, log_id: i64) -> Result<Vec<SubsequentLogEntry>, ClientError> {
        self.get_json(&format!("/daily-logs/{log_id}/subsequent"), &[])
            .await
    }

    async fn submit_review(
        &self,
        review_id: i64,
        submission: &ReviewSubmission,
    ) -> Result<PendingReview, ClientError> {
        self.post_json(&format!("/reviews/{review_id}/submit"), submission)
            .await
    }

    async fn create_daily_log(&self, log: &DailyLogCreate) -> Result<DailyLogRecord, ClientError> {
        self.post_json("/daily-logs/", log).await
    }

    async fn generate_random_logs(&self, batch_size: u32) -> Result<Value, ClientError> {
        self.post_json(
            "/daily-logs/generate-random",
            &json!({ "batch_size": batch_size }),
        )
        .await
    }

    async fn train_model(&self) -> Result<Value, ClientError> {
        self.post_json("/predictions/train", &json!({})).await
    }
}
