use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use super::{BurnoutApi, ClientError};
use crate::dashboard::{DashboardPage, DashboardSummary, Department, PageRequest, RawRiskRecord};
use crate::logs::DailyLogCreate;
use crate::review::{
    DailyLogRecord, PendingReview, ReviewDetailPayload, ReviewSubmission, SubsequentLogEntry,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Dashboard(PageRequest),
    Departments,
    PendingReviews,
    ReviewDetail(i64),
    SubsequentLogs(i64),
    SubmitReview(i64, ReviewSubmission),
    CreateDailyLog(i64),
    GenerateRandom(u32),
    Train,
}

#[derive(Default)]
pub(crate) struct Script {
    pub employees: Vec<RawRiskRecord>,
    pub departments: Vec<Department>,
    pub pending: Vec<PendingReview>,
    pub details: HashMap<i64, ReviewDetailPayload>,
    pub history: HashMap<i64, Vec<SubsequentLogEntry>>,
    pub calls: Vec<Call>,
    /// Each dashboard call takes the next gate, if any, and waits on it.
    pub dashboard_gates: VecDeque<oneshot::Receiver<()>>,
    pub detail_gates: VecDeque<oneshot::Receiver<()>>,
    pub history_gates: VecDeque<oneshot::Receiver<()>>,
    pub fail_dashboard: Option<u16>,
    pub fail_pending: Option<u16>,
    pub fail_detail: Option<u16>,
    pub fail_history: Option<u16>,
    pub fail_submit: Option<u16>,
    pub created_logs: Vec<DailyLogCreate>,
}

/// In-memory backend that records every call.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    script: Mutex<Script>,
}

impl ScriptedApi {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
        }
    }

    pub(crate) fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().expect("script mutex poisoned")
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.script().calls.clone()
    }

    pub(crate) fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.script().calls.iter().filter(|call| matches(call)).count()
    }
}

fn api_error(status: u16, body: &str) -> ClientError {
    ClientError::Api {
        status,
        body: body.to_string(),
    }
}

fn matches_filter(value: Option<&str>, filter: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(filter) => value.is_some_and(|value| value.eq_ignore_ascii_case(filter)),
    }
}

#[async_trait]
impl BurnoutApi for ScriptedApi {
    async fn dashboard(&self, request: &PageRequest) -> Result<DashboardPage, ClientError> {
        let (gate, outcome) = {
            let mut script = self.script();
            script.calls.push(Call::Dashboard(request.clone()));
            let gate = script.dashboard_gates.pop_front();
            let outcome = match script.fail_dashboard {
                Some(status) => Err(api_error(status, "dashboard unavailable")),
                None => {
                    let matching: Vec<RawRiskRecord> = script
                        .employees
                        .iter()
                        .filter(|row| {
                            matches_filter(row.department.as_deref(), request.department.as_deref())
                                && matches_filter(row.status.as_deref(), request.status.as_deref())
                                && matches_filter(row.trend.as_deref(), request.trend.as_deref())
                        })
                        .cloned()
                        .collect();
                    let critical_count = matching
                        .iter()
                        .filter(|row| matches_filter(row.status.as_deref(), Some("CRITICAL")))
                        .count() as u32;
                    Ok(DashboardPage {
                        total: matching.len() as u64,
                        employees: matching
                            .into_iter()
                            .skip(request.offset())
                            .take(request.page_size as usize)
                            .collect(),
                        summary: Some(DashboardSummary {
                            critical_count,
                            ..DashboardSummary::default()
                        }),
                    })
                }
            };
            (gate, outcome)
        };

        if let Some(gate) = gate {
            gate.await.ok();
        }
        outcome
    }

    async fn departments(&self) -> Result<Vec<Department>, ClientError> {
        let mut script = self.script();
        script.calls.push(Call::Departments);
        Ok(script.departments.clone())
    }

    async fn pending_reviews(&self) -> Result<Vec<PendingReview>, ClientError> {
        let mut script = self.script();
        script.calls.push(Call::PendingReviews);
        match script.fail_pending {
            Some(status) => Err(api_error(status, "queue unavailable")),
            None => Ok(script.pending.clone()),
        }
    }

    async fn review_detail(&self, review_id: i64) -> Result<ReviewDetailPayload, ClientError> {
        let (gate, outcome) = {
            let mut script = self.script();
            script.calls.push(Call::ReviewDetail(review_id));
            let gate = script.detail_gates.pop_front();
            let outcome = match script.fail_detail {
                Some(status) => Err(api_error(status, "detail unavailable")),
                None => script
                    .details
                    .get(&review_id)
                    .cloned()
                    .ok_or_else(|| api_error(404, "Review not found")),
            };
            (gate, outcome)
        };

        if let Some(gate) = gate {
            gate.await.ok();
        }
        outcome
    }

    async fn subsequent_logs(&self, log_id: i64) -> Result<Vec<SubsequentLogEntry>, ClientError> {
        let gate = {
            let mut script = self.script();
            script.calls.push(Call::SubsequentLogs(log_id));
            script.history_gates.pop_front()
        };

        if let Some(gate) = gate {
            gate.await.ok();
        }

        let script = self.script();
        match script.fail_history {
            Some(status) => Err(api_error(status, "history unavailable")),
            None => script
                .history
                .get(&log_id)
                .cloned()
                .ok_or_else(|| api_error(404, "Log not found")),
        }
    }

    async fn submit_review(
        &self,
        review_id: i64,
        submission: &ReviewSubmission,
    ) -> Result<PendingReview, ClientError> {
        let mut script = self.script();
        script
            .calls
            .push(Call::SubmitReview(review_id, submission.clone()));
        if let Some(status) = script.fail_submit {
            return Err(api_error(status, "submission rejected"));
        }

        let position = script
            .pending
            .iter()
            .position(|review| review.id == review_id)
            .ok_or_else(|| api_error(400, "Prediction is not pending review"))?;
        Ok(script.pending.remove(position))
    }

    async fn create_daily_log(&self, log: &DailyLogCreate) -> Result<DailyLogRecord, ClientError> {
        let mut script = self.script();
        script.calls.push(Call::CreateDailyLog(log.employee_id));
        script.created_logs.push(log.clone());
        Ok(DailyLogRecord {
            id: script.created_logs.len() as i64,
            employee_id: Some(log.employee_id),
            log_date: log.log_date,
            hours_worked: log.hours_worked,
            hours_slept: log.hours_slept,
            burnout_risk: Some("LOW".to_string()),
            ..DailyLogRecord::default()
        })
    }

    async fn generate_random_logs(&self, batch_size: u32) -> Result<Value, ClientError> {
        let mut script = self.script();
        script.calls.push(Call::GenerateRandom(batch_size));
        Ok(json!({ "generated": batch_size }))
    }

    async fn train_model(&self) -> Result<Value, ClientError> {
        let mut script = self.script();
        script.calls.push(Call::Train);
        Ok(json!({ "accuracy": 0.91, "samples": 120 }))
    }
}
