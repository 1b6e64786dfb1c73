use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::wire::{lenient_id, lenient_number, lenient_text, optional_timestamp};
use crate::dashboard::{normalize, EmployeeRiskView, RawRiskRecord};

/// A prediction awaiting a human correctness judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingReview {
    pub id: i64,
    pub daily_log_id: i64,
    /// Model label, e.g. `HIGH`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub burnout_risk: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub burnout_rate: Option<f64>,
    /// Model confidence on the 0-1 scale.
    #[serde(default, deserialize_with = "lenient_number")]
    pub confidence_score: Option<f64>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

impl PendingReview {
    pub fn confidence_percentage(&self) -> String {
        confidence_percentage(self.confidence_score)
    }

    pub fn risk_view(&self) -> EmployeeRiskView {
        normalize(&RawRiskRecord::from(self))
    }
}

/// Formats a 0-1 confidence as `87.0%`, or `N/A` when unknown.
pub fn confidence_percentage(score: Option<f64>) -> String {
    match score.filter(|score| score.is_finite()) {
        Some(score) => format!("{:.1}%", score * 100.0),
        None => "N/A".to_string(),
    }
}

/// A daily log as returned by the log, detail and history endpoints.
///
/// History rows additionally carry the prediction attached to the log, so
/// those fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyLogRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_id")]
    pub employee_id: Option<i64>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub log_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub hours_worked: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub hours_slept: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub daily_personal_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub motivation_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stress_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub workload_intensity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub overtime_hours_today: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub burnout_risk: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub burnout_rate: Option<f64>,
    /// Processing status of the attached prediction, not a risk label.
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub processed_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub prediction_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub confidence_score: Option<f64>,
}

impl DailyLogRecord {
    pub fn metrics(&self) -> LogMetrics {
        LogMetrics {
            hours_worked: self.hours_worked,
            hours_slept: self.hours_slept,
            daily_personal_time: self.daily_personal_time,
            stress_level: self.stress_level,
            motivation_level: self.motivation_level,
            workload_intensity: self.workload_intensity,
            overtime_hours_today: self.overtime_hours_today,
        }
    }

    pub fn risk_view(&self) -> EmployeeRiskView {
        normalize(&RawRiskRecord::from(self))
    }
}

/// Wellbeing metrics the reviewer weighs against the model's label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LogMetrics {
    pub hours_worked: Option<f64>,
    pub hours_slept: Option<f64>,
    pub daily_personal_time: Option<f64>,
    pub stress_level: Option<f64>,
    pub motivation_level: Option<f64>,
    pub workload_intensity: Option<f64>,
    pub overtime_hours_today: Option<f64>,
}

/// Read-only history row following the flagged log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubsequentLogEntry {
    pub log: DailyLogRecord,
}

impl SubsequentLogEntry {
    pub fn risk_view(&self) -> EmployeeRiskView {
        self.log.risk_view()
    }
}

/// `GET /reviews/{id}` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDetailPayload {
    pub prediction: PendingReview,
    pub log_data: DailyLogRecord,
    #[serde(default, deserialize_with = "lenient_number")]
    pub confidence_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ai_prediction_type: Option<String>,
}

/// Everything the reviewer sees while a verdict is pending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewDetail {
    pub prediction: PendingReview,
    pub log: DailyLogRecord,
    pub ai_prediction_type: Option<String>,
    pub confidence_score: Option<f64>,
    pub history: Vec<SubsequentLogEntry>,
}

impl ReviewDetail {
    pub fn assemble(payload: ReviewDetailPayload, history: Vec<SubsequentLogEntry>) -> Self {
        let confidence_score = payload
            .confidence_score
            .or(payload.prediction.confidence_score);

        Self {
            prediction: payload.prediction,
            log: payload.log_data,
            ai_prediction_type: payload.ai_prediction_type,
            confidence_score,
            history,
        }
    }

    pub fn review_id(&self) -> i64 {
        self.prediction.id
    }

    pub fn metrics(&self) -> LogMetrics {
        self.log.metrics()
    }

    pub fn confidence_percentage(&self) -> String {
        confidence_percentage(self.confidence_score)
    }

    /// The model's label, falling back to the prediction type the detail
    /// endpoint reports.
    pub fn predicted_label(&self) -> Option<&str> {
        self.prediction
            .burnout_risk
            .as_deref()
            .or(self.ai_prediction_type.as_deref())
    }
}

/// `POST /reviews/{id}/submit` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub is_correct: bool,
    pub hr_notes: String,
}

/// Unvalidated reviewer input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerdictDraft {
    pub is_correct: Option<bool>,
    pub notes: String,
}

impl VerdictDraft {
    pub fn new(is_correct: bool, notes: impl Into<String>) -> Self {
        Self {
            is_correct: Some(is_correct),
            notes: notes.into(),
        }
    }

    pub fn validate(&self, max_chars: usize) -> Result<ReviewVerdict, VerdictError> {
        let is_correct = self.is_correct.ok_or(VerdictError::MissingDecision)?;
        let notes = self.notes.trim();
        if notes.is_empty() {
            return Err(VerdictError::EmptyNotes);
        }
        let length = notes.chars().count();
        if length > max_chars {
            return Err(VerdictError::NotesTooLong {
                length,
                limit: max_chars,
            });
        }

        Ok(ReviewVerdict {
            is_correct,
            notes: notes.to_string(),
        })
    }
}

/// A validated verdict. Fields are private so it cannot change after
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewVerdict {
    is_correct: bool,
    notes: String,
}

impl ReviewVerdict {
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn to_submission(&self) -> ReviewSubmission {
        ReviewSubmission {
            is_correct: self.is_correct,
            hr_notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerdictError {
    #[error("a correct/incorrect decision is required")]
    MissingDecision,
    #[error("review notes must not be empty")]
    EmptyNotes,
    #[error("review notes are {length} characters; the limit is {limit}")]
    NotesTooLong { length: usize, limit: usize },
}

impl From<&PendingReview> for RawRiskRecord {
    fn from(review: &PendingReview) -> Self {
        RawRiskRecord {
            id: Some(review.id),
            status: review.burnout_risk.clone(),
            burnout_rate: review.burnout_rate,
            ..RawRiskRecord::default()
        }
    }
}

impl From<&DailyLogRecord> for RawRiskRecord {
    fn from(log: &DailyLogRecord) -> Self {
        RawRiskRecord {
            id: log.employee_id,
            status: log.burnout_risk.clone(),
            burnout_rate: log.burnout_rate,
            ..RawRiskRecord::default()
        }
    }
}
