//! Daily-log intake: single creates, CSV imports, synthetic seeding and
//! model training triggers.

mod import;

use std::io::Read;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::{bounded, BurnoutApi, ClientError};
use crate::config::ControllerSettings;
use crate::review::DailyLogRecord;

pub use import::{parse_csv, CsvLogRow, RowError};

/// `POST /daily-logs/` body. Metrics are optional; the backend fills gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyLogCreate {
    pub employee_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_worked: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_slept: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_personal_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation_level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload_intensity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overtime_hours_today: Option<f64>,
}

impl DailyLogCreate {
    /// Applies the backend's accepted ranges locally.
    pub fn validate(&self) -> Result<(), LogValidationError> {
        if self.employee_id <= 0 {
            return Err(LogValidationError::EmployeeId(self.employee_id));
        }

        let hours = [
            ("hours_worked", self.hours_worked),
            ("hours_slept", self.hours_slept),
        ];
        for (field, value) in hours {
            check_range(field, value, 0.0, Some(24.0), "0..=24")?;
        }

        let non_negative = [
            ("daily_personal_time", self.daily_personal_time),
            ("overtime_hours_today", self.overtime_hours_today),
        ];
        for (field, value) in non_negative {
            check_range(field, value, 0.0, None, ">= 0")?;
        }

        let levels = [
            ("motivation_level", self.motivation_level),
            ("stress_level", self.stress_level),
            ("workload_intensity", self.workload_intensity),
        ];
        for (field, value) in levels {
            check_range(field, value.map(f64::from), 1.0, Some(10.0), "1..=10")?;
        }

        Ok(())
    }
}

fn check_range(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: Option<f64>,
    range: &'static str,
) -> Result<(), LogValidationError> {
    let Some(value) = value else {
        return Ok(());
    };
    let within = value.is_finite() && value >= min && max.map_or(true, |max| value <= max);
    if within {
        Ok(())
    } else {
        Err(LogValidationError::OutOfRange {
            field,
            value,
            range,
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LogValidationError {
    #[error("employee_id must be positive, got {0}")]
    EmployeeId(i64),
    #[error("{field} = {value} is outside {range}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        range: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum LogIntakeError {
    #[error(transparent)]
    Invalid(#[from] LogValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to read log CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("batch size must be greater than zero")]
    EmptyBatch,
}

/// One CSV row that did not become a log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub created: Vec<DailyLogRecord>,
    pub rejected: Vec<RejectedRow>,
}

pub struct LogIntake<A> {
    api: Arc<A>,
    settings: ControllerSettings,
    token: CancellationToken,
}

impl<A> LogIntake<A>
where
    A: BurnoutApi,
{
    pub fn new(api: Arc<A>, settings: ControllerSettings) -> Self {
        Self {
            api,
            settings,
            token: CancellationToken::new(),
        }
    }

    pub async fn create(&self, log: &DailyLogCreate) -> Result<DailyLogRecord, LogIntakeError> {
        log.validate()?;
        let created = bounded(
            &self.token,
            self.settings.request_timeout,
            self.api.create_daily_log(log),
        )
        .await?;
        info!(log_id = created.id, employee_id = log.employee_id, "daily log created");
        Ok(created)
    }

    /// Creates one log per CSV row. Rows that fail to parse, validate or post
    /// are reported by line number; the rest of the file still goes through.
    pub async fn import<R: Read>(&self, reader: R) -> Result<ImportSummary, LogIntakeError> {
        let rows = parse_csv(reader)?;
        let mut summary = ImportSummary::default();

        for row in rows {
            let line = row.line;
            let log = match row.log {
                Ok(log) => log,
                Err(err) => {
                    summary.rejected.push(RejectedRow {
                        line,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            match self.create(&log).await {
                Ok(created) => summary.created.push(created),
                Err(err) => {
                    warn!(line, error = %err, "daily log row rejected");
                    summary.rejected.push(RejectedRow {
                        line,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            created = summary.created.len(),
            rejected = summary.rejected.len(),
            "daily log import finished"
        );
        Ok(summary)
    }

    /// Asks the backend to generate `batch_size` synthetic logs.
    pub async fn seed(&self, batch_size: u32) -> Result<Value, LogIntakeError> {
        if batch_size == 0 {
            return Err(LogIntakeError::EmptyBatch);
        }
        let generated = bounded(
            &self.token,
            self.settings.request_timeout,
            self.api.generate_random_logs(batch_size),
        )
        .await?;
        info!(batch_size, "synthetic logs generated");
        Ok(generated)
    }

    /// Starts a training run; the backend's metrics are returned untouched.
    pub async fn train(&self) -> Result<Value, LogIntakeError> {
        let metrics = bounded(
            &self.token,
            self.settings.request_timeout,
            self.api.train_model(),
        )
        .await?;
        info!("training run finished");
        Ok(metrics)
    }
}

impl<A> Drop for LogIntake<A> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
