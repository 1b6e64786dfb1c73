use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::scripted::{Call, Script, ScriptedApi};
use crate::config::ControllerSettings;
use crate::dashboard::PageSize;
use crate::review::domain::{
    DailyLogRecord, PendingReview, ReviewDetail, ReviewDetailPayload, SubsequentLogEntry,
};
use crate::review::ReviewQueueController;

pub(super) fn pending(id: i64, daily_log_id: i64) -> PendingReview {
    PendingReview {
        id,
        daily_log_id,
        burnout_risk: Some("HIGH".to_string()),
        burnout_rate: Some(0.82),
        confidence_score: Some(0.87),
        created_at: NaiveDate::from_ymd_opt(2024, 1, 15)
            .expect("valid date")
            .and_hms_opt(10, 30, 0),
    }
}

pub(super) fn log(id: i64, hours_worked: f64) -> DailyLogRecord {
    DailyLogRecord {
        id,
        employee_id: Some(3),
        log_date: NaiveDate::from_ymd_opt(2024, 1, 15)
            .expect("valid date")
            .and_hms_opt(0, 0, 0),
        hours_worked: Some(hours_worked),
        hours_slept: Some(5.5),
        stress_level: Some(8.0),
        motivation_level: Some(3.0),
        workload_intensity: Some(9.0),
        overtime_hours_today: Some(1.5),
        burnout_risk: Some("HIGH".to_string()),
        ..DailyLogRecord::default()
    }
}

pub(super) fn detail_payload(review_id: i64, log_id: i64) -> ReviewDetailPayload {
    ReviewDetailPayload {
        prediction: pending(review_id, log_id),
        log_data: log(log_id, 9.5),
        confidence_score: Some(0.87),
        ai_prediction_type: Some("HIGH".to_string()),
    }
}

pub(super) fn history(after_log_id: i64, rows: i64) -> Vec<SubsequentLogEntry> {
    (1..=rows)
        .map(|offset| SubsequentLogEntry {
            log: log(after_log_id + offset, 8.0),
        })
        .collect()
}

pub(super) fn review_detail(review_id: i64, log_id: i64) -> ReviewDetail {
    ReviewDetail::assemble(detail_payload(review_id, log_id), history(log_id, 3))
}

/// A queue of `count` pending reviews with ids `1..=count`, each review `n`
/// pointing at log `n + 40`, with detail and three history rows scripted.
pub(super) fn queue_script(count: i64) -> Script {
    let mut script = Script::default();
    for id in 1..=count {
        let log_id = id + 40;
        script.pending.push(pending(id, log_id));
        script.details.insert(id, detail_payload(id, log_id));
        script.history.insert(log_id, history(log_id, 3));
    }
    script
}

pub(super) fn settings(page_size: u32) -> ControllerSettings {
    ControllerSettings {
        page_size: PageSize::try_from(page_size).expect("allowed page size"),
        notes_max_chars: 40,
        ..ControllerSettings::default()
    }
}

pub(super) fn queue(
    script: Script,
    page_size: u32,
) -> (Arc<ScriptedApi>, ReviewQueueController<ScriptedApi>) {
    let api = Arc::new(ScriptedApi::new(script));
    let controller = ReviewQueueController::new(api.clone(), settings(page_size));
    (api, controller)
}

pub(super) fn submissions(api: &ScriptedApi) -> Vec<Call> {
    api.calls()
        .into_iter()
        .filter(|call| matches!(call, Call::SubmitReview(..)))
        .collect()
}
