use crate::infra::{emit_json, metric, Console};
use burnout_review::error::AppError;
use burnout_review::review::{QueueSnapshot, ReviewDetail, ReviewQueueController, VerdictDraft};
use clap::{ArgGroup, Args};
use serde::Serialize;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("decision").args(["correct", "incorrect"])))]
pub(crate) struct ReviewArgs {
    /// Pending review id
    pub(crate) review_id: i64,
    /// The model's label was right
    #[arg(long)]
    pub(crate) correct: bool,
    /// The model's label was wrong
    #[arg(long)]
    pub(crate) incorrect: bool,
    /// Reviewer notes sent with the verdict
    #[arg(long, requires = "decision")]
    pub(crate) notes: Option<String>,
}

impl ReviewArgs {
    pub(crate) fn decision(&self) -> Option<bool> {
        match (self.correct, self.incorrect) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ReviewReport<'a> {
    detail: &'a ReviewDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    queue: Option<QueueSnapshot>,
}

pub(crate) async fn run_review(console: &Console, args: ReviewArgs) -> Result<(), AppError> {
    let decision = args.decision();
    let queue = ReviewQueueController::new(console.api.clone(), console.settings_for(None));
    let detail = queue.open_review(args.review_id).await?;

    if !console.json {
        render_detail(&detail);
    }

    let Some(is_correct) = decision else {
        if console.json {
            return emit_json(&ReviewReport {
                detail: &detail,
                queue: None,
            });
        }
        println!("\nNo verdict given; pass --correct or --incorrect with --notes to record one.");
        return Ok(());
    };

    let draft = VerdictDraft {
        is_correct: Some(is_correct),
        notes: args.notes.unwrap_or_default(),
    };
    let snapshot = queue.submit_verdict(&draft).await?;

    if console.json {
        return emit_json(&ReviewReport {
            detail: &detail,
            queue: Some(snapshot),
        });
    }

    let verdict = if is_correct { "correct" } else { "incorrect" };
    println!("\nVerdict recorded: review {} marked {verdict}.", detail.review_id());
    match (snapshot.is_loaded, snapshot.last_error.as_deref()) {
        (true, None) => println!("{} review(s) still pending.", snapshot.total_count),
        (_, Some(error)) => println!("Pending queue could not be refreshed: {error}"),
        (false, None) => {}
    }
    Ok(())
}

fn render_detail(detail: &ReviewDetail) {
    let log = &detail.log;
    println!("Review {} for daily log {}", detail.review_id(), log.id);
    println!(
        "Employee {} | Logged {}",
        log.employee_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        log.log_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );
    println!(
        "Model label {} at {} confidence",
        detail.predicted_label().unwrap_or("UNLABELED"),
        detail.confidence_percentage()
    );

    let metrics = detail.metrics();
    println!("\nMetrics");
    println!("- hours worked: {}", metric(metrics.hours_worked));
    println!("- hours slept: {}", metric(metrics.hours_slept));
    println!("- personal time: {}", metric(metrics.daily_personal_time));
    println!("- overtime: {}", metric(metrics.overtime_hours_today));
    println!("- stress level: {}", metric(metrics.stress_level));
    println!("- motivation level: {}", metric(metrics.motivation_level));
    println!("- workload intensity: {}", metric(metrics.workload_intensity));

    if detail.history.is_empty() {
        println!("\nSubsequent logs: none");
        return;
    }
    println!("\nSubsequent logs");
    for entry in &detail.history {
        let view = entry.risk_view();
        println!(
            "- log {} on {}: {} risk {}%, {} hours worked, stress {}",
            entry.log.id,
            entry
                .log
                .log_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            view.risk_class.label(),
            view.risk_score,
            metric(entry.log.hours_worked),
            metric(entry.log.stress_level)
        );
    }
}
