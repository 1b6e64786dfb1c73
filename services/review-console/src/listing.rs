use crate::infra::{emit_json, page_banner, parse_page, parse_page_size, Console};
use burnout_review::dashboard::{
    DashboardController, DashboardSnapshot, EmployeeRiskView, FeedbackState, ListingState,
    PageSize,
};
use burnout_review::error::AppError;
use burnout_review::review::{QueueSnapshot, ReviewQueueController};
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// Page to show, starting at 1
    #[arg(long, default_value = "1", value_parser = parse_page)]
    pub(crate) page: usize,
    /// Rows per page (5, 10, 25 or 50)
    #[arg(long, value_parser = parse_page_size)]
    pub(crate) page_size: Option<PageSize>,
    /// Only employees in this department
    #[arg(long)]
    pub(crate) department: Option<String>,
    /// Only this risk status, e.g. CRITICAL
    #[arg(long)]
    pub(crate) status: Option<String>,
    /// Only this trend: increasing, decreasing or stable
    #[arg(long)]
    pub(crate) trend: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct PendingArgs {
    /// Page to show, starting at 1
    #[arg(long, default_value = "1", value_parser = parse_page)]
    pub(crate) page: usize,
    /// Rows per page (5, 10, 25 or 50)
    #[arg(long, value_parser = parse_page_size)]
    pub(crate) page_size: Option<PageSize>,
}

pub(crate) async fn run_dashboard(console: &Console, args: DashboardArgs) -> Result<(), AppError> {
    let DashboardArgs {
        page,
        page_size,
        department,
        status,
        trend,
    } = args;

    let dashboard = DashboardController::new(console.api.clone(), console.settings_for(page_size));
    let snapshot = dashboard
        .apply_query(move |state| {
            let department = state.set_department(department);
            let status = state.set_status(status);
            let trend = state.set_trend(trend);
            let moved = state.set_page_index(page);
            department || status || trend || moved
        })
        .await?;

    if console.json {
        return emit_json(&snapshot);
    }
    if snapshot.page_index != page {
        println!(
            "Page {} is past the end of the listing; showing page {}.",
            page + 1,
            snapshot.page_index + 1
        );
    }
    render_dashboard(&snapshot);
    Ok(())
}

pub(crate) async fn run_departments(console: &Console) -> Result<(), AppError> {
    let dashboard = DashboardController::new(console.api.clone(), console.settings_for(None));
    let departments = dashboard.load_departments().await?;

    if console.json {
        return emit_json(&departments);
    }
    if departments.is_empty() {
        println!("No departments configured.");
        return Ok(());
    }
    println!("Departments");
    for department in &departments {
        match department.description.as_deref() {
            Some(description) if !description.trim().is_empty() => {
                println!("- {}: {}", department.name, description)
            }
            _ => println!("- {}", department.name),
        }
    }
    Ok(())
}

pub(crate) async fn run_pending(console: &Console, args: PendingArgs) -> Result<(), AppError> {
    let queue = ReviewQueueController::new(console.api.clone(), console.settings_for(args.page_size));
    let snapshot = queue.set_page(args.page).await?;

    if console.json {
        return emit_json(&snapshot);
    }
    render_pending(&snapshot);
    Ok(())
}

fn render_dashboard(snapshot: &DashboardSnapshot) {
    println!("Employee risk dashboard");

    let filters = &snapshot.filters;
    if !filters.is_empty() {
        println!(
            "Filters: department {} | status {} | trend {}",
            filters.department().unwrap_or("any"),
            filters.status().unwrap_or("any"),
            filters.trend().unwrap_or("any")
        );
    }

    if let Some(summary) = snapshot.summary {
        println!(
            "Critical {} | Monitor {} | Stable {} | Average risk {}%",
            summary.critical_count,
            summary.monitor_count,
            summary.stable_count,
            summary.average_risk_percent
        );
    }

    if snapshot.listing_state == ListingState::Empty {
        println!("\nNo employees match the current filters.");
        return;
    }

    println!(
        "\nEmployees, {}",
        page_banner(
            snapshot.page_index,
            snapshot.total_pages,
            snapshot.total_count,
            "employees"
        )
    );
    for row in &snapshot.items {
        println!("{}", employee_line(row));
    }
}

fn render_pending(snapshot: &QueueSnapshot) {
    if snapshot.listing_state == ListingState::Empty {
        println!("No predictions are waiting for review.");
        return;
    }

    println!(
        "Pending reviews, {}",
        page_banner(
            snapshot.page_index,
            snapshot.total_pages,
            snapshot.total_count,
            "pending"
        )
    );
    for review in &snapshot.items {
        let created = review
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!(
            "- review {} (log {}): {} at {} confidence, created {}",
            review.id,
            review.daily_log_id,
            review.burnout_risk.as_deref().unwrap_or("UNLABELED"),
            review.confidence_percentage(),
            created
        );
    }
}

pub(crate) fn employee_line(row: &EmployeeRiskView) -> String {
    let name = if row.display_name.is_empty() {
        "(unnamed)"
    } else {
        row.display_name.as_str()
    };
    format!(
        "- [{}] {} ({}, {}): risk {}% {}, {}, {}",
        row.initial,
        name,
        row.role,
        row.department,
        row.risk_score,
        row.risk_class.label(),
        row.trend_icon(),
        feedback_label(row.feedback)
    )
}

fn feedback_label(feedback: FeedbackState) -> &'static str {
    match feedback {
        FeedbackState::Unreviewed => "awaiting HR review",
        FeedbackState::Confirmed => "confirmed by HR",
        FeedbackState::Rejected => "rejected by HR",
    }
}
