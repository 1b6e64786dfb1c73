use crate::infra::{emit_json, parse_log_date, Console};
use burnout_review::error::AppError;
use burnout_review::logs::{DailyLogCreate, LogIntake};
use chrono::NaiveDateTime;
use clap::{Args, Subcommand};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub(crate) enum LogsCommand {
    /// Record one daily log and print the prediction it received
    Create(CreateLogArgs),
    /// Create one log per row of a CSV file
    Import {
        /// CSV with an employee_id column plus any metric columns
        path: PathBuf,
    },
    /// Ask the backend to generate synthetic logs
    Seed {
        /// Number of logs to generate
        #[arg(default_value_t = 10)]
        count: u32,
    },
}

#[derive(Args, Debug)]
pub(crate) struct CreateLogArgs {
    #[arg(long)]
    pub(crate) employee_id: i64,
    /// Log date (YYYY-MM-DD or ISO datetime). The backend defaults to now.
    #[arg(long, value_parser = parse_log_date)]
    pub(crate) log_date: Option<NaiveDateTime>,
    #[arg(long)]
    pub(crate) hours_worked: Option<f64>,
    #[arg(long)]
    pub(crate) hours_slept: Option<f64>,
    #[arg(long)]
    pub(crate) personal_time: Option<f64>,
    /// 1 to 10
    #[arg(long)]
    pub(crate) motivation: Option<i32>,
    /// 1 to 10
    #[arg(long)]
    pub(crate) stress: Option<i32>,
    /// 1 to 10
    #[arg(long)]
    pub(crate) workload: Option<i32>,
    #[arg(long)]
    pub(crate) overtime: Option<f64>,
}

impl From<CreateLogArgs> for DailyLogCreate {
    fn from(args: CreateLogArgs) -> Self {
        DailyLogCreate {
            employee_id: args.employee_id,
            log_date: args.log_date,
            hours_worked: args.hours_worked,
            hours_slept: args.hours_slept,
            daily_personal_time: args.personal_time,
            motivation_level: args.motivation,
            stress_level: args.stress,
            workload_intensity: args.workload,
            overtime_hours_today: args.overtime,
        }
    }
}

pub(crate) async fn run_logs(console: &Console, command: LogsCommand) -> Result<(), AppError> {
    let intake = LogIntake::new(console.api.clone(), console.settings_for(None));

    match command {
        LogsCommand::Create(args) => {
            let created = intake.create(&DailyLogCreate::from(args)).await?;
            if console.json {
                return emit_json(&created);
            }
            println!(
                "Created daily log {}: predicted risk {}",
                created.id,
                created.burnout_risk.as_deref().unwrap_or("pending")
            );
        }
        LogsCommand::Import { path } => {
            let file = File::open(&path)?;
            let summary = intake.import(BufReader::new(file)).await?;
            if console.json {
                return emit_json(&summary);
            }
            println!(
                "Imported {} log(s) from {}; {} row(s) rejected",
                summary.created.len(),
                path.display(),
                summary.rejected.len()
            );
            for rejected in &summary.rejected {
                println!("- line {}: {}", rejected.line, rejected.reason);
            }
        }
        LogsCommand::Seed { count } => {
            let generated = intake.seed(count).await?;
            if console.json {
                return emit_json(&generated);
            }
            println!("Requested {count} synthetic log(s)");
            render_fields(&generated);
        }
    }
    Ok(())
}

pub(crate) async fn run_train(console: &Console) -> Result<(), AppError> {
    let intake = LogIntake::new(console.api.clone(), console.settings_for(None));
    let metrics = intake.train().await?;

    if console.json {
        return emit_json(&metrics);
    }
    println!("Training finished");
    render_fields(&metrics);
    Ok(())
}

/// Backend payloads here are free-form; objects print one key per line.
fn render_fields(value: &Value) {
    match value {
        Value::Object(fields) => {
            for (key, field) in fields {
                match field {
                    Value::String(text) => println!("- {key}: {text}"),
                    other => println!("- {key}: {other}"),
                }
            }
        }
        Value::Null => {}
        other => println!("{other}"),
    }
}
