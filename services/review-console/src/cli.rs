use crate::infra::connect;
use crate::intake::{run_logs, run_train, LogsCommand};
use crate::listing::{run_dashboard, run_departments, run_pending, DashboardArgs, PendingArgs};
use crate::reviews::{run_review, ReviewArgs};
use burnout_review::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "burnout-review",
    about = "Browse burnout risk predictions and record HR verdicts from the command line",
    version
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ConnectionArgs {
    /// Override the configured backend URL
    #[arg(long, global = true)]
    pub(crate) api_url: Option<String>,
    /// Override the per-request timeout in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) timeout_secs: Option<u64>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub(crate) json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show a page of the employee risk listing
    Dashboard(DashboardArgs),
    /// List the departments available as filters
    Departments,
    /// Show a page of predictions awaiting review
    Pending(PendingArgs),
    /// Open a pending review and optionally record a verdict
    Review(ReviewArgs),
    /// Record, import or generate daily logs
    Logs {
        #[command(subcommand)]
        command: LogsCommand,
    },
    /// Retrain the model on reviewed predictions
    Train,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let Cli {
        connection,
        command,
    } = Cli::parse();
    let console = connect(connection)?;

    match command {
        Command::Dashboard(args) => run_dashboard(&console, args).await,
        Command::Departments => run_departments(&console).await,
        Command::Pending(args) => run_pending(&console, args).await,
        Command::Review(args) => run_review(&console, args).await,
        Command::Logs { command } => run_logs(&console, command).await,
        Command::Train => run_train(&console).await,
    }
}
