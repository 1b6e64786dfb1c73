mod cli;
mod infra;
mod intake;
mod listing;
mod reviews;

use burnout_review::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
