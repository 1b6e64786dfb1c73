use crate::cli::ConnectionArgs;
use burnout_review::api::{parse_timestamp, HttpBurnoutApi};
use burnout_review::config::{ApiConfig, AppConfig, ControllerSettings};
use burnout_review::dashboard::PageSize;
use burnout_review::error::AppError;
use burnout_review::telemetry;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared state for one console invocation.
pub(crate) struct Console {
    pub(crate) api: Arc<HttpBurnoutApi>,
    pub(crate) settings: ControllerSettings,
    pub(crate) json: bool,
}

impl Console {
    /// Controller settings with an optional per-command page size.
    pub(crate) fn settings_for(&self, page_size: Option<PageSize>) -> ControllerSettings {
        ControllerSettings {
            page_size: page_size.unwrap_or(self.settings.page_size),
            ..self.settings
        }
    }
}

pub(crate) fn connect(mut args: ConnectionArgs) -> Result<Console, AppError> {
    let mut config = AppConfig::load()?;

    if let Some(api_url) = args.api_url.take() {
        config.api.base_url = ApiConfig::validate_base_url(&api_url)?;
    }
    if let Some(secs) = args.timeout_secs {
        config.api.request_timeout = Duration::from_secs(secs);
    }

    telemetry::init(&config.telemetry)?;

    let api = HttpBurnoutApi::from_config(&config.api)?;
    info!(
        environment = ?config.environment,
        base_url = api.base_url(),
        "review console connected"
    );

    Ok(Console {
        api: Arc::new(api),
        settings: ControllerSettings::from(&config),
        json: args.json,
    })
}

/// Converts an operator-facing 1-based page into a 0-based index.
pub(crate) fn parse_page(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(page) if page >= 1 => Ok(page - 1),
        _ => Err(format!("'{raw}' is not a page number (pages start at 1)")),
    }
}

pub(crate) fn parse_page_size(raw: &str) -> Result<PageSize, String> {
    let size = raw
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("failed to parse '{raw}' as a page size ({err})"))?;
    PageSize::try_from(size).map_err(|err| err.to_string())
}

pub(crate) fn parse_log_date(raw: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as YYYY-MM-DD or an ISO datetime"))
}

pub(crate) fn emit_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(std::io::Error::from)?;
    writeln!(stdout)?;
    Ok(())
}

/// `page 2 of 3 (12 employees)`; callers handle the empty listing.
pub(crate) fn page_banner(page_index: usize, total_pages: usize, total: u64, noun: &str) -> String {
    format!(
        "page {} of {} ({} {})",
        page_index + 1,
        total_pages.max(1),
        total,
        noun
    )
}

pub(crate) fn metric(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value:.1}"))
        .unwrap_or_else(|| "n/a".to_string())
}
