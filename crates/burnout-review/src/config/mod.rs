use std::env;
use std::fmt;
use std::time::Duration;

use crate::dashboard::query::{InvalidPageSize, PageSize};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_NOTES_MAX_CHARS: usize = 500;

/// Distinguishes runtime behavior for different stages of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the review client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub review: ReviewConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = env::var("BURNOUT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let base_url = ApiConfig::validate_base_url(&base_url)?;

        let timeout_secs = match env::var("BURNOUT_API_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout { value: raw })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let page_size = match env::var("BURNOUT_PAGE_SIZE") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidPageSize { value: raw.clone() })
                .and_then(|size| {
                    PageSize::try_from(size).map_err(|source| ConfigError::PageSizeNotAllowed {
                        source,
                    })
                })?,
            Err(_) => PageSize::default(),
        };

        let notes_max_chars = match env::var("REVIEW_NOTES_MAX_CHARS") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidNotesLimit { value: raw })?,
            Err(_) => DEFAULT_NOTES_MAX_CHARS,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            api: ApiConfig {
                base_url,
                request_timeout: Duration::from_secs(timeout_secs),
            },
            review: ReviewConfig {
                page_size,
                notes_max_chars,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Where the prediction backend lives and how long a single call may take.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Accepts absolute http(s) URLs and strips any trailing slash.
    pub fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
        let trimmed = raw.trim().trim_end_matches('/');
        let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
        let has_host = trimmed
            .split_once("://")
            .map(|(_, rest)| !rest.is_empty())
            .unwrap_or(false);

        if has_scheme && has_host {
            Ok(trimmed.to_string())
        } else {
            Err(ConfigError::InvalidBaseUrl {
                value: raw.to_string(),
            })
        }
    }
}

/// Listing and verdict limits shared by the controllers.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub page_size: PageSize,
    pub notes_max_chars: usize,
}

/// The slice of configuration each controller is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub request_timeout: Duration,
    pub page_size: PageSize,
    pub notes_max_chars: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: PageSize::default(),
            notes_max_chars: DEFAULT_NOTES_MAX_CHARS,
        }
    }
}

impl From<&AppConfig> for ControllerSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            request_timeout: config.api.request_timeout,
            page_size: config.review.page_size,
            notes_max_chars: config.review.notes_max_chars,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidBaseUrl { value: String },
    InvalidTimeout { value: String },
    InvalidPageSize { value: String },
    PageSizeNotAllowed { source: InvalidPageSize },
    InvalidNotesLimit { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBaseUrl { value } => write!(
                f,
                "BURNOUT_API_URL must be an absolute http(s) URL, got '{value}'"
            ),
            ConfigError::InvalidTimeout { value } => write!(
                f,
                "BURNOUT_API_TIMEOUT_SECS must be a positive integer, got '{value}'"
            ),
            ConfigError::InvalidPageSize { value } => {
                write!(f, "BURNOUT_PAGE_SIZE must be an integer, got '{value}'")
            }
            ConfigError::PageSizeNotAllowed { source } => {
                write!(f, "BURNOUT_PAGE_SIZE rejected: {source}")
            }
            ConfigError::InvalidNotesLimit { value } => write!(
                f,
                "REVIEW_NOTES_MAX_CHARS must be a positive integer, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::PageSizeNotAllowed { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("BURNOUT_API_URL");
        env::remove_var("BURNOUT_API_TIMEOUT_SECS");
        env::remove_var("BURNOUT_PAGE_SIZE");
        env::remove_var("REVIEW_NOTES_MAX_CHARS");
        env::remove_var("APP_LOG_LEVEL");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.request_timeout, Duration::from_secs(15));
        assert_eq!(config.review.page_size.get(), 10);
        assert_eq!(config.review.notes_max_chars, 500);
        assert_eq!(config.telemetry.log_level, "info");

        let settings = ControllerSettings::from(&config);
        assert_eq!(settings, ControllerSettings::default());
    }

    #[test]
    fn trailing_slash_is_stripped_from_base_url() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BURNOUT_API_URL", "https://hr.example.com/api/");
        env::set_var("APP_ENV", "ci");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.api.base_url, "https://hr.example.com/api");
        assert_eq!(config.environment, AppEnvironment::Test);
        reset_env();
    }

    #[test]
    fn rejects_page_size_outside_allowed_set() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BURNOUT_PAGE_SIZE", "7");
        let error = AppConfig::load().expect_err("7 is not an allowed page size");
        assert!(matches!(error, ConfigError::PageSizeNotAllowed { .. }));
        reset_env();
    }

    #[test]
    fn rejects_zero_timeout_and_relative_urls() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("BURNOUT_API_TIMEOUT_SECS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        reset_env();

        env::set_var("BURNOUT_API_URL", "localhost:8000");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        reset_env();
    }
}
