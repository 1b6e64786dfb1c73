use crate::api::ClientError;
use crate::config::ConfigError;
use crate::dashboard::DashboardError;
use crate::logs::LogIntakeError;
use crate::review::ReviewQueueError;
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Client(ClientError),
    Dashboard(DashboardError),
    Review(ReviewQueueError),
    Intake(LogIntakeError),
    Usage(String),
}

impl AppError {
    /// Process exit status for the console: 2 for bad input, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) | AppError::Usage(_) => 2,
            AppError::Review(ReviewQueueError::Workflow(_)) => 2,
            AppError::Intake(LogIntakeError::Invalid(_) | LogIntakeError::EmptyBatch) => 2,
            AppError::Dashboard(DashboardError::PageOutOfRange { .. })
            | AppError::Review(ReviewQueueError::PageOutOfRange { .. }) => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Client(err) => write!(f, "backend error: {}", err),
            AppError::Dashboard(err) => write!(f, "dashboard error: {}", err),
            AppError::Review(err) => write!(f, "review error: {}", err),
            AppError::Intake(err) => write!(f, "log intake error: {}", err),
            AppError::Usage(message) => write!(f, "usage error: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Client(err) => Some(err),
            AppError::Dashboard(err) => Some(err),
            AppError::Review(err) => Some(err),
            AppError::Intake(err) => Some(err),
            AppError::Usage(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ClientError> for AppError {
    fn from(value: ClientError) -> Self {
        Self::Client(value)
    }
}

impl From<DashboardError> for AppError {
    fn from(value: DashboardError) -> Self {
        Self::Dashboard(value)
    }
}

impl From<ReviewQueueError> for AppError {
    fn from(value: ReviewQueueError) -> Self {
        Self::Review(value)
    }
}

impl From<LogIntakeError> for AppError {
    fn from(value: LogIntakeError) -> Self {
        Self::Intake(value)
    }
}
