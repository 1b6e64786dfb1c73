//! Maps backend record shapes into the single display model used by every
//! list and table. Nothing here can fail: unknown inputs fall back to the
//! lowest-severity bucket so an unclassified risk still renders.

use serde::Serialize;

use super::RawRiskRecord;

pub const PLACEHOLDER_INITIAL: char = '?';
const DEFAULT_ROLE: &str = "Employee";
const DEFAULT_DEPARTMENT: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskClass {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskClass {
    /// Case-insensitive; LOW, NORMAL and anything unrecognized land on `Low`.
    pub fn classify(raw: Option<&str>) -> Self {
        let upper = raw.map(|value| value.trim().to_ascii_uppercase());
        match upper.as_deref() {
            Some("CRITICAL") => Self::Critical,
            Some("HIGH") => Self::High,
            Some("MEDIUM") => Self::Medium,
            _ => Self::Low,
        }
    }

    pub const fn css_class(self) -> &'static str {
        match self {
            RiskClass::Critical => "risk-critical",
            RiskClass::High => "risk-high",
            RiskClass::Medium => "risk-medium",
            RiskClass::Low => "risk-low",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskClass::Critical => "Critical",
            RiskClass::High => "High",
            RiskClass::Medium => "Medium",
            RiskClass::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

impl TrendDirection {
    pub fn classify(raw: Option<&str>) -> Self {
        let lower = raw.map(|value| value.trim().to_ascii_lowercase());
        match lower.as_deref() {
            Some("increasing") => Self::Up,
            Some("decreasing") => Self::Down,
            _ => Self::Flat,
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            TrendDirection::Up => "trending_up",
            TrendDirection::Down => "trending_down",
            TrendDirection::Flat => "trending_flat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackState {
    Unreviewed,
    Confirmed,
    Rejected,
}

impl FeedbackState {
    /// A stored verdict wins. The dashboard endpoint sends only `has_feedback`,
    /// which is set for either verdict, so a bare flag renders as confirmed and
    /// the row stays non-actionable.
    pub fn from_record(human_validation: Option<bool>, has_feedback: Option<bool>) -> Self {
        match (human_validation, has_feedback) {
            (Some(true), _) => Self::Confirmed,
            (Some(false), _) => Self::Rejected,
            (None, Some(true)) => Self::Confirmed,
            (None, _) => Self::Unreviewed,
        }
    }

    /// Unreviewed rows render confirm/reject actions.
    pub const fn is_actionable(self) -> bool {
        matches!(self, FeedbackState::Unreviewed)
    }
}

/// Read-only display row rebuilt on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRiskView {
    pub employee_id: Option<i64>,
    pub display_name: String,
    pub initial: char,
    pub role: String,
    pub department: String,
    pub risk_score: u8,
    pub risk_class: RiskClass,
    pub trend: TrendDirection,
    pub feedback: FeedbackState,
}

impl EmployeeRiskView {
    pub fn css_class(&self) -> &'static str {
        self.risk_class.css_class()
    }

    pub fn trend_icon(&self) -> &'static str {
        self.trend.icon()
    }
}

pub fn normalize(raw: &RawRiskRecord) -> EmployeeRiskView {
    let display_name = raw
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    EmployeeRiskView {
        employee_id: raw.id,
        initial: display_initial(&display_name),
        display_name,
        role: non_blank(raw.role.as_deref()).unwrap_or(DEFAULT_ROLE).to_string(),
        department: non_blank(raw.department.as_deref())
            .unwrap_or(DEFAULT_DEPARTMENT)
            .to_string(),
        risk_score: risk_score(raw),
        risk_class: RiskClass::classify(raw.status.as_deref()),
        trend: TrendDirection::classify(raw.trend.as_deref()),
        feedback: FeedbackState::from_record(raw.human_validation, raw.has_feedback),
    }
}

pub fn display_initial(name: &str) -> char {
    name.trim()
        .chars()
        .next()
        .and_then(|first| first.to_uppercase().next())
        .unwrap_or(PLACEHOLDER_INITIAL)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn risk_score(raw: &RawRiskRecord) -> u8 {
    let percent = raw
        .risk_score
        .or_else(|| raw.burnout_rate.map(|rate| rate * 100.0))
        .filter(|value| value.is_finite())
        .unwrap_or(0.0);

    percent.round().clamp(0.0, 100.0) as u8
}
