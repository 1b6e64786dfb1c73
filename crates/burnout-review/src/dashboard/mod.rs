//! Paginated, filterable employee risk listing.

pub mod controller;
pub mod normalizer;
pub mod query;

use serde::{Deserialize, Serialize};

use crate::api::wire::{lenient_bool, lenient_id, lenient_number, lenient_text};

pub use controller::{DashboardController, DashboardError, DashboardSnapshot};
pub use normalizer::{normalize, EmployeeRiskView, FeedbackState, RiskClass, TrendDirection};
pub use query::{
    paginate, ApplyOutcome, ListFilters, ListingState, Page, PageRequest, PageSize,
    PagedFilteredQuery, QueryState, QueryTicket,
};

/// Loosely-typed employee row as the backend ships it. Every field is
/// optional so that any record shape can be normalized without failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRiskRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub department: Option<String>,
    /// Already on the 0-100 scale.
    #[serde(default, deserialize_with = "lenient_number")]
    pub risk_score: Option<f64>,
    /// Model output on the 0-1 scale; used when `risk_score` is absent.
    #[serde(default, deserialize_with = "lenient_number")]
    pub burnout_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub trend: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub human_validation: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub has_feedback: Option<bool>,
}

/// Aggregate counters the dashboard endpoint computes over the filtered set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub critical_count: u32,
    #[serde(default)]
    pub monitor_count: u32,
    #[serde(default)]
    pub stable_count: u32,
    #[serde(default)]
    pub average_risk_percent: u32,
}

/// `GET /dashboard` response body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardPage {
    #[serde(default)]
    pub employees: Vec<RawRiskRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub summary: Option<DashboardSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
