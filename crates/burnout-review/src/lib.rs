//! Review-and-dashboard state controller for human-in-the-loop burnout risk
//! predictions.
//!
//! [`dashboard::DashboardController`] keeps a paged, filtered employee risk
//! listing. [`review::ReviewQueueController`] walks one pending prediction at
//! a time through detail, verdict and submission. Both talk to the backend
//! only through an injected [`api::BurnoutApi`].

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logs;
pub mod review;
pub mod telemetry;
