//! Error taxonomy for the dashboard data layer
//!
//! Aggregation entry points validate their inputs and fail fast with one of
//! these variants. Divide-by-zero cases (percentages, growth) are resolved to
//! 0 inside the aggregators and never show up here.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("invalid date range: end {end} precedes start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown timeframe: {0:?} (expected daily, weekly, monthly or yearly)")]
    UnknownTimeframe(String),

    #[error("unknown category: {0:?}")]
    UnknownCategory(String),

    #[error("unknown team member: {0:?}")]
    UnknownMember(String),

    #[error("refresh interval must be greater than zero (got {0}s)")]
    InvalidInterval(u64),

    /// Reported by a tick action. The scheduler logs it and keeps ticking.
    #[error("refresh tick failed: {0}")]
    TickFailed(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
