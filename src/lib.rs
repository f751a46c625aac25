//! metricflow - data layer for a sales analytics dashboard
//!
//! Pure aggregations live in [`aggregator_core`]; the live feed and its
//! refresh scheduler live in [`pipeline`]; [`service`] ties both to async
//! entry points for the presentation layer.

pub mod aggregator_core;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod random;
pub mod service;

pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
pub use service::DashboardService;
