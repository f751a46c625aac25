//! Aggregator Core - synthetic sales records and the aggregations built on them
//!
//! Everything in here is pure: functions take records (and, where a draw is
//! needed, an injected [`RandomSource`](crate::random::RandomSource)) and
//! return plain data. No state survives a call.
//!
//! # Architecture
//!
//! ```text
//! RecordGenerator (day × season × trend calibrated)
//!     ↓
//! ├─ TimeSeriesAggregator (daily/weekly/monthly/yearly buckets)
//! ├─ CategoryAggregator (revenue share per category)
//! └─ ComparisonEngine (current vs previous PeriodSummary)
//!
//! Team members → RankingEngine (percentile + history trend)
//!              → compare_members (team average + population percentile)
//! ```

pub mod category;
pub mod comparison;
pub mod generator;
pub mod products;
pub mod ranking;
pub mod timeseries;
pub mod types;
pub mod users;

pub use category::CategoryAggregator;
pub use comparison::{growth, ComparisonEngine};
pub use generator::RecordGenerator;
pub use products::TopProduct;
pub use ranking::RankingEngine;
pub use timeseries::{HistoricalPrevious, PreviousPeriodSource, SimulatedPrevious, TimeSeriesAggregator};
pub use types::{
    Category, CategorySummary, DateRange, HourlySales, PeriodComparison, PeriodDeltas, PeriodSummary,
    Ranking, TimeBucket, TimeFrame, TransactionRecord, Trend,
};
pub use users::{PerformanceComparison, TeamMember, TeamPerformance, TrendPoint, UserStats};
