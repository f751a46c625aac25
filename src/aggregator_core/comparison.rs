//! Period summaries and current-vs-previous comparison

use super::category::CategoryAggregator;
use super::types::{round_to, PeriodComparison, PeriodDeltas, PeriodSummary, TransactionRecord};

/// Percentage change, one decimal; 0 whenever the baseline is 0
pub fn growth(current: f64, previous: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return 0.0;
    }
    round_to((current - previous) / previous * 100.0, 1)
}

impl PeriodSummary {
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        let total_revenue: f64 = records.iter().map(|r| r.revenue).sum();
        let total_orders: u64 = records.iter().map(|r| r.order_count as u64).sum();
        let total_customers: u64 = records.iter().map(|r| r.customer_count as u64).sum();

        let avg_order_value = if total_orders > 0 {
            round_to(total_revenue / total_orders as f64, 2)
        } else {
            0.0
        };

        let conversion_rate = if total_customers > 0 {
            round_to(total_orders as f64 / total_customers as f64 * 100.0, 2)
        } else {
            0.0
        };

        let top_category = CategoryAggregator::summarize(records)
            .first()
            .filter(|s| s.revenue > 0.0)
            .map(|s| s.category);

        Self {
            total_revenue: round_to(total_revenue, 2),
            total_orders,
            total_customers,
            avg_order_value,
            top_category,
            conversion_rate,
        }
    }
}

pub struct ComparisonEngine;

impl ComparisonEngine {
    /// Summarise both record sets and compute guarded deltas
    ///
    /// Each delta is guarded against its own zero baseline.
    pub fn compare(current: &[TransactionRecord], previous: &[TransactionRecord]) -> PeriodComparison {
        let current = PeriodSummary::from_records(current);
        let previous = PeriodSummary::from_records(previous);
        Self::compare_summaries(current, previous)
    }

    pub fn compare_summaries(current: PeriodSummary, previous: PeriodSummary) -> PeriodComparison {
        let deltas = PeriodDeltas {
            revenue: growth(current.total_revenue, previous.total_revenue),
            orders: growth(current.total_orders as f64, previous.total_orders as f64),
            avg_order_value: growth(current.avg_order_value, previous.avg_order_value),
        };

        PeriodComparison {
            current,
            previous,
            deltas,
        }
    }
}
