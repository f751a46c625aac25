//! Revenue share per category

use super::types::{round_to, Category, CategorySummary, TransactionRecord};
use std::collections::HashMap;

pub struct CategoryAggregator;

impl CategoryAggregator {
    /// One entry per fixed category, sorted descending by revenue
    ///
    /// Categories without activity are kept with zero revenue/orders.
    pub fn summarize(records: &[TransactionRecord]) -> Vec<CategorySummary> {
        Self::summarize_for(records, &Category::ALL)
    }

    /// Like [`summarize`](Self::summarize) but restricted to `categories`
    ///
    /// Records outside the selection are ignored and percentages are shares of
    /// the selection's total.
    pub fn summarize_for(records: &[TransactionRecord], categories: &[Category]) -> Vec<CategorySummary> {
        let mut totals: HashMap<Category, (f64, u64)> = HashMap::new();
        for record in records.iter().filter(|r| categories.contains(&r.category)) {
            let entry = totals.entry(record.category).or_insert((0.0, 0));
            entry.0 += record.revenue;
            entry.1 += record.order_count as u64;
        }

        let revenues: Vec<f64> = categories
            .iter()
            .map(|c| totals.get(c).map(|t| t.0).unwrap_or(0.0))
            .collect();
        let percentages = share_percentages(&revenues);

        let mut summaries: Vec<CategorySummary> = categories
            .iter()
            .zip(percentages)
            .map(|(category, percentage)| {
                let (revenue, orders) = totals.get(category).copied().unwrap_or((0.0, 0));
                CategorySummary {
                    category: *category,
                    revenue: round_to(revenue, 2),
                    orders,
                    percentage,
                    color_token: category.color_token().to_string(),
                }
            })
            .collect();

        // Stable sort keeps the fixed category order among equal revenues
        summaries.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        summaries
    }
}

/// Percent shares rounded to one decimal that add up to exactly 100.0
///
/// Unlike rounding each `v / total * 100` on its own, which over six
/// categories can miss 100 by up to 0.3, every share is floored to a tenth and
/// the leftover tenths go to the entries with the largest remainders. Each
/// share therefore stays within 0.1 of its exact value. All shares are 0 when
/// the total is 0.
pub fn share_percentages(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return vec![0.0; values.len()];
    }

    let exact: Vec<f64> = values.iter().map(|v| v / total * 1000.0).collect();
    let mut tenths: Vec<u64> = exact.iter().map(|e| e.floor() as u64).collect();

    let assigned: u64 = tenths.iter().sum();
    let mut leftover = 1000u64.saturating_sub(assigned);

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra)
    });

    for idx in order {
        if leftover == 0 {
            break;
        }
        tenths[idx] += 1;
        leftover -= 1;
    }

    tenths.into_iter().map(|t| t as f64 / 10.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator_core::generator::RecordGenerator;
    use crate::aggregator_core::types::DateRange;
    use crate::random::SeededRandom;
    use chrono::NaiveDate;

    fn record(category: Category, revenue: f64) -> TransactionRecord {
        TransactionRecord {
            id: "t".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            revenue,
            order_count: 1,
            category,
            customer_count: 1,
        }
    }

    #[test]
    fn test_percentages_sum_to_100() {
        for seed in 0..20 {
            let mut rng = SeededRandom::from_seed(seed);
            let range = DateRange::new(
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
            )
            .unwrap();
            let records = RecordGenerator::new(&mut rng).generate(&range);

            let summaries = CategoryAggregator::summarize(&records);
            let sum: f64 = summaries.iter().map(|s| s.percentage).sum();

            assert_eq!(summaries.len(), 6);
            assert!((sum - 100.0).abs() <= 0.1, "seed {}: sum {}", seed, sum);
        }
    }

    #[test]
    fn test_thirds_still_sum_to_100() {
        let shares = share_percentages(&[1.0, 1.0, 1.0]);
        let sum: f64 = shares.iter().sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!(shares.iter().all(|s| *s == 33.3 || *s == 33.4));
    }

    #[test]
    fn test_each_share_close_to_exact() {
        // Per-entry rounding would give 16.7 six times, i.e. 100.2
        let values = [1.0; 6];
        let shares = share_percentages(&values);
        let sum: f64 = shares.iter().sum();
        assert!((sum - 100.0).abs() < 1e-9, "sum {}", sum);

        let uneven = [120.5, 3.25, 77.0, 0.0, 41.75, 9.5];
        let total: f64 = uneven.iter().sum();
        for (value, share) in uneven.iter().zip(share_percentages(&uneven)) {
            let exact = value / total * 100.0;
            assert!((share - exact).abs() < 0.1 + 1e-9, "{} vs {}", share, exact);
        }
    }

    #[test]
    fn test_zero_revenue_all_zero() {
        let summaries = CategoryAggregator::summarize(&[]);
        assert_eq!(summaries.len(), 6);
        assert!(summaries.iter().all(|s| s.percentage == 0.0 && s.orders == 0));
        // Fixed order preserved among ties
        assert_eq!(summaries[0].category, Category::Electronics);
    }

    #[test]
    fn test_sorted_descending_with_inactive_categories() {
        let records = vec![
            record(Category::Books, 50.0),
            record(Category::Sports, 150.0),
            record(Category::Books, 50.0),
        ];

        let summaries = CategoryAggregator::summarize(&records);

        assert_eq!(summaries[0].category, Category::Sports);
        assert_eq!(summaries[0].percentage, 60.0);
        assert_eq!(summaries[1].category, Category::Books);
        assert_eq!(summaries[1].orders, 2);
        assert_eq!(summaries[1].percentage, 40.0);
        assert!(summaries[2..].iter().all(|s| s.revenue == 0.0));
        assert_eq!(summaries[0].color_token, "chart-4");
    }

    #[test]
    fn test_filtered_summary_normalises_over_selection() {
        let records = vec![
            record(Category::Books, 25.0),
            record(Category::Sports, 75.0),
            record(Category::Electronics, 900.0),
        ];

        let summaries = CategoryAggregator::summarize_for(&records, &[Category::Books, Category::Sports]);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].percentage, 75.0);
        assert_eq!(summaries[1].percentage, 25.0);
    }
}
