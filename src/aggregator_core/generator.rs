//! Synthetic transaction records calibrated by weekday, season and trend

use super::types::{round_to, Category, DateRange, HourlySales, TransactionRecord};
use crate::random::RandomSource;
use chrono::{Datelike, NaiveDate};

/// Weekday multipliers, Sunday first
pub const DAY_MULTIPLIERS: [f64; 7] = [0.6, 1.0, 1.05, 1.1, 1.15, 1.3, 0.8];

/// Month multipliers, January first
pub const SEASON_MULTIPLIERS: [f64; 12] = [
    0.8, 0.85, 0.95, 1.0, 1.0, 0.95, 0.9, 0.95, 1.05, 1.1, 1.3, 1.4,
];

/// Upper bound on the trend bonus reached on the last day of a range
const TREND_SPAN: f64 = 0.1;

pub fn day_multiplier(date: NaiveDate) -> f64 {
    DAY_MULTIPLIERS[date.weekday().num_days_from_sunday() as usize]
}

pub fn season_multiplier(date: NaiveDate) -> f64 {
    SEASON_MULTIPLIERS[date.month0() as usize]
}

/// Produces per-transaction records for a date range
///
/// The random source is the only source of non-determinism; seed it and the
/// output is reproducible.
pub struct RecordGenerator<'a> {
    rng: &'a mut dyn RandomSource,
}

impl<'a> RecordGenerator<'a> {
    pub fn new(rng: &'a mut dyn RandomSource) -> Self {
        Self { rng }
    }

    /// Generate records for every day in `range`
    ///
    /// Per day: `floor(uniform(15,40) * day * season * trend)` records, each
    /// with a uniformly drawn category and `uniform(30,300) * season` revenue.
    pub fn generate(&mut self, range: &DateRange) -> Vec<TransactionRecord> {
        let total_days = range.num_days() as f64;
        let mut records = Vec::new();

        for (day_index, date) in range.days().enumerate() {
            let base_count = self.rng.uniform(15.0, 40.0);
            let season = season_multiplier(date);
            let trend = 1.0 + (day_index as f64 / total_days) * TREND_SPAN;
            let count = (base_count * day_multiplier(date) * season * trend).floor() as usize;

            for seq in 0..count {
                let category = Category::ALL[self.rng.index(Category::ALL.len())];
                let revenue = round_to(self.rng.uniform(30.0, 300.0) * season, 2);
                let customer_count = self.rng.int_inclusive(1, 3) as u32;

                records.push(TransactionRecord {
                    id: format!("txn-{}-{:03}", date.format("%Y%m%d"), seq),
                    date,
                    revenue,
                    order_count: 1,
                    category,
                    customer_count,
                });
            }
        }

        log::debug!(
            "Generated {} records for {} day(s) starting {}",
            records.len(),
            range.num_days(),
            range.start()
        );
        records
    }

    /// Intraday profile: 24 hourly entries with morning/afternoon/evening peaks
    pub fn hourly_profile(&mut self) -> Vec<HourlySales> {
        (0..24)
            .map(|hour| {
                let peak = hour_multiplier(hour);
                let orders = (20.0 * peak + self.rng.uniform(0.0, 15.0)).floor() as u64;
                let avg_order_value = self.rng.uniform(50.0, 150.0);

                HourlySales {
                    hour,
                    label: format!("{:02}:00", hour),
                    revenue: round_to(orders as f64 * avg_order_value, 2),
                    orders,
                }
            })
            .collect()
    }

    /// `days` points of a gently rising series for small inline charts
    ///
    /// `base = uniform(1000, 6000)`; point `i` is
    /// `base * (1 + i/days * 0.2) * uniform(0.8, 1.2)`.
    pub fn sparkline(&mut self, days: usize) -> Vec<f64> {
        let base = self.rng.uniform(1000.0, 6000.0);
        (0..days)
            .map(|i| {
                let trend = 1.0 + i as f64 / days as f64 * 0.2;
                round_to(base * trend * self.rng.uniform(0.8, 1.2), 2)
            })
            .collect()
    }
}

fn hour_multiplier(hour: u32) -> f64 {
    match hour {
        9..=11 => 1.5,
        14..=16 => 1.3,
        19..=21 => 1.4,
        0..=5 => 0.3,
        _ => 1.0,
    }
}

/// Only records whose category is in `categories`
pub fn filter_categories(records: &[TransactionRecord], categories: &[Category]) -> Vec<TransactionRecord> {
    records
        .iter()
        .filter(|r| categories.contains(&r.category))
        .cloned()
        .collect()
}
