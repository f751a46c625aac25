//! Time-bucketed revenue/order series

use super::types::{round_to, TimeBucket, TimeFrame, TransactionRecord};
use crate::random::RandomSource;
use std::collections::{BTreeMap, HashMap};

/// Supplies the "previous period" revenue shown next to each bucket
///
/// Buckets arrive sorted ascending by key with `previous_revenue` unset.
pub trait PreviousPeriodSource {
    fn fill_previous(&mut self, timeframe: TimeFrame, buckets: &mut [TimeBucket]);
}

/// Placeholder approximation used until a historical store exists
///
/// `previous[i] = revenue[i-1] * uniform(0.85, 1.0)`; the first bucket has no
/// prior and repeats its own revenue.
pub struct SimulatedPrevious<'a> {
    rng: &'a mut dyn RandomSource,
}

impl<'a> SimulatedPrevious<'a> {
    pub fn new(rng: &'a mut dyn RandomSource) -> Self {
        Self { rng }
    }
}

impl PreviousPeriodSource for SimulatedPrevious<'_> {
    fn fill_previous(&mut self, _timeframe: TimeFrame, buckets: &mut [TimeBucket]) {
        let mut prior: Option<f64> = None;
        for bucket in buckets.iter_mut() {
            bucket.previous_revenue = match prior {
                Some(prev) => round_to(prev * self.rng.uniform(0.85, 1.0), 2),
                None => bucket.revenue_sum,
            };
            prior = Some(bucket.revenue_sum);
        }
    }
}

/// Looks up genuine historical revenue by bucket key
///
/// Keys missing from the history resolve to 0.
#[derive(Debug, Clone, Default)]
pub struct HistoricalPrevious {
    history: HashMap<String, f64>,
}

impl HistoricalPrevious {
    pub fn new(history: HashMap<String, f64>) -> Self {
        Self { history }
    }

    pub fn insert(&mut self, key: impl Into<String>, revenue: f64) {
        self.history.insert(key.into(), revenue);
    }
}

impl PreviousPeriodSource for HistoricalPrevious {
    fn fill_previous(&mut self, _timeframe: TimeFrame, buckets: &mut [TimeBucket]) {
        for bucket in buckets.iter_mut() {
            bucket.previous_revenue = self.history.get(&bucket.key).copied().unwrap_or(0.0);
        }
    }
}

pub struct TimeSeriesAggregator;

impl TimeSeriesAggregator {
    /// Group records into buckets sorted ascending by key
    ///
    /// Records sharing a key are summed. `previous_revenue` is filled by
    /// `previous`.
    pub fn group(
        records: &[TransactionRecord],
        timeframe: TimeFrame,
        previous: &mut dyn PreviousPeriodSource,
    ) -> Vec<TimeBucket> {
        // BTreeMap keeps keys unique and ascending
        let mut grouped: BTreeMap<String, TimeBucket> = BTreeMap::new();

        for record in records {
            let key = timeframe.bucket_key(record.date);
            let bucket = grouped.entry(key.clone()).or_insert_with(|| TimeBucket {
                key,
                label: timeframe.bucket_label(record.date),
                revenue_sum: 0.0,
                order_sum: 0,
                previous_revenue: 0.0,
            });
            bucket.revenue_sum += record.revenue;
            bucket.order_sum += record.order_count as u64;
        }

        let mut buckets: Vec<TimeBucket> = grouped
            .into_values()
            .map(|mut b| {
                b.revenue_sum = round_to(b.revenue_sum, 2);
                b
            })
            .collect();

        previous.fill_previous(timeframe, &mut buckets);

        log::debug!(
            "Grouped {} records into {} {} bucket(s)",
            records.len(),
            buckets.len(),
            timeframe
        );
        buckets
    }
}
