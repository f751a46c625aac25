//! Metric-based ranking with history-derived trends

use super::comparison::growth;
use super::types::{Ranking, Trend};

pub struct RankingEngine {
    /// Dead band (in percent) around zero change that still counts as stable
    stable_band_pct: f64,
}

impl RankingEngine {
    pub fn new(stable_band_pct: f64) -> Self {
        Self {
            stable_band_pct: stable_band_pct.abs(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(2.0)
    }

    /// Classify a change against a historical value
    pub fn classify(&self, delta_pct: Option<f64>) -> Trend {
        match delta_pct {
            Some(delta) if delta > self.stable_band_pct => Trend::Up,
            Some(delta) if delta < -self.stable_band_pct => Trend::Down,
            _ => Trend::Stable,
        }
    }

    /// Rank `entities` descending by `metric`, keeping the first `limit`
    ///
    /// `rank` is 1-based and `percentile = round((1 - index/total) * 100)`
    /// over the full population. `history` returns the entity's previous value
    /// for the same metric; entities without history are `Stable`.
    pub fn rank<T, M, H>(&self, entities: &[T], metric: M, history: H, limit: usize) -> Vec<Ranking<T>>
    where
        T: Clone,
        M: Fn(&T) -> f64,
        H: Fn(&T) -> Option<f64>,
    {
        let total = entities.len();
        let mut scored: Vec<(f64, &T)> = entities.iter().map(|e| (metric(e), e)).collect();
        // Stable sort: ties keep input order
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        scored
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, (value, entity))| {
                let delta_pct = history(entity).map(|previous| growth(value, previous));
                Ranking {
                    entity: entity.clone(),
                    rank: index + 1,
                    percentile: ((1.0 - index as f64 / total as f64) * 100.0).round() as u32,
                    value,
                    delta_pct,
                    trend: self.classify(delta_pct),
                }
            })
            .collect()
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Rep {
        name: &'static str,
        revenue: f64,
        previous: Option<f64>,
    }

    fn rep(name: &'static str, revenue: f64, previous: Option<f64>) -> Rep {
        Rep { name, revenue, previous }
    }

    #[test]
    fn test_rank_order_and_percentile() {
        let reps = vec![
            rep("a", 10.0, None),
            rep("b", 40.0, None),
            rep("c", 30.0, None),
            rep("d", 20.0, None),
        ];

        let ranked = RankingEngine::with_defaults().rank(&reps, |r| r.revenue, |r| r.previous, 10);

        let names: Vec<_> = ranked.iter().map(|r| r.entity.name).collect();
        assert_eq!(names, vec!["b", "c", "d", "a"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].percentile, 100);
        assert_eq!(ranked[1].percentile, 75);
        assert_eq!(ranked[3].percentile, 25);
    }

    #[test]
    fn test_limit_keeps_population_percentile() {
        let reps: Vec<Rep> = (0..20).map(|i| rep("x", i as f64, None)).collect();

        let ranked = RankingEngine::with_defaults().rank(&reps, |r| r.revenue, |r| r.previous, 5);

        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[4].rank, 5);
        assert_eq!(ranked[4].percentile, 80);
    }

    #[test]
    fn test_trend_from_history() {
        let reps = vec![
            rep("up", 110.0, Some(100.0)),
            rep("flat", 101.0, Some(100.0)),
            rep("down", 90.0, Some(100.0)),
            rep("new", 50.0, None),
            rep("zero-base", 40.0, Some(0.0)),
        ];

        let ranked = RankingEngine::with_defaults().rank(&reps, |r| r.revenue, |r| r.previous, 10);

        assert_eq!(ranked[0].trend, Trend::Up);
        assert_eq!(ranked[0].delta_pct, Some(10.0));
        assert_eq!(ranked[1].trend, Trend::Stable);
        assert_eq!(ranked[2].trend, Trend::Down);
        assert_eq!(ranked[3].trend, Trend::Stable);
        assert_eq!(ranked[3].delta_pct, None);
        assert_eq!(ranked[4].delta_pct, Some(0.0));
    }

    #[test]
    fn test_empty_population() {
        let ranked = RankingEngine::with_defaults().rank(&Vec::<Rep>::new(), |r| r.revenue, |r| r.previous, 5);
        assert!(ranked.is_empty());
    }
}
