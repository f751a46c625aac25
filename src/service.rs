//! Async dashboard entry points
//!
//! `DashboardService` is what the presentation layer calls. It pulls raw
//! records from a [`SalesDataSource`], runs the pure aggregators over them and
//! caches the raw records per date range until the live feed signals an
//! invalidation.

use crate::aggregator_core::category::CategoryAggregator;
use crate::aggregator_core::comparison::ComparisonEngine;
use crate::aggregator_core::generator::{filter_categories, RecordGenerator};
use crate::aggregator_core::products::{self, TopProduct};
use crate::aggregator_core::ranking::RankingEngine;
use crate::aggregator_core::timeseries::{SimulatedPrevious, TimeSeriesAggregator};
use crate::aggregator_core::types::{
    Category, CategorySummary, DateRange, HourlySales, PeriodComparison, PeriodSummary, Ranking,
    TimeBucket, TimeFrame, TransactionRecord,
};
use crate::aggregator_core::users::{
    self, PerformanceComparison, TeamMember, TeamPerformance, TrendPoint, UserStats,
};
use crate::config::{DashboardConfig, LatencyConfig};
use crate::error::{DashboardError, Result};
use crate::random::{RandomSource, SeededRandom};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

pub const DEFAULT_TEAM_SIZE: usize = 20;

/// Where raw sales data comes from
///
/// The simulated source stands in for a remote backend; a real one would
/// query a store.
#[async_trait]
pub trait SalesDataSource: Send + Sync {
    async fn fetch_records(&self, range: &DateRange) -> Result<Vec<TransactionRecord>>;

    async fn fetch_members(&self) -> Result<Vec<TeamMember>>;

    async fn fetch_hourly(&self) -> Result<Vec<HourlySales>>;

    async fn fetch_top_products(&self, range: &DateRange, limit: usize) -> Result<Vec<TopProduct>>;

    /// Recent values of `metric`, oldest first
    async fn fetch_sparkline(&self, metric: &str, days: usize) -> Result<Vec<f64>>;

    /// Daily revenue of `member` over the last `days` days, oldest first
    async fn fetch_performance_trend(&self, member: &TeamMember, days: u32) -> Result<Vec<TrendPoint>>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Generates data on demand after a simulated network delay
pub struct SimulatedSalesSource {
    rng: Mutex<Box<dyn RandomSource>>,
    latency: LatencyConfig,
    team_size: usize,
}

impl SimulatedSalesSource {
    pub fn new(rng: Box<dyn RandomSource>, latency: LatencyConfig) -> Self {
        Self {
            rng: Mutex::new(rng),
            latency,
            team_size: DEFAULT_TEAM_SIZE,
        }
    }

    pub fn with_team_size(mut self, team_size: usize) -> Self {
        self.team_size = team_size;
        self
    }

    async fn simulate_latency(&self) {
        if self.latency.is_disabled() {
            return;
        }
        let delay = {
            let mut rng = lock(&self.rng);
            self.latency.delay_for(rng.next_unit())
        };
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl SalesDataSource for SimulatedSalesSource {
    async fn fetch_records(&self, range: &DateRange) -> Result<Vec<TransactionRecord>> {
        self.simulate_latency().await;
        let mut rng = lock(&self.rng);
        Ok(RecordGenerator::new(&mut **rng).generate(range))
    }

    async fn fetch_members(&self) -> Result<Vec<TeamMember>> {
        self.simulate_latency().await;
        let mut rng = lock(&self.rng);
        Ok(users::generate_members(&mut **rng, self.team_size))
    }

    async fn fetch_hourly(&self) -> Result<Vec<HourlySales>> {
        self.simulate_latency().await;
        let mut rng = lock(&self.rng);
        Ok(RecordGenerator::new(&mut **rng).hourly_profile())
    }

    async fn fetch_top_products(&self, range: &DateRange, limit: usize) -> Result<Vec<TopProduct>> {
        self.simulate_latency().await;
        log::debug!("Top {} product(s) for {} day(s)", limit, range.num_days());
        let mut rng = lock(&self.rng);
        Ok(products::generate_top_products(&mut **rng, limit))
    }

    async fn fetch_sparkline(&self, metric: &str, days: usize) -> Result<Vec<f64>> {
        self.simulate_latency().await;
        log::debug!("Sparkline for {} over {} day(s)", metric, days);
        let mut rng = lock(&self.rng);
        Ok(RecordGenerator::new(&mut **rng).sparkline(days))
    }

    async fn fetch_performance_trend(&self, member: &TeamMember, days: u32) -> Result<Vec<TrendPoint>> {
        self.simulate_latency().await;
        let base = member.performance.revenue / 30.0;
        let today = Utc::now().date_naive();
        let mut rng = lock(&self.rng);
        Ok(users::performance_trend(&mut **rng, base, today, days))
    }
}

#[derive(Default)]
struct Cache {
    generation: u64,
    records: HashMap<DateRange, Arc<Vec<TransactionRecord>>>,
    members: Option<Arc<Vec<TeamMember>>>,
}

pub struct DashboardService {
    source: Arc<dyn SalesDataSource>,
    cache: Mutex<Cache>,
    invalidation: Option<watch::Receiver<u64>>,
    /// Drives the placeholder previous-period approximation
    previous_rng: Mutex<Box<dyn RandomSource>>,
    ranking: RankingEngine,
}

impl DashboardService {
    pub fn new(source: Arc<dyn SalesDataSource>, previous_rng: Box<dyn RandomSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(Cache::default()),
            invalidation: None,
            previous_rng: Mutex::new(previous_rng),
            ranking: RankingEngine::default(),
        }
    }

    /// Simulated source with latency and seeding taken from `config`
    pub fn simulated(config: &DashboardConfig) -> Self {
        // Separate streams for record generation and previous-period draws
        let source_seed = config.rng_seed;
        let previous_seed = config.rng_seed.map(|seed| seed.wrapping_add(1));

        let source = SimulatedSalesSource::new(
            Box::new(SeededRandom::from_optional_seed(source_seed)),
            config.latency,
        );
        Self::new(
            Arc::new(source),
            Box::new(SeededRandom::from_optional_seed(previous_seed)),
        )
    }

    /// Drop cached records whenever `receiver` observes a new generation
    pub fn with_invalidation(mut self, receiver: watch::Receiver<u64>) -> Self {
        self.invalidation = Some(receiver);
        self
    }

    pub fn with_ranking(mut self, ranking: RankingEngine) -> Self {
        self.ranking = ranking;
        self
    }

    /// Lock the cache, clearing it first if the feed has refreshed since
    fn fresh_cache(&self) -> MutexGuard<'_, Cache> {
        let mut cache = lock(&self.cache);
        if let Some(receiver) = &self.invalidation {
            let generation = *receiver.borrow();
            if generation != cache.generation {
                log::debug!(
                    "Cache invalidated (generation {} -> {}), dropping {} range(s)",
                    cache.generation,
                    generation,
                    cache.records.len()
                );
                cache.records.clear();
                cache.members = None;
                cache.generation = generation;
            }
        }
        cache
    }

    // Results fetched across an invalidation are returned but never cached
    async fn records(&self, range: &DateRange) -> Result<Arc<Vec<TransactionRecord>>> {
        let generation = {
            let cache = self.fresh_cache();
            if let Some(records) = cache.records.get(range) {
                return Ok(records.clone());
            }
            cache.generation
        };

        let records = Arc::new(self.source.fetch_records(range).await?);

        let mut cache = self.fresh_cache();
        if cache.generation == generation {
            cache.records.insert(*range, records.clone());
        }
        Ok(records)
    }

    async fn members(&self) -> Result<Arc<Vec<TeamMember>>> {
        let generation = {
            let cache = self.fresh_cache();
            if let Some(members) = &cache.members {
                return Ok(members.clone());
            }
            cache.generation
        };

        let members = Arc::new(self.source.fetch_members().await?);

        let mut cache = self.fresh_cache();
        if cache.generation == generation {
            cache.members = Some(members.clone());
        }
        Ok(members)
    }

    /// Raw records for `range`
    pub async fn sales_data(&self, range: &DateRange) -> Result<Vec<TransactionRecord>> {
        Ok(self.records(range).await?.as_ref().clone())
    }

    /// Revenue and orders bucketed by `timeframe`
    ///
    /// Fails with `UnknownTimeframe` before any data is fetched.
    pub async fn revenue_series(&self, range: &DateRange, timeframe: &str) -> Result<Vec<TimeBucket>> {
        let timeframe: TimeFrame = timeframe.parse()?;
        let records = self.records(range).await?;

        let mut rng = lock(&self.previous_rng);
        let mut previous = SimulatedPrevious::new(&mut **rng);
        Ok(TimeSeriesAggregator::group(&records, timeframe, &mut previous))
    }

    /// Category breakdown; an empty `filter` means every category
    pub async fn category_sales<S: AsRef<str> + Sync>(
        &self,
        range: &DateRange,
        filter: &[S],
    ) -> Result<Vec<CategorySummary>> {
        let categories = Category::parse_filter(filter)?;
        let records = self.records(range).await?;
        Ok(CategoryAggregator::summarize_for(&records, &categories))
    }

    pub async fn sales_summary(&self, range: &DateRange) -> Result<PeriodSummary> {
        let records = self.records(range).await?;
        Ok(PeriodSummary::from_records(&records))
    }

    /// Summary restricted to `filter` categories
    pub async fn filtered_summary<S: AsRef<str> + Sync>(
        &self,
        range: &DateRange,
        filter: &[S],
    ) -> Result<PeriodSummary> {
        let categories = Category::parse_filter(filter)?;
        let records = self.records(range).await?;
        Ok(PeriodSummary::from_records(&filter_categories(&records, &categories)))
    }

    /// `range` against the equally long period right before it
    pub async fn sales_comparison(&self, range: &DateRange) -> Result<PeriodComparison> {
        let current = self.records(range).await?;
        let previous = self.records(&range.previous_period()).await?;
        Ok(ComparisonEngine::compare(&current, &previous))
    }

    pub async fn sales_by_hour(&self) -> Result<Vec<HourlySales>> {
        self.source.fetch_hourly().await
    }

    pub async fn top_performers(&self, limit: usize) -> Result<Vec<Ranking<TeamMember>>> {
        let members = self.members().await?;
        Ok(users::rank_by_revenue(&self.ranking, &members, limit))
    }

    /// Every member, ranked
    pub async fn user_rankings(&self) -> Result<Vec<Ranking<TeamMember>>> {
        let members = self.members().await?;
        Ok(users::rank_by_revenue(&self.ranking, &members, members.len()))
    }

    pub async fn team_members(&self) -> Result<Vec<TeamMember>> {
        Ok(self.members().await?.as_ref().clone())
    }

    pub async fn team_performance(&self) -> Result<Vec<TeamPerformance>> {
        let members = self.members().await?;
        Ok(users::team_performance(&members))
    }

    pub async fn user_stats(&self) -> Result<UserStats> {
        let members = self.members().await?;
        Ok(users::user_stats(&members))
    }

    pub async fn member_by_id(&self, id: &str) -> Result<Option<TeamMember>> {
        let members = self.members().await?;
        Ok(users::find_member(&members, id).cloned())
    }

    /// Side-by-side metrics for the requested members
    pub async fn compare_members<S: AsRef<str> + Sync>(&self, ids: &[S]) -> Result<Vec<PerformanceComparison>> {
        let members = self.members().await?;
        Ok(users::compare_members(&members, ids))
    }

    pub async fn performance_trend(&self, user_id: &str, days: u32) -> Result<Vec<TrendPoint>> {
        let members = self.members().await?;
        let member = users::find_member(&members, user_id)
            .ok_or_else(|| DashboardError::UnknownMember(user_id.to_string()))?;
        self.source.fetch_performance_trend(member, days).await
    }

    /// Best sellers for `range`, at most `limit`
    pub async fn top_products(&self, range: &DateRange, limit: usize) -> Result<Vec<TopProduct>> {
        self.source.fetch_top_products(range, limit).await
    }

    pub async fn sparkline(&self, metric: &str, days: usize) -> Result<Vec<f64>> {
        self.source.fetch_sparkline(metric, days).await
    }
}
