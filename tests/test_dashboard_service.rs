//! Integration tests for the dashboard service wired to the live feed
//!
//! Verifies that refreshes invalidate cached records and that the aggregate
//! properties hold over generated data.

#[cfg(test)]
mod dashboard_service_tests {
    use chrono::NaiveDate;
    use metricflow::aggregator_core::types::{DateRange, TimeFrame};
    use metricflow::config::DashboardConfig;
    use metricflow::pipeline::LiveFeed;
    use metricflow::random::SeededRandom;
    use metricflow::service::DashboardService;
    use metricflow::DashboardError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_invalidates_cached_records() {
        let config = DashboardConfig::for_tests();
        let feed = LiveFeed::new(&config, Box::new(SeededRandom::from_seed(3)));
        let service = DashboardService::simulated(&config).with_invalidation(feed.subscribe_invalidation());
        let range = DateRange::new(date(2024, 6, 1), date(2024, 6, 14)).unwrap();

        let first = service.sales_data(&range).await.unwrap();
        assert_eq!(service.sales_data(&range).await.unwrap(), first);

        feed.refresh();

        assert_ne!(service.sales_data(&range).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_series_keys_strictly_ascending() {
        let service = DashboardService::simulated(&DashboardConfig::for_tests());
        let range = DateRange::new(date(2023, 11, 15), date(2024, 2, 20)).unwrap();

        for timeframe in TimeFrame::all() {
            let buckets = service.revenue_series(&range, timeframe.as_str()).await.unwrap();
            assert!(!buckets.is_empty());
            assert!(
                buckets.windows(2).all(|w| w[0].key < w[1].key),
                "{} keys not ascending",
                timeframe
            );
        }
    }

    #[tokio::test]
    async fn test_category_shares_over_full_set() {
        let service = DashboardService::simulated(&DashboardConfig::for_tests());
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        let summaries = service.category_sales::<&str>(&range, &[]).await.unwrap();

        assert_eq!(summaries.len(), 6);
        assert!(summaries.windows(2).all(|w| w[0].revenue >= w[1].revenue));
        let total: f64 = summaries.iter().map(|s| s.percentage).sum();
        assert!((total - 100.0).abs() <= 0.1, "total {}", total);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DateRange::new(date(2024, 5, 2), date(2024, 5, 1)).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRange { .. }));
    }
}
