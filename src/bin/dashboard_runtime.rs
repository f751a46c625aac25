//! Dashboard Runtime - live feed and auto-refresh host
//!
//! This binary owns the process-wide dashboard state:
//! - Builds the `LiveFeed` (event buffer + notification store)
//! - Starts the `RefreshScheduler` when auto-refresh is enabled
//! - Wires the `DashboardService` cache to the feed's invalidation channel
//! - Logs a summary snapshot after every refresh until CTRL+C
//!
//! Usage:
//!   cargo run --release --bin dashboard_runtime
//!
//! Environment variables:
//!   AUTO_REFRESH_ENABLED - Start ticking on boot (default: true)
//!   REFRESH_INTERVAL_SECS - Tick cadence (default: 30)
//!   SIMULATED_LATENCY_MIN_MS / SIMULATED_LATENCY_MAX_MS (default: 200 / 450)
//!   RNG_SEED - Deterministic data when set

use chrono::{Duration, Utc};
use dotenv::dotenv;
use log::{error, info, warn};
use metricflow::aggregator_core::types::DateRange;
use metricflow::config::DashboardConfig;
use metricflow::pipeline::{LiveFeed, RefreshScheduler};
use metricflow::random::SeededRandom;
use metricflow::service::DashboardService;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize environment and logging
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("🚀 Dashboard Runtime");

    let config = DashboardConfig::from_env();
    info!("   ├─ Auto-refresh: {}", if config.auto_refresh_enabled { "ON" } else { "OFF" });
    info!("   ├─ Interval: {}s", config.refresh_interval_secs);
    info!(
        "   ├─ Simulated latency: {}-{}ms",
        config.latency.min_ms, config.latency.max_ms
    );
    info!(
        "   ├─ Capacities: {} events / {} notifications",
        config.event_capacity, config.notification_capacity
    );
    match config.rng_seed {
        Some(seed) => info!("   └─ RNG seed: {}", seed),
        None => info!("   └─ RNG seed: entropy"),
    }

    let feed_seed = config.rng_seed.map(|seed| seed.wrapping_add(2));
    let feed = Arc::new(LiveFeed::new(
        &config,
        Box::new(SeededRandom::from_optional_seed(feed_seed)),
    ));
    let service = DashboardService::simulated(&config).with_invalidation(feed.subscribe_invalidation());
    info!("✅ LiveFeed and DashboardService created");

    let scheduler = RefreshScheduler::new(feed.clone(), config.refresh_interval_secs)?;
    scheduler.set_enabled(config.auto_refresh_enabled);

    let today = Utc::now().date_naive();
    let range = DateRange::new(today - Duration::days(29), today)?;

    // Initial snapshot
    log_snapshot(&service, &range).await;

    let mut invalidation = feed.subscribe_invalidation();
    info!("🔄 Press CTRL+C to shutdown gracefully");

    loop {
        tokio::select! {
            changed = invalidation.changed() => {
                if changed.is_err() {
                    warn!("⚠️  Invalidation channel closed");
                    break;
                }
                if let Some(event) = feed.recent_events(1).first() {
                    info!("📣 [{}] {}: {}", event.kind.as_str(), event.title, event.description);
                }
                info!("   └─ Unread notifications: {}", feed.unread_count());
                log_snapshot(&service, &range).await;
            }
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => info!("⚠️  Received CTRL+C, shutting down..."),
                    Err(err) => error!("❌ Failed to listen for CTRL+C: {}", err),
                }
                break;
            }
        }
    }

    scheduler.stop();
    let stats = scheduler.stats();
    info!(
        "✅ Dashboard runtime stopped ({} ticks, {} failed)",
        stats.ticks_completed, stats.ticks_failed
    );
    Ok(())
}

async fn log_snapshot(service: &DashboardService, range: &DateRange) {
    match service.sales_comparison(range).await {
        Ok(comparison) => match serde_json::to_string(&comparison) {
            Ok(json) => info!("📊 Last 30 days: {}", json),
            Err(e) => error!("❌ Failed to serialise comparison: {}", e),
        },
        Err(e) => error!("❌ Failed to compute comparison: {}", e),
    }
}
