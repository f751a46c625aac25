//! Dashboard configuration from environment variables

use std::env;
use std::time::Duration;

/// Simulated network latency applied by the async service entry points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyConfig {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl LatencyConfig {
    /// No artificial delay (tests)
    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    pub fn is_disabled(&self) -> bool {
        self.max_ms == 0
    }

    /// Pick a delay for a unit draw in `[0, 1)`
    pub fn delay_for(&self, unit: f64) -> Duration {
        if self.is_disabled() {
            return Duration::ZERO;
        }
        let (lo, hi) = if self.max_ms >= self.min_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        let span = (hi - lo) as f64;
        Duration::from_millis(lo + (unit.clamp(0.0, 1.0) * span).round() as u64)
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            min_ms: 200,
            max_ms: 450,
        }
    }
}

/// Configuration for the dashboard runtime
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Start the refresh scheduler enabled
    pub auto_refresh_enabled: bool,

    /// Tick cadence in seconds
    pub refresh_interval_secs: u64,

    /// Simulated latency for aggregation calls
    pub latency: LatencyConfig,

    /// Realtime event buffer capacity
    pub event_capacity: usize,

    /// Notification store capacity
    pub notification_capacity: usize,

    /// Probability that a tick also emits a notification
    pub notification_probability: f64,

    /// Seed for every random source (unset = entropy)
    pub rng_seed: Option<u64>,
}

impl DashboardConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `AUTO_REFRESH_ENABLED` (default: true)
    /// - `REFRESH_INTERVAL_SECS` (default: 30)
    /// - `SIMULATED_LATENCY_MIN_MS` (default: 200)
    /// - `SIMULATED_LATENCY_MAX_MS` (default: 450)
    /// - `EVENT_BUFFER_CAPACITY` (default: 100)
    /// - `NOTIFICATION_CAPACITY` (default: 50)
    /// - `NOTIFICATION_PROBABILITY` (default: 0.3)
    /// - `RNG_SEED` (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            auto_refresh_enabled: parse_var("AUTO_REFRESH_ENABLED")
                .unwrap_or(defaults.auto_refresh_enabled),

            refresh_interval_secs: parse_var("REFRESH_INTERVAL_SECS")
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(defaults.refresh_interval_secs),

            latency: LatencyConfig {
                min_ms: parse_var("SIMULATED_LATENCY_MIN_MS").unwrap_or(defaults.latency.min_ms),
                max_ms: parse_var("SIMULATED_LATENCY_MAX_MS").unwrap_or(defaults.latency.max_ms),
            },

            event_capacity: parse_var("EVENT_BUFFER_CAPACITY")
                .filter(|cap: &usize| *cap > 0)
                .unwrap_or(defaults.event_capacity),

            notification_capacity: parse_var("NOTIFICATION_CAPACITY")
                .filter(|cap: &usize| *cap > 0)
                .unwrap_or(defaults.notification_capacity),

            notification_probability: parse_var("NOTIFICATION_PROBABILITY")
                .map(|p: f64| p.clamp(0.0, 1.0))
                .unwrap_or(defaults.notification_probability),

            rng_seed: parse_var("RNG_SEED"),
        }
    }

    /// Zero latency and a fixed seed
    pub fn for_tests() -> Self {
        Self {
            latency: LatencyConfig::none(),
            rng_seed: Some(7),
            ..Self::default()
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            auto_refresh_enabled: true,
            refresh_interval_secs: 30,
            latency: LatencyConfig::default(),
            event_capacity: 100,
            notification_capacity: 50,
            notification_probability: 0.3,
            rng_seed: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both env cases live in one test: env vars are process-global and the
    // test harness runs tests in parallel.
    #[test]
    fn test_config_from_env() {
        env::remove_var("AUTO_REFRESH_ENABLED");
        env::remove_var("REFRESH_INTERVAL_SECS");
        env::remove_var("NOTIFICATION_PROBABILITY");
        env::remove_var("RNG_SEED");

        let config = DashboardConfig::from_env();
        assert!(config.auto_refresh_enabled);
        assert_eq!(config.refresh_interval_secs, 30);
        assert_eq!(config.notification_probability, 0.3);
        assert_eq!(config.rng_seed, None);

        env::set_var("AUTO_REFRESH_ENABLED", "false");
        env::set_var("REFRESH_INTERVAL_SECS", "5");
        env::set_var("NOTIFICATION_PROBABILITY", "1.7");
        env::set_var("RNG_SEED", "99");

        let config = DashboardConfig::from_env();
        assert!(!config.auto_refresh_enabled);
        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(config.notification_probability, 1.0);
        assert_eq!(config.rng_seed, Some(99));

        // Zero interval falls back to the default
        env::set_var("REFRESH_INTERVAL_SECS", "0");
        assert_eq!(DashboardConfig::from_env().refresh_interval_secs, 30);

        env::remove_var("AUTO_REFRESH_ENABLED");
        env::remove_var("REFRESH_INTERVAL_SECS");
        env::remove_var("NOTIFICATION_PROBABILITY");
        env::remove_var("RNG_SEED");
    }

    #[test]
    fn test_latency_delay_bounds() {
        let latency = LatencyConfig::default();
        assert_eq!(latency.delay_for(0.0), Duration::from_millis(200));
        assert_eq!(latency.delay_for(1.0), Duration::from_millis(450));
        assert_eq!(LatencyConfig::none().delay_for(0.5), Duration::ZERO);
    }
}
