//! Server state shared across handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::config::ServerConfig;
use crate::codec::StrategySelector;
use crate::demo::{DemoApplication, DemoMonitor};
use crate::monitor::{CompressionMonitor, CompressionStats, LoggingMonitor};

/// Application state shared across handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Selector applied to UIDL responses
    pub selector: StrategySelector,
    /// Aggregated statistics
    pub stats: Arc<CompressionStats>,
    /// Demo payload producer
    pub demo: Arc<DemoApplication>,
    /// Demo statistics report
    pub demo_monitor: Arc<DemoMonitor>,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state with the built-in monitors
    pub fn new(config: ServerConfig) -> Self {
        Self::with_monitors(config, Vec::new())
    }

    /// Create state registering `extra` monitors after the built-in ones
    pub fn with_monitors(config: ServerConfig, extra: Vec<Arc<dyn CompressionMonitor>>) -> Self {
        let stats = Arc::new(CompressionStats::new());
        let demo = Arc::new(DemoApplication::new());
        let demo_monitor = Arc::new(DemoMonitor::new(Arc::clone(&demo)));

        let mut selector = StrategySelector::new()
            .with_strategy(config.strategy)
            .with_codec(config.codec)
            .with_monitor(stats.clone())
            .with_monitor(Arc::new(LoggingMonitor));

        if config.demo_enabled {
            selector = selector.with_monitor(demo_monitor.clone());
        }
        for monitor in extra {
            selector = selector.with_monitor(monitor);
        }

        tracing::info!("Using {} compression strategy", config.strategy);

        Self {
            config,
            selector,
            stats,
            demo,
            demo_monitor,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CompressionStrategy;

    #[test]
    fn test_state_wires_monitors() {
        let state = AppState::new(ServerConfig::default());
        assert_eq!(state.selector.monitors().len(), 3);
        assert_eq!(state.selector.strategy(), CompressionStrategy::Adaptive);
    }

    #[test]
    fn test_state_without_demo() {
        let config = ServerConfig::default()
            .with_strategy(CompressionStrategy::Strict)
            .without_demo();
        let state = AppState::with_monitors(config, vec![Arc::new(LoggingMonitor)]);

        assert_eq!(state.selector.monitors().len(), 3);
        assert_eq!(state.selector.strategy(), CompressionStrategy::Strict);
    }
}
