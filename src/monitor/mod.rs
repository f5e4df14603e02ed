//! Compression monitors.
//!
//! A monitor receives one [`PayloadMeasurement`] for every payload the
//! selector compressed. Monitors are registered when the selector is
//! built; delivery is synchronous and a failing monitor never affects
//! the response.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uidl_compressor::{CompressionStats, StrategySelector};
//!
//! let stats = Arc::new(CompressionStats::new());
//! let selector = StrategySelector::new().with_monitor(stats.clone());
//! selector.select(payload)?;
//! println!("{:?}", stats.summary());
//! ```

mod stats;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub use stats::{CompressionStats, StatsSummary};

use crate::codec::PayloadMeasurement;
use crate::error::{CompressorError, Result};

/// Receiver of payload measurements
pub trait CompressionMonitor: Send + Sync {
    /// Called once per compressed payload with its three sizes
    fn compression_processed(&self, measurement: PayloadMeasurement) -> Result<()>;

    /// Name used in log messages
    fn name(&self) -> &str {
        "monitor"
    }
}

/// Ordered set of registered monitors
#[derive(Clone, Default)]
pub struct Monitors {
    monitors: Vec<Arc<dyn CompressionMonitor>>,
}

impl std::fmt::Debug for Monitors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.monitors.iter().map(|m| m.name()))
            .finish()
    }
}

impl Monitors {
    /// Create empty monitor set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a monitor
    pub fn register(&mut self, monitor: Arc<dyn CompressionMonitor>) {
        self.monitors.push(monitor);
    }

    /// Number of registered monitors
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Whether no monitor is registered
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Deliver a measurement to every monitor.
    ///
    /// Errors and panics raised by a monitor are logged and skipped.
    /// Returns the number of monitors that failed.
    pub fn notify(&self, measurement: PayloadMeasurement) -> usize {
        let mut failures = 0;

        for monitor in &self.monitors {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                monitor.compression_processed(measurement)
            }));

            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(panic) => CompressorError::Observer(panic_message(panic.as_ref())),
            };

            failures += 1;
            tracing::warn!(
                monitor = monitor.name(),
                raw_bytes = measurement.raw_bytes,
                "Compression monitor failed: {}",
                error
            );
        }

        failures
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "monitor panicked".to_string()
    }
}

/// Monitor writing every measurement to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMonitor;

impl CompressionMonitor for LoggingMonitor {
    fn compression_processed(&self, measurement: PayloadMeasurement) -> Result<()> {
        tracing::debug!(
            raw_bytes = measurement.raw_bytes,
            compressed_bytes = measurement.compressed_bytes,
            encoded_bytes = measurement.encoded_bytes,
            "Payload compressed ({:.0}%)",
            measurement.compression_rate()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}
