//! Compression statistics tracking.
//!
//! Aggregates measurements delivered to the monitor interface together
//! with what the HTTP stage actually sent.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::CompressionMonitor;
use crate::codec::{PayloadForm, PayloadMeasurement};
use crate::error::Result;

/// Number of latencies kept for percentile calculation
const LATENCY_WINDOW: usize = 1000;

/// Thread-safe compression statistics
#[derive(Debug, Default)]
pub struct CompressionStats {
    /// Payloads measured by the selector
    measured: AtomicU64,
    /// Total raw payload bytes measured
    raw_bytes: AtomicU64,
    /// Total gzip bytes measured
    compressed_bytes: AtomicU64,
    /// Total base64 bytes measured
    encoded_bytes: AtomicU64,
    /// Responses written by the HTTP stage
    responses: AtomicU64,
    /// Responses sent raw
    raw_responses: AtomicU64,
    /// Responses sent gzip+base64
    encoded_responses: AtomicU64,
    /// Responses sent without measurement (strategy off)
    passthrough_responses: AtomicU64,
    /// Bytes put on the wire
    bytes_sent: AtomicU64,
    /// Failed compressions
    errors: AtomicU64,
    /// Time spent in the compression stage
    latencies: RwLock<Vec<Duration>>,
    /// Start time
    started_at: RwLock<Option<Instant>>,
}

impl CompressionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self {
            started_at: RwLock::new(Some(Instant::now())),
            ..Default::default()
        }
    }

    /// Record a measurement
    pub fn record_measurement(&self, measurement: PayloadMeasurement) {
        self.measured.fetch_add(1, Ordering::Relaxed);
        self.raw_bytes
            .fetch_add(measurement.raw_bytes as u64, Ordering::Relaxed);
        self.compressed_bytes
            .fetch_add(measurement.compressed_bytes as u64, Ordering::Relaxed);
        self.encoded_bytes
            .fetch_add(measurement.encoded_bytes as u64, Ordering::Relaxed);
    }

    /// Record a written response
    pub fn record_response(
        &self,
        form: PayloadForm,
        measured: bool,
        sent_bytes: usize,
        latency: Duration,
    ) {
        self.responses.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent
            .fetch_add(sent_bytes as u64, Ordering::Relaxed);

        match (form, measured) {
            (PayloadForm::Encoded, _) => self.encoded_responses.fetch_add(1, Ordering::Relaxed),
            (PayloadForm::Raw, true) => self.raw_responses.fetch_add(1, Ordering::Relaxed),
            (PayloadForm::Raw, false) => {
                self.passthrough_responses.fetch_add(1, Ordering::Relaxed)
            },
        };

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.push(latency);
            if latencies.len() > LATENCY_WINDOW {
                latencies.remove(0);
            }
        }
    }

    /// Record a failed compression
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get number of measured payloads
    pub fn total_measured(&self) -> u64 {
        self.measured.load(Ordering::Relaxed)
    }

    /// Get number of written responses
    pub fn total_responses(&self) -> u64 {
        self.responses.load(Ordering::Relaxed)
    }

    /// Get total raw bytes measured
    pub fn total_raw_bytes(&self) -> u64 {
        self.raw_bytes.load(Ordering::Relaxed)
    }

    /// Get total gzip bytes measured
    pub fn total_compressed_bytes(&self) -> u64 {
        self.compressed_bytes.load(Ordering::Relaxed)
    }

    /// Get total base64 bytes measured
    pub fn total_encoded_bytes(&self) -> u64 {
        self.encoded_bytes.load(Ordering::Relaxed)
    }

    /// Get total bytes put on the wire
    pub fn total_bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    /// Get total errors
    pub fn total_errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Get gzip ratio over all measured payloads (0.0-1.0, lower is better)
    pub fn compression_ratio(&self) -> f64 {
        let raw = self.total_raw_bytes();
        if raw == 0 {
            1.0
        } else {
            self.total_compressed_bytes() as f64 / raw as f64
        }
    }

    /// Get gzip savings percentage
    pub fn compression_rate(&self) -> f64 {
        (1.0 - self.compression_ratio()) * 100.0
    }

    /// Get p50 latency
    pub fn p50_latency(&self) -> Option<Duration> {
        self.percentile_latency(50)
    }

    /// Get p99 latency
    pub fn p99_latency(&self) -> Option<Duration> {
        self.percentile_latency(99)
    }

    fn percentile_latency(&self, percentile: usize) -> Option<Duration> {
        let latencies = self.latencies.read().ok()?;
        if latencies.is_empty() {
            return None;
        }

        let mut sorted = latencies.clone();
        sorted.sort();

        let idx = (sorted.len() * percentile / 100).min(sorted.len() - 1);
        Some(sorted[idx])
    }

    /// Get uptime
    pub fn uptime(&self) -> Duration {
        self.started_at
            .read()
            .ok()
            .and_then(|s| s.map(|start| start.elapsed()))
            .unwrap_or_default()
    }

    /// Get summary as JSON-compatible struct
    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            measured_payloads: self.total_measured(),
            responses: self.total_responses(),
            raw_responses: self.raw_responses.load(Ordering::Relaxed),
            encoded_responses: self.encoded_responses.load(Ordering::Relaxed),
            passthrough_responses: self.passthrough_responses.load(Ordering::Relaxed),
            errors: self.total_errors(),
            raw_bytes: self.total_raw_bytes(),
            compressed_bytes: self.total_compressed_bytes(),
            encoded_bytes: self.total_encoded_bytes(),
            bytes_sent: self.total_bytes_sent(),
            compression_rate: self.compression_rate(),
            p50_latency_ms: self.p50_latency().map(|d| d.as_secs_f64() * 1000.0),
            p99_latency_ms: self.p99_latency().map(|d| d.as_secs_f64() * 1000.0),
            uptime_secs: self.uptime().as_secs(),
        }
    }

    /// Reset all statistics
    pub fn reset(&self) {
        for counter in [
            &self.measured,
            &self.raw_bytes,
            &self.compressed_bytes,
            &self.encoded_bytes,
            &self.responses,
            &self.raw_responses,
            &self.encoded_responses,
            &self.passthrough_responses,
            &self.bytes_sent,
            &self.errors,
        ] {
            counter.store(0, Ordering::Relaxed);
        }

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.clear();
        }

        if let Ok(mut started) = self.started_at.write() {
            *started = Some(Instant::now());
        }
    }
}

impl CompressionMonitor for CompressionStats {
    fn compression_processed(&self, measurement: PayloadMeasurement) -> Result<()> {
        self.record_measurement(measurement);
        Ok(())
    }

    fn name(&self) -> &str {
        "stats"
    }
}

/// Statistics summary for serialization.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatsSummary {
    /// Payloads measured by the selector.
    pub measured_payloads: u64,
    /// Responses written by the HTTP stage.
    pub responses: u64,
    /// Responses sent raw after measuring.
    pub raw_responses: u64,
    /// Responses sent as gzip+base64.
    pub encoded_responses: u64,
    /// Responses sent with compression off.
    pub passthrough_responses: u64,
    /// Failed compressions.
    pub errors: u64,
    /// Total raw bytes measured.
    pub raw_bytes: u64,
    /// Total gzip bytes measured.
    pub compressed_bytes: u64,
    /// Total base64 bytes measured.
    pub encoded_bytes: u64,
    /// Total bytes put on the wire.
    pub bytes_sent: u64,
    /// Percentage of raw bytes removed by gzip.
    pub compression_rate: f64,
    /// 50th percentile stage latency in milliseconds.
    pub p50_latency_ms: Option<f64>,
    /// 99th percentile stage latency in milliseconds.
    pub p99_latency_ms: Option<f64>,
    /// Uptime in seconds.
    pub uptime_secs: u64,
}
