//! Strategy selector choosing which payload stream is sent.
//!
//! For every payload the selector runs the codec (unless compression is
//! off), picks the raw or the gzip+base64 stream according to the
//! configured [`CompressionStrategy`], and hands the three sizes to the
//! registered monitors before returning.

use std::sync::Arc;

use super::gzip::GzipCodec;
use super::measurement::{PayloadForm, PayloadMeasurement, Selection};
use super::strategy::CompressionStrategy;
use crate::error::Result;
use crate::monitor::{CompressionMonitor, Monitors};

/// Selector with a fixed strategy and a set of monitors
#[derive(Clone, Debug, Default)]
pub struct StrategySelector {
    /// Codec instance
    codec: GzipCodec,
    /// Strategy configured at startup
    strategy: CompressionStrategy,
    /// Monitors notified after every compression
    monitors: Monitors,
}

impl StrategySelector {
    /// Create selector with the adaptive strategy and no monitors
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy
    pub fn with_strategy(mut self, strategy: CompressionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the codec
    pub fn with_codec(mut self, codec: GzipCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Register a monitor
    pub fn with_monitor(mut self, monitor: Arc<dyn CompressionMonitor>) -> Self {
        self.monitors.register(monitor);
        self
    }

    /// Configured strategy
    pub fn strategy(&self) -> CompressionStrategy {
        self.strategy
    }

    /// Codec used for compression
    pub fn codec(&self) -> &GzipCodec {
        &self.codec
    }

    /// Registered monitors
    pub fn monitors(&self) -> &Monitors {
        &self.monitors
    }

    /// Select the stream for `raw` using the configured strategy
    pub fn select(&self, raw: Vec<u8>) -> Result<Selection> {
        self.select_with_strategy(raw, self.strategy)
    }

    /// Select the stream for `raw` using an explicit strategy
    pub fn select_with_strategy(
        &self,
        raw: Vec<u8>,
        strategy: CompressionStrategy,
    ) -> Result<Selection> {
        if !strategy.compresses() {
            tracing::trace!("Compression disabled, sending payload uncompressed");
            return Ok(Selection::passthrough(raw));
        }

        let compressed = self.codec.compress(&raw)?;
        let encoded = self.codec.encode(&compressed);
        let measurement = PayloadMeasurement::new(raw.len(), compressed.len(), encoded.len());

        let form = Self::choose(strategy, &measurement);
        tracing::trace!(%strategy, %form, "Sending payload");

        self.monitors.notify(measurement);

        let body = match form {
            PayloadForm::Raw => raw,
            PayloadForm::Encoded => encoded,
        };

        Ok(Selection {
            body,
            form,
            measurement: Some(measurement),
        })
    }

    /// Pick the form for a measured payload.
    ///
    /// Adaptive falls back to raw only when the encoded form is strictly
    /// larger; a tie sends the encoded form.
    pub fn choose(strategy: CompressionStrategy, measurement: &PayloadMeasurement) -> PayloadForm {
        match strategy {
            CompressionStrategy::Off => PayloadForm::Raw,
            CompressionStrategy::Strict => PayloadForm::Encoded,
            CompressionStrategy::Adaptive => {
                if measurement.encoded_bytes > measurement.raw_bytes {
                    PayloadForm::Raw
                } else {
                    PayloadForm::Encoded
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompressorError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<PayloadMeasurement>>,
    }

    impl CompressionMonitor for Recorder {
        fn compression_processed(&self, measurement: PayloadMeasurement) -> Result<()> {
            self.seen.lock().unwrap().push(measurement);
            Ok(())
        }
    }

    struct Broken;

    impl CompressionMonitor for Broken {
        fn compression_processed(&self, _: PayloadMeasurement) -> Result<()> {
            Err(CompressorError::Observer("window closed".to_string()))
        }
    }

    fn repetitive(len: usize) -> Vec<u8> {
        b"for(;;);[\"label\",\"0\"]".iter().copied().cycle().take(len).collect()
    }

    /// Deterministic bytes that gzip cannot shrink
    fn noise(len: usize) -> Vec<u8> {
        let mut state: u32 = 0x9e37_79b9;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn test_off_returns_raw_without_measuring() {
        let recorder = Arc::new(Recorder::default());
        let selector = StrategySelector::new()
            .with_strategy(CompressionStrategy::Off)
            .with_monitor(recorder.clone());

        let raw = repetitive(5000);
        let selection = selector.select(raw.clone()).unwrap();

        assert_eq!(selection.body, raw);
        assert_eq!(selection.form, PayloadForm::Raw);
        assert!(selection.measurement.is_none());
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_strict_always_encodes() {
        let selector = StrategySelector::new().with_strategy(CompressionStrategy::Strict);
        let codec = GzipCodec::new();

        let raw = noise(50);
        let selection = selector.select(raw.clone()).unwrap();

        assert_eq!(selection.form, PayloadForm::Encoded);
        assert!(selection.body.len() > raw.len());
        assert_eq!(codec.decode_decompress(&selection.body).unwrap(), raw);
    }

    #[test]
    fn test_adaptive_picks_encoded_for_repetitive_payload() {
        let selector = StrategySelector::new();

        let raw = repetitive(10_000);
        let selection = selector.select(raw).unwrap();
        let m = selection.measurement.unwrap();

        assert_eq!(selection.form, PayloadForm::Encoded);
        assert_eq!(m.raw_bytes, 10_000);
        assert!(m.compressed_bytes < 300, "compressed {}", m.compressed_bytes);
        assert_eq!(m.encoded_bytes, m.compressed_bytes.div_ceil(3) * 4);
        assert_eq!(selection.body.len(), m.encoded_bytes);
    }

    #[test]
    fn test_adaptive_keeps_raw_for_small_random_payload() {
        let recorder = Arc::new(Recorder::default());
        let selector = StrategySelector::new().with_monitor(recorder.clone());

        let raw = noise(50);
        let selection = selector.select(raw.clone()).unwrap();

        assert_eq!(selection.form, PayloadForm::Raw);
        assert_eq!(selection.body, raw);

        // Observers still get the true sizes of the rejected form
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].compressed_bytes > 50);
        assert!(seen[0].encoded_bytes > seen[0].compressed_bytes);
    }

    #[test]
    fn test_adaptive_tie_favors_encoded() {
        let m = PayloadMeasurement::new(40, 30, 40);
        assert_eq!(
            StrategySelector::choose(CompressionStrategy::Adaptive, &m),
            PayloadForm::Encoded
        );

        let m = PayloadMeasurement::new(40, 30, 41);
        assert_eq!(
            StrategySelector::choose(CompressionStrategy::Adaptive, &m),
            PayloadForm::Raw
        );
    }

    #[test]
    fn test_failing_monitor_does_not_change_result() {
        let raw = repetitive(2000);
        let plain = StrategySelector::new().select(raw.clone()).unwrap();

        let selector = StrategySelector::new().with_monitor(Arc::new(Broken));
        let selection = selector.select(raw.clone()).unwrap();

        assert_eq!(selection.form, plain.form);
        assert_eq!(
            GzipCodec::new().decode_decompress(&selection.body).unwrap(),
            raw
        );
    }

    #[test]
    fn test_empty_payload() {
        let selector = StrategySelector::new();
        let selection = selector.select(Vec::new()).unwrap();
        let m = selection.measurement.unwrap();

        assert_eq!(m.raw_bytes, 0);
        assert!(m.compressed_bytes > 0);
        assert_eq!(selection.form, PayloadForm::Raw);
        assert!(selection.body.is_empty());
    }

    #[test]
    fn test_explicit_strategy_overrides_configured() {
        let selector = StrategySelector::new().with_strategy(CompressionStrategy::Off);
        let selection = selector
            .select_with_strategy(repetitive(100), CompressionStrategy::Strict)
            .unwrap();
        assert_eq!(selection.form, PayloadForm::Encoded);
    }
}
