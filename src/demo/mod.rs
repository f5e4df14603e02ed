//! Demo application.
//!
//! Produces a large, frame-dependent UIDL payload on every request (the
//! kind of response that benefits from compression) and renders the
//! compression statistics of the last request as a text report.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tokio::task::JoinHandle;

use crate::codec::PayloadMeasurement;
use crate::error::{CompressorError, Result};
use crate::monitor::CompressionMonitor;

/// Zoom added on every frame
const ZOOM_STEP: f64 = 0.10;

/// Width of the pixel grid in the payload
const GRID_WIDTH: usize = 64;

/// Height of the pixel grid in the payload
const GRID_HEIGHT: usize = 48;

/// Highest frame rate the clock runs at (one frame per millisecond)
pub const MAX_FRAME_RATE: u32 = 1000;

/// Animation state advanced by the frame clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoFrame {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Current zoom level
    pub zoom: f64,
}

impl Default for DemoFrame {
    fn default() -> Self {
        Self {
            frame: 1,
            zoom: 1.0,
        }
    }
}

/// Demo payload producer with a shared frame counter
#[derive(Debug, Default)]
pub struct DemoApplication {
    frame: Mutex<DemoFrame>,
}

impl DemoApplication {
    /// Create demo at frame 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Current frame
    pub fn frame(&self) -> DemoFrame {
        self.frame.lock().map(|f| *f).unwrap_or_default()
    }

    /// Advance one frame
    pub fn advance(&self) -> DemoFrame {
        match self.frame.lock() {
            Ok(mut frame) => {
                frame.frame += 1;
                frame.zoom += ZOOM_STEP;
                *frame
            },
            Err(_) => DemoFrame::default(),
        }
    }

    /// Spawn the clock advancing one frame per `1 / frame_rate` seconds
    pub fn spawn_clock(self: Arc<Self>, frame_rate: u32) -> JoinHandle<()> {
        let frame_rate = frame_rate.clamp(1, MAX_FRAME_RATE);
        let period = Duration::from_millis(1000 / u64::from(frame_rate));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            tracing::info!("Demo updating started ({:?} per frame)", period);

            loop {
                interval.tick().await;
                let frame = self.advance();
                tracing::trace!(frame = frame.frame, zoom = frame.zoom, "Demo frame");
            }
        })
    }

    /// UIDL payload for the current frame
    pub fn uidl_payload(&self) -> Result<String> {
        let frame = self.frame();
        let changes = json!([[
            "change",
            {"format": "uidl", "pid": "PID2"},
            ["mandelbrot", {
                "id": "PID2",
                "zoom": frame.zoom,
                "cx": -0.55,
                "cy": -0.55,
                "width": GRID_WIDTH,
                "height": GRID_HEIGHT,
                "rows": Self::grid(frame),
            }]
        ]]);

        let body = json!({
            "changes": changes,
            "meta": {"frame": frame.frame},
            "resources": {},
            "locales": [],
        });

        Ok(format!("for(;;);[{}]", serde_json::to_string(&body)?))
    }

    /// Banded pixel rows; bands narrow as the zoom grows
    fn grid(frame: DemoFrame) -> Vec<String> {
        const PALETTE: &[u8] = b"0123456789abcdef";
        let scale = frame.zoom.max(1.0);

        (0..GRID_HEIGHT)
            .map(|y| {
                (0..GRID_WIDTH)
                    .map(|x| {
                        let dx = x as f64 - GRID_WIDTH as f64 / 2.0;
                        let dy = y as f64 - GRID_HEIGHT as f64 / 2.0;
                        let band = ((dx * dx + dy * dy).sqrt() * scale / 4.0) as usize;
                        PALETTE[band % PALETTE.len()] as char
                    })
                    .collect()
            })
            .collect()
    }
}

/// Monitor rendering the statistics report of the last request
#[derive(Debug)]
pub struct DemoMonitor {
    app: Arc<DemoApplication>,
    report: Mutex<Option<String>>,
}

impl DemoMonitor {
    /// Create monitor reporting frames of `app`
    pub fn new(app: Arc<DemoApplication>) -> Self {
        Self {
            app,
            report: Mutex::new(None),
        }
    }

    /// Latest report, if any request was measured
    pub fn latest_report(&self) -> Option<String> {
        self.report.lock().ok().and_then(|r| r.clone())
    }

    /// Render the report for one measurement
    pub fn render(frame: u64, measurement: &PayloadMeasurement) -> String {
        let raw_kb = measurement.raw_bytes as f64 / 1000.0;
        let compressed_kb = measurement.compressed_bytes as f64 / 1000.0;
        let encoded_kb = measurement.encoded_bytes as f64 / 1000.0;
        let rate = measurement.compression_rate() as i64;

        let mut report = String::new();
        report.push_str(&format!("=========  Request #{frame}  ==============\n"));
        report.push_str(&format!("Uncompressed JSON:\t\t{raw_kb}kb\n"));
        report.push_str(&format!("Compressed JSON:\t\t{compressed_kb}kb\n"));
        report.push_str(&format!("Compressed + Encoded JSON:\t{encoded_kb}kb\n"));
        report.push_str("----------------------------------------\n");
        report.push_str(&format!("Total compression rate:\t\t{rate}%"));
        report
    }
}

impl CompressionMonitor for DemoMonitor {
    fn compression_processed(&self, measurement: PayloadMeasurement) -> Result<()> {
        let frame = self.app.frame().frame;

        tracing::info!(
            "Request {}: {}kb -> {}kb -> {}kb. Compression rate {}%",
            frame,
            measurement.raw_bytes as f64 / 1000.0,
            measurement.compressed_bytes as f64 / 1000.0,
            measurement.encoded_bytes as f64 / 1000.0,
            measurement.compression_rate() as i64
        );

        let mut report = self
            .report
            .lock()
            .map_err(|e| CompressorError::Observer(format!("Report lock poisoned: {e}")))?;
        *report = Some(Self::render(frame, &measurement));
        Ok(())
    }

    fn name(&self) -> &str {
        "demo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let app = DemoApplication::new();
        assert_eq!(app.frame().frame, 1);

        let frame = app.advance();
        assert_eq!(frame.frame, 2);
        assert!((frame.zoom - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_payload_is_uidl() {
        let app = DemoApplication::new();
        let payload = app.uidl_payload().unwrap();

        assert!(payload.starts_with("for(;;);["));
        let json: serde_json::Value =
            serde_json::from_str(payload.trim_start_matches("for(;;);")).unwrap();
        assert_eq!(json[0]["meta"]["frame"], 1);
        assert_eq!(
            json[0]["changes"][0][2][1]["rows"].as_array().unwrap().len(),
            GRID_HEIGHT
        );
    }

    #[test]
    fn test_payload_changes_with_frame() {
        let app = DemoApplication::new();
        let first = app.uidl_payload().unwrap();
        app.advance();
        let second = app.uidl_payload().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_render_report() {
        let report = DemoMonitor::render(3, &PayloadMeasurement::new(10_000, 2_500, 3_336));

        assert!(report.starts_with("=========  Request #3  =============="));
        assert!(report.contains("Uncompressed JSON:\t\t10kb"));
        assert!(report.contains("Compressed JSON:\t\t2.5kb"));
        assert!(report.contains("Compressed + Encoded JSON:\t3.336kb"));
        assert!(report.ends_with("Total compression rate:\t\t75%"));
    }

    #[test]
    fn test_monitor_stores_report() {
        let app = Arc::new(DemoApplication::new());
        let monitor = DemoMonitor::new(app);
        assert!(monitor.latest_report().is_none());

        monitor
            .compression_processed(PayloadMeasurement::new(2000, 500, 668))
            .unwrap();

        let report = monitor.latest_report().unwrap();
        assert!(report.contains("Request #1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_advances_frames() {
        let app = Arc::new(DemoApplication::new());
        let handle = Arc::clone(&app).spawn_clock(10);

        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.abort();

        assert!(app.frame().frame >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_clamps_high_frame_rate() {
        let app = Arc::new(DemoApplication::new());
        let handle = Arc::clone(&app).spawn_clock(2000);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!handle.is_finished());
        handle.abort();

        assert!(app.frame().frame >= 5);
    }
}
