//! # UIDL Compressor - Adaptive Response Compression
//!
//! Compresses the UI update payloads (UIDL) a server sends to the browser
//! after each interaction. Payloads are gzip-compressed and base64-encoded
//! for transport; a configurable strategy decides whether the encoded or
//! the raw form is sent, and every measured payload is reported to the
//! registered monitors.
//!
//! ## Pipeline
//!
//! ```text
//! request ──> UIDL handler ──> raw payload
//!                                   │
//!                                   v
//!                      ┌────────────────────────┐
//!                      │ GzipCodec              │  gzip, then base64
//!                      └───────────┬────────────┘
//!                                  v
//!                      ┌────────────────────────┐
//!                      │ StrategySelector       │──> monitors (raw, gzip, base64 sizes)
//!                      └───────────┬────────────┘
//!                                  v
//! response <── body + X-Uidl-Encoding: identity | gzip+base64
//! ```
//!
//! ## Strategies
//!
//! | Strategy   | Behavior                                              |
//! |------------|-------------------------------------------------------|
//! | `off`      | Raw payload, codec never runs, nothing is measured     |
//! | `strict`   | Always gzip+base64, even when larger than the payload |
//! | `adaptive` | Raw if gzip+base64 is larger, else gzip+base64        |
//!
//! The strategy is read once at startup from the `compression.strategy`
//! config key or the `UIDL_COMPRESSION` environment variable. A missing
//! value means `adaptive`; an unknown value is rejected.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uidl_compressor::{CompressionStats, CompressionStrategy, StrategySelector};
//!
//! let stats = Arc::new(CompressionStats::new());
//! let selector = StrategySelector::new()
//!     .with_strategy(CompressionStrategy::Adaptive)
//!     .with_monitor(stats.clone());
//!
//! let selection = selector.select(payload.into_bytes())?;
//! println!("Sending {} bytes as {}", selection.sent_bytes(), selection.form);
//! ```
//!
//! ### Client Side
//!
//! ```rust,ignore
//! use uidl_compressor::client::PayloadDecoder;
//!
//! let decoder = PayloadDecoder::new();
//! let uidl = decoder.decode_text(&body, headers.get("x-uidl-encoding"))?;
//! ```
//!
//! ## Modules
//!
//! - [`codec`]: Gzip/base64 codec and strategy selector
//! - [`monitor`]: Measurement monitors and statistics
//! - [`client`]: Client-side payload decoding
//! - [`server`]: HTTP server and compression stage (Axum-based)
//! - [`demo`]: Demo payload producer and statistics report
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod client;
pub mod codec;
pub mod config;
pub mod demo;
pub mod error;
pub mod monitor;
pub mod server;

// Re-exports for convenience
pub use client::{DecodedResponse, PayloadDecoder};
pub use codec::{
    CompressionStrategy, GzipCodec, PayloadForm, PayloadMeasurement, Selection, StrategySelector,
};
pub use config::Config;
pub use error::{CompressorError, Result};
pub use monitor::{CompressionMonitor, CompressionStats, LoggingMonitor, Monitors, StatsSummary};
pub use server::{AppState, Server, ServerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check if a body is a raw UIDL payload
pub fn is_raw_uidl(body: &[u8]) -> bool {
    codec::is_raw_uidl(body)
}
