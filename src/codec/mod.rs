//! Payload compression for UIDL responses.
//!
//! # Forms
//!
//! | Form        | Wire content                  | Header value   |
//! |-------------|-------------------------------|----------------|
//! | [`Raw`]     | payload as produced (`for(…`) | `identity`     |
//! | [`Encoded`] | base64(gzip(payload))         | `gzip+base64`  |
//!
//! # Strategies
//!
//! | Strategy     | Codec runs | Sent                                   |
//! |--------------|------------|----------------------------------------|
//! | `off`        | no         | raw                                    |
//! | `strict`     | yes        | encoded, even when larger              |
//! | `adaptive`   | yes        | raw if encoded is larger, else encoded |
//!
//! # Usage
//!
//! ```rust,ignore
//! use uidl_compressor::codec::{CompressionStrategy, StrategySelector};
//!
//! let selector = StrategySelector::new().with_strategy(CompressionStrategy::Adaptive);
//! let selection = selector.select(payload)?;
//! response.write_all(&selection.body)?;
//! ```
//!
//! [`Raw`]: PayloadForm::Raw
//! [`Encoded`]: PayloadForm::Encoded

mod engine;
mod gzip;
mod measurement;
mod strategy;

pub use engine::StrategySelector;
pub use gzip::{GzipCodec, DEFAULT_LEVEL};
pub use measurement::{
    PayloadForm, PayloadMeasurement, Selection, GZIP_BASE64_ENCODING, IDENTITY_ENCODING,
    UIDL_PREFIX,
};
pub use strategy::CompressionStrategy;

/// Check if a body looks like a raw UIDL payload
pub fn is_raw_uidl(body: &[u8]) -> bool {
    body.starts_with(UIDL_PREFIX)
}
