//! Gzip + base64 codec.
//!
//! Compresses payloads into a standard gzip stream (header and trailer
//! included, so any gzip implementation can read it) and turns the
//! compressed bytes into base64 text for transport.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{CompressorError, Result};

/// Default gzip level (same as `Compression::default()`)
pub const DEFAULT_LEVEL: u32 = 6;

/// Maximum gzip level
const MAX_LEVEL: u32 = 9;

/// Gzip codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GzipCodec {
    /// Compression level (0-9)
    pub level: u32,
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
        }
    }
}

impl GzipCodec {
    /// Create new gzip codec with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create codec with custom level
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.min(MAX_LEVEL),
        }
    }

    /// Compress bytes to a gzip stream
    pub fn compress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(raw)?;
        Ok(encoder.finish()?)
    }

    /// Base64-encode compressed bytes (standard alphabet, padded, no wrapping)
    pub fn encode(&self, compressed: &[u8]) -> Vec<u8> {
        BASE64.encode(compressed).into_bytes()
    }

    /// Decode base64 transport text back to compressed bytes
    pub fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>> {
        Ok(BASE64.decode(encoded)?)
    }

    /// Decompress a gzip stream
    pub fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(compressed);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| CompressorError::Decompression(e.to_string()))?;
        Ok(decompressed)
    }

    /// Compress then encode in one step
    pub fn compress_encode(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let compressed = self.compress(raw)?;
        Ok(self.encode(&compressed))
    }

    /// Decode then decompress in one step
    pub fn decode_decompress(&self, encoded: &[u8]) -> Result<Vec<u8>> {
        let compressed = self.decode(encoded)?;
        self.decompress(&compressed)
    }
}
