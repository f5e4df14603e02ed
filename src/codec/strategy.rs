//! Compression strategy selection.

use serde::{Deserialize, Serialize};

use crate::error::{CompressorError, Result};

/// Strategy deciding which stream is sent to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompressionStrategy {
    /// Bypass compression entirely, send the raw payload
    Off,
    /// Always send the gzip+base64 form, even when it is larger
    Strict,
    /// Send whichever of raw and gzip+base64 is smaller
    #[default]
    Adaptive,
}

impl CompressionStrategy {
    /// Get the configuration name
    pub fn name(&self) -> &'static str {
        match self {
            CompressionStrategy::Off => "off",
            CompressionStrategy::Strict => "strict",
            CompressionStrategy::Adaptive => "adaptive",
        }
    }

    /// Resolve a strategy from an optional configuration value.
    ///
    /// A missing or blank value means [`CompressionStrategy::Adaptive`];
    /// a present but unknown value is an error.
    pub fn from_config(value: Option<&str>) -> Result<Self> {
        match value {
            Some(name) if !name.trim().is_empty() => name.parse(),
            _ => Ok(CompressionStrategy::Adaptive),
        }
    }

    /// Get all strategies
    pub fn all() -> &'static [CompressionStrategy] {
        &[
            CompressionStrategy::Off,
            CompressionStrategy::Strict,
            CompressionStrategy::Adaptive,
        ]
    }

    /// Whether this strategy runs the codec at all
    pub fn compresses(&self) -> bool {
        !matches!(self, CompressionStrategy::Off)
    }
}

impl std::fmt::Display for CompressionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for CompressionStrategy {
    type Err = CompressorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "strict" => Ok(Self::Strict),
            "adaptive" => Ok(Self::Adaptive),
            _ => Err(CompressorError::InvalidStrategy(s.to_string())),
        }
    }
}
