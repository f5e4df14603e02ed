//! UIDL compressor error types.
//!
//! Compression failures (`Io`) are fatal for the request that produced
//! them and are propagated to the HTTP pipeline, which answers with a
//! 500-class response. Monitor failures (`Observer`) never leave the
//! selector: they are logged and dropped.

use thiserror::Error;

/// UIDL compressor errors.
#[derive(Error, Debug)]
pub enum CompressorError {
    /// Compression stream could not be written or finalized.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Decompression of a gzip stream failed.
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// Base64 transport text could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A compression monitor rejected a measurement.
    #[error("Observer error: {0}")]
    Observer(String),

    /// Unknown compression strategy name.
    #[error("Invalid compression strategy: {0} (expected off, strict or adaptive)")]
    InvalidStrategy(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Server-side error.
    #[error("Server error: {0}")]
    Server(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for compressor operations
pub type Result<T> = std::result::Result<T, CompressorError>;

impl From<toml::de::Error> for CompressorError {
    fn from(err: toml::de::Error) -> Self {
        CompressorError::Config(err.to_string())
    }
}

impl From<base64::DecodeError> for CompressorError {
    fn from(err: base64::DecodeError) -> Self {
        CompressorError::Decode(format!("Base64 decode error: {err}"))
    }
}

impl CompressorError {
    /// Whether the error must abort the current request.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CompressorError::Observer(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observer_errors_are_not_fatal() {
        assert!(!CompressorError::Observer("boom".to_string()).is_fatal());
        let io = std::io::Error::new(std::io::ErrorKind::WriteZero, "short write");
        assert!(CompressorError::from(io).is_fatal());
    }

    #[test]
    fn test_invalid_strategy_message() {
        let err = CompressorError::InvalidStrategy("fast".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid compression strategy: fast (expected off, strict or adaptive)"
        );
    }
}
