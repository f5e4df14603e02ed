//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (for `serve`)
//!
//! The compression strategy is read once at startup. A missing value
//! means `adaptive`; an unknown value makes loading fail.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::codec::{CompressionStrategy, GzipCodec, DEFAULT_LEVEL};
use crate::demo::MAX_FRAME_RATE;
use crate::error::{CompressorError, Result};

/// Environment variable holding the strategy name
pub const STRATEGY_ENV: &str = "UIDL_COMPRESSION";

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerSection,

    /// Compression configuration
    #[serde(default)]
    pub compression: CompressionConfig,

    /// Demo application configuration
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| CompressorError::Config(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CompressorError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from an environment lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("UIDL_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("UIDL_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| CompressorError::Config(format!("Invalid UIDL_PORT: {e}")))?;
        }
        if let Some(path) = lookup("UIDL_PATH") {
            self.server.uidl_path = path;
        }

        // Compression settings
        if let Some(strategy) = lookup(STRATEGY_ENV) {
            self.compression.strategy = Some(strategy);
        }
        if let Some(level) = lookup("UIDL_COMPRESSION_LEVEL") {
            self.compression.level = level.parse().map_err(|e| {
                CompressorError::Config(format!("Invalid UIDL_COMPRESSION_LEVEL: {e}"))
            })?;
        }

        self.validate()
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("uidl-compressor").join("config.toml"))
    }

    /// Load the file at `path`, or the default file if it exists, then apply env overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let file = path.or_else(|| Self::default_path().filter(|p| p.exists()));

        let mut config = match file {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(path)?
            },
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Check every field that can be invalid
    pub fn validate(&self) -> Result<()> {
        self.compression.strategy()?;

        if self.compression.level > 9 {
            return Err(CompressorError::Config(format!(
                "Compression level must be 0-9, got {}",
                self.compression.level
            )));
        }
        if !self.server.uidl_path.starts_with('/') {
            return Err(CompressorError::Config(format!(
                "UIDL path must start with '/', got {:?}",
                self.server.uidl_path
            )));
        }
        if !(1..=MAX_FRAME_RATE).contains(&self.demo.frame_rate) {
            return Err(CompressorError::Config(format!(
                "Demo frame rate must be 1-{MAX_FRAME_RATE}, got {}",
                self.demo.frame_rate
            )));
        }

        Ok(())
    }
}

/// HTTP server section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Path of the UIDL endpoint
    pub uidl_path: String,

    /// Maximum response size buffered for compression
    pub max_body_size: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            uidl_path: "/UIDL".to_string(),
            max_body_size: 16 * 1024 * 1024, // 16 MB
        }
    }
}

impl ServerSection {
    /// Get the full listen address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Compression configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Strategy name (`off`, `strict`, `adaptive`); unset means adaptive
    pub strategy: Option<String>,

    /// Gzip level (0-9)
    pub level: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            strategy: None,
            level: DEFAULT_LEVEL,
        }
    }
}

impl CompressionConfig {
    /// Resolve the configured strategy
    pub fn strategy(&self) -> Result<CompressionStrategy> {
        CompressionStrategy::from_config(self.strategy.as_deref())
    }

    /// Build the codec for the configured level
    pub fn codec(&self) -> GzipCodec {
        GzipCodec::with_level(self.level)
    }
}

/// Demo application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Serve the demo payload on the UIDL endpoint
    pub enabled: bool,

    /// Frames per second of the demo clock
    pub frame_rate: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frame_rate: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.uidl_path, "/UIDL");
        assert_eq!(
            config.compression.strategy().unwrap(),
            CompressionStrategy::Adaptive
        );
        assert_eq!(config.compression.level, 6);
    }

    #[test]
    fn test_listen_addr() {
        let section = ServerSection::default();
        assert_eq!(section.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 9090

            [compression]
            strategy = "strict"
            level = 9

            [demo]
            frame_rate = 4
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.uidl_path, "/UIDL");
        assert_eq!(
            config.compression.strategy().unwrap(),
            CompressionStrategy::Strict
        );
        assert_eq!(config.compression.codec().level, 9);
        assert_eq!(config.demo.frame_rate, 4);
        assert!(config.demo.enabled);
    }

    #[test]
    fn test_missing_strategy_is_adaptive() {
        let config = Config::from_toml("[compression]\nlevel = 1\n").unwrap();
        assert!(config.compression.strategy.is_none());
        assert_eq!(
            config.compression.strategy().unwrap(),
            CompressionStrategy::Adaptive
        );
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let err = Config::from_toml("[compression]\nstrategy = \"zstd\"\n").unwrap_err();
        assert!(matches!(err, CompressorError::InvalidStrategy(_)));
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let err = Config::from_toml("[compression]\nlevel = 12\n").unwrap_err();
        assert!(matches!(err, CompressorError::Config(_)));
    }

    #[test]
    fn test_frame_rate_bounds() {
        assert!(Config::from_toml("[demo]\nframe_rate = 1000\n").is_ok());

        for rate in [0, 1001, 2000] {
            let err = Config::from_toml(&format!("[demo]\nframe_rate = {rate}\n")).unwrap_err();
            assert!(matches!(err, CompressorError::Config(_)), "frame_rate {rate}");
        }
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("UIDL_PORT", "7070"),
            ("UIDL_COMPRESSION", "off"),
            ("UIDL_PATH", "/app/UIDL"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.server.port, 7070);
        assert_eq!(config.server.uidl_path, "/app/UIDL");
        assert_eq!(
            config.compression.strategy().unwrap(),
            CompressionStrategy::Off
        );
    }

    #[test]
    fn test_env_invalid_strategy() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == STRATEGY_ENV).then(|| "sometimes".to_string()))
            .unwrap_err();
        assert!(matches!(err, CompressorError::InvalidStrategy(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[compression]\nstrategy = \"adaptive\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(
            config.compression.strategy().unwrap(),
            CompressionStrategy::Adaptive
        );
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file("/nonexistent/uidl.toml").unwrap_err();
        assert!(matches!(err, CompressorError::Config(_)));
    }
}
