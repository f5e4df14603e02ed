//! Server configuration.

use std::net::SocketAddr;

use crate::codec::{CompressionStrategy, GzipCodec};
use crate::config::Config;
use crate::error::{CompressorError, Result};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub addr: SocketAddr,
    /// Path of the UIDL endpoint
    pub uidl_path: String,
    /// Strategy applied to UIDL responses
    pub strategy: CompressionStrategy,
    /// Codec used by the selector
    pub codec: GzipCodec,
    /// Maximum response size buffered for compression (bytes)
    pub max_body_size: usize,
    /// Serve the demo payload
    pub demo_enabled: bool,
    /// Demo frames per second
    pub frame_rate: u32,
    /// Enable request logging
    pub logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            uidl_path: "/UIDL".to_string(),
            strategy: CompressionStrategy::default(),
            codec: GzipCodec::default(),
            max_body_size: 16 * 1024 * 1024, // 16MB
            demo_enabled: true,
            frame_rate: 1,
            logging: true,
        }
    }
}

impl ServerConfig {
    /// Build from a validated [`Config`]
    pub fn from_config(config: &Config) -> Result<Self> {
        let addr: SocketAddr = config.server.listen_addr().parse().map_err(|e| {
            CompressorError::Config(format!(
                "Invalid listen address {}: {e}",
                config.server.listen_addr()
            ))
        })?;

        Ok(Self {
            addr,
            uidl_path: config.server.uidl_path.clone(),
            strategy: config.compression.strategy()?,
            codec: config.compression.codec(),
            max_body_size: config.server.max_body_size,
            demo_enabled: config.demo.enabled,
            frame_rate: config.demo.frame_rate,
            logging: true,
        })
    }

    /// Create with custom port
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    /// Set address directly
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Set the strategy
    pub fn with_strategy(mut self, strategy: CompressionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set max body size
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Disable the demo clock
    pub fn without_demo(mut self) -> Self {
        self.demo_enabled = false;
        self
    }

    /// Disable logging
    pub fn without_logging(mut self) -> Self {
        self.logging = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 9000
            uidl_path = "/vaadin/UIDL"

            [compression]
            strategy = "strict"
            level = 3
        "#,
        )
        .unwrap();

        let server = ServerConfig::from_config(&config).unwrap();
        assert_eq!(server.addr.port(), 9000);
        assert_eq!(server.uidl_path, "/vaadin/UIDL");
        assert_eq!(server.strategy, CompressionStrategy::Strict);
        assert_eq!(server.codec.level, 3);
    }

    #[test]
    fn test_invalid_host() {
        let mut config = Config::default();
        config.server.host = "not a host".to_string();
        assert!(ServerConfig::from_config(&config).is_err());
    }

    #[test]
    fn test_builders() {
        let config = ServerConfig::default()
            .with_port(3000)
            .with_strategy(CompressionStrategy::Off)
            .without_demo();

        assert_eq!(config.addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.strategy, CompressionStrategy::Off);
        assert!(!config.demo_enabled);
    }
}
