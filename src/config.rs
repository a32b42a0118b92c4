//! Configuration for openvpn-mi
//!
//! Centralized client configuration with sensible defaults. The library never
//! dials on its own; this is what the caller that owns the socket reads.

use std::path::PathBuf;

use crate::error::{MiError, Result};

/// The only `status` output format the status decoder understands
pub const SUPPORTED_STATUS_FORMAT: u8 = 2;

/// Where the daemon's management interface listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `management <host> <port>` in the daemon config
    Tcp(String),

    /// `management <path> unix` in the daemon config
    Unix(PathBuf),
}

/// Main configuration for a management client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// Management socket to connect to
    pub endpoint: Endpoint,

    /// Stream read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Stream write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Argument passed to the `status` command
    pub status_format: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Tcp("127.0.0.1:7505".to_string()),
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            status_format: SUPPORTED_STATUS_FORMAT,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Check the config for values no exchange could succeed with
    pub fn validate(&self) -> Result<()> {
        if let Endpoint::Tcp(addr) = &self.endpoint {
            if addr.trim().is_empty() {
                return Err(MiError::Config("TCP address is empty".to_string()));
            }
        }
        if self.status_format != SUPPORTED_STATUS_FORMAT {
            return Err(MiError::Config(format!(
                "status format {} is not supported (only {})",
                self.status_format, SUPPORTED_STATUS_FORMAT
            )));
        }
        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Connect over TCP (`host:port`)
    pub fn tcp(mut self, addr: impl Into<String>) -> Self {
        self.config.endpoint = Endpoint::Tcp(addr.into());
        self
    }

    /// Connect over a unix domain socket
    pub fn unix(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.endpoint = Endpoint::Unix(path.into());
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn status_format(mut self, format: u8) -> Self {
        self.config.status_format = format;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
