//! Configuration for kvline
//!
//! Centralized client configuration with sensible defaults.

use std::time::Duration;

/// Host used when none (or an empty one) is given
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port used when none (or port 0) is given
pub const DEFAULT_PORT: u16 = 6379;

/// Connect/send/receive bound used when none is given (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Main configuration for a client connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server host name or numeric address
    pub host: String,

    /// Server TCP port
    pub port: u16,

    // -------------------------------------------------------------------------
    // Timeout Configuration
    // -------------------------------------------------------------------------
    /// Bound for connecting and for every send and receive (milliseconds).
    /// Can be changed later with `Connection::set_timeout`.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Host to connect to, falling back to the default for an empty value
    pub fn effective_host(&self) -> &str {
        if self.host.is_empty() {
            DEFAULT_HOST
        } else {
            &self.host
        }
    }

    /// Port to connect to, falling back to the default for port 0
    pub fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_PORT
        } else {
            self.port
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the server host (name or numeric address)
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the timeout (in milliseconds)
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
