//! Connection configuration.
//!
//! A [`ConnectionConfig`] is resolved once, when it is built: every field
//! left unset takes its default at that point and the result never changes
//! afterwards.

use crate::error::ClientError;
use std::time::Duration;
use tinykv_protocol::{DEFAULT_HOST, DEFAULT_MAX_KEY_SIZE, DEFAULT_MAX_VALUE_SIZE, DEFAULT_PORT};

/// Default read buffer size (8 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Minimum read buffer size (1 KiB).
pub const MIN_READ_BUFFER_SIZE: usize = 1024;

/// Maximum read buffer size (1 MiB).
pub const MAX_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Largest accepted `max_value_size` (16 MiB).
pub const MAX_VALUE_SIZE_LIMIT: usize = 16 * 1024 * 1024;

/// Default timeout for establishing the TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    max_key_size: usize,
    max_value_size: usize,
    connect_timeout: Duration,
    request_timeout: Option<Duration>,
    read_buffer_size: usize,
}

impl ConnectionConfig {
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Width of the key region in every keyed frame.
    pub fn max_key_size(&self) -> usize {
        self.max_key_size
    }

    pub fn max_value_size(&self) -> usize {
        self.max_value_size
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Time to wait for a response; `None` waits indefinitely.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Size of the buffer PING and status replies are read into.
    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    /// Size of the buffer a GET reply is read into.
    ///
    /// Never smaller than the largest value the configuration allows, plus
    /// one byte so an oversized reply is not silently cut at the limit.
    pub fn get_buffer_size(&self) -> usize {
        self.read_buffer_size.max(self.max_value_size.saturating_add(1))
    }

    /// `host:port`, as passed to the resolver.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_key_size: DEFAULT_MAX_KEY_SIZE,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: None,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

/// Builder for [`ConnectionConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    max_key_size: Option<usize>,
    max_value_size: Option<usize>,
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    read_buffer_size: Option<usize>,
}

impl ConnectionConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn max_key_size(mut self, size: usize) -> Self {
        self.max_key_size = Some(size);
        self
    }

    pub fn max_value_size(mut self, size: usize) -> Self {
        self.max_value_size = Some(size);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Fails an unanswered request with `ResponseTimeout` and closes the
    /// session.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = Some(size.clamp(MIN_READ_BUFFER_SIZE, MAX_READ_BUFFER_SIZE));
        self
    }

    /// Resolves defaults and validates the result.
    pub fn build(self) -> Result<ConnectionConfig, ClientError> {
        let defaults = ConnectionConfig::default();
        let config = ConnectionConfig {
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            max_key_size: self.max_key_size.unwrap_or(defaults.max_key_size),
            max_value_size: self.max_value_size.unwrap_or(defaults.max_value_size),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            request_timeout: self.request_timeout.or(defaults.request_timeout),
            read_buffer_size: self.read_buffer_size.unwrap_or(defaults.read_buffer_size),
        };

        if config.host.is_empty() {
            return Err(ClientError::InvalidConfig("host must not be empty".into()));
        }
        if config.port == 0 {
            return Err(ClientError::InvalidConfig(
                "port must be in 1..=65535".into(),
            ));
        }
        if config.max_key_size == 0 {
            return Err(ClientError::InvalidConfig(
                "max key size must be positive".into(),
            ));
        }
        if config.max_value_size == 0 {
            return Err(ClientError::InvalidConfig(
                "max value size must be positive".into(),
            ));
        }
        if config.max_value_size > MAX_VALUE_SIZE_LIMIT {
            return Err(ClientError::InvalidConfig(format!(
                "max value size must not exceed {} bytes",
                MAX_VALUE_SIZE_LIMIT
            )));
        }

        Ok(config)
    }
}
