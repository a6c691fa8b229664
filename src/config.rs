//! Configuration for imgFS
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{ImgfsError, Result};

/// Default number of slots in a freshly created container
pub const DEFAULT_MAX_FILES: u32 = 128;

/// Default thumbnail side (pixels)
pub const DEFAULT_THUMB_RES: u16 = 64;

/// Default small-variant side (pixels)
pub const DEFAULT_SMALL_RES: u16 = 256;

/// Largest accepted thumbnail side
pub const MAX_THUMB_RES: u16 = 128;

/// Largest accepted small-variant side
pub const MAX_SMALL_RES: u16 = 512;

/// Default HTTP listening port
pub const DEFAULT_PORT: u16 = 8000;

/// Parameters fixed when a container is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOptions {
    /// Capacity of the record table (immutable after creation)
    pub max_files: u32,

    /// Thumbnail target (width, height)
    pub thumb_res: (u16, u16),

    /// Small-variant target (width, height)
    pub small_res: (u16, u16),
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            thumb_res: (DEFAULT_THUMB_RES, DEFAULT_THUMB_RES),
            small_res: (DEFAULT_SMALL_RES, DEFAULT_SMALL_RES),
        }
    }
}

impl CreateOptions {
    /// Check the bounds the command-line tool enforces
    pub fn validate(&self) -> Result<()> {
        if self.max_files == 0 {
            return Err(ImgfsError::Config("max_files must be at least 1".to_string()));
        }
        Self::check_res("thumb_res", self.thumb_res, MAX_THUMB_RES)?;
        Self::check_res("small_res", self.small_res, MAX_SMALL_RES)?;
        Ok(())
    }

    fn check_res(label: &str, (w, h): (u16, u16), max: u16) -> Result<()> {
        if w == 0 || h == 0 || w > max || h > max {
            return Err(ImgfsError::Config(format!(
                "{} {}x{} out of range (1..={})",
                label, w, h, max
            )));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the imgFS container file served
    pub container_path: PathBuf,

    /// Optional HTML page served for `/` and `/index.html`
    pub index_file: Option<PathBuf>,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Listen host (port is kept separately so redirects can name it)
    pub listen_host: String,

    /// TCP listen port
    pub port: u16,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            container_path: PathBuf::from("./images.imgfs"),
            index_file: None,
            listen_host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            max_connections: 64,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` string for binding
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.port)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the container file to serve
    pub fn container_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.container_path = path.into();
        self
    }

    /// Set the page served at the root URI
    pub fn index_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_file = Some(path.into());
        self
    }

    /// Set the listen host
    pub fn listen_host(mut self, host: impl Into<String>) -> Self {
        self.config.listen_host = host.into();
        self
    }

    /// Set the TCP port (0 lets the OS pick one)
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
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

    pub fn build(self) -> Config {
        self.config
    }
}
