//! Screening configuration
//!
//! Loaded from TOML. Every section and key is optional:
//!
//! ```toml
//! [api]
//! base_url = "http://127.0.0.1:8000/api/core/"
//! timeout_ms = 30000
//!
//! [session]
//! result_ttl_secs = 7200
//! draft_ttl_secs = 86400
//!
//! [storage]
//! backend = "file"
//! path = "/var/lib/hemaprint/session.json"
//!
//! [server]
//! bind = "127.0.0.1:3000"
//! public_url = "http://127.0.0.1:3000"
//! ```

use crate::error::{ConfigError, ConfigResult};
use hemaprint_client::ClientConfig;
use hemaprint_session::SessionConfig;
use hemaprint_store::{BackendError, FileBackend, KvBackend, MemoryBackend};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "HEMAPRINT_CONFIG";

/// Origin share links point at unless configured
pub const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:3000";

/// Which backend holds session entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Lost when the process exits
    #[default]
    Memory,
    /// JSON file on disk
    File,
}

/// Session storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind
    pub backend: StorageKind,
    /// File path, used by the file backend
    pub path: PathBuf,
}

impl StorageConfig {
    /// In-memory storage
    #[must_use]
    pub fn memory() -> Self {
        Self::default()
    }

    /// File storage at `path`
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StorageKind::File,
            path: path.into(),
        }
    }

    /// Open the configured backend
    ///
    /// # Errors
    /// Returns error if the file backend cannot read its file
    pub fn open(&self) -> Result<Arc<dyn KvBackend>, BackendError> {
        match self.backend {
            StorageKind::Memory => Ok(Arc::new(MemoryBackend::new())),
            StorageKind::File => Ok(Arc::new(FileBackend::open(&self.path)?)),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::Memory,
            path: PathBuf::from("hemaprint-session.json"),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Origin share links point at; the download route must be reachable there
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Prediction service
    pub api: ClientConfig,
    /// Entry lifetimes
    pub session: SessionConfig,
    /// Session storage
    pub storage: StorageConfig,
    /// Download server
    pub server: ServerConfig,
}

impl ScreeningConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With prediction service settings
    #[inline]
    #[must_use]
    pub fn with_api(mut self, api: ClientConfig) -> Self {
        self.api = api;
        self
    }

    /// With entry lifetimes
    #[inline]
    #[must_use]
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// With storage settings
    #[inline]
    #[must_use]
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// With server settings
    #[inline]
    #[must_use]
    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns error if the document does not parse or fails validation
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or validated
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load from `explicit`, else from [`CONFIG_ENV`], else defaults
    ///
    /// # Errors
    /// Returns error if a named file cannot be loaded
    pub fn resolve(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => {
                tracing::debug!("no config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns `Invalid` naming the first bad value
    pub fn validate(&self) -> ConfigResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".into()));
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::Invalid("api.timeout_ms must be positive".into()));
        }
        if self.session.result_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "session.result_ttl_secs must be positive".into(),
            ));
        }
        if self.session.draft_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "session.draft_ttl_secs must be positive".into(),
            ));
        }
        if let Err(e) = url::Url::parse(&self.server.public_url) {
            return Err(ConfigError::Invalid(format!(
                "server.public_url is not a URL: {e}"
            )));
        }
        if self.storage.backend == StorageKind::File && self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.path is required for the file backend".into(),
            ));
        }
        Ok(())
    }
}
