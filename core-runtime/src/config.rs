//! # Catalog Configuration Module
//!
//! Configuration for the music catalog core.
//!
//! ## Overview
//!
//! [`CatalogConfig`] is built with [`CatalogConfigBuilder`] and validated on
//! `build()`, so a misconfigured process fails at startup rather than on the
//! first request. [`CatalogConfig::from_env`] reads the same settings from the
//! environment (and a `.env` file when present).
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CatalogConfig, MetadataApiConfig};
//! use std::time::Duration;
//!
//! let config = CatalogConfig::builder()
//!     .database_url("sqlite://catalog.db")
//!     .max_connections(10)
//!     .metadata_api_config(
//!         MetadataApiConfig::new()
//!             .with_lastfm_api_key("key")
//!             .with_request_timeout(Duration::from_secs(5)),
//!     )
//!     .build()?;
//! ```
//!
//! ## Environment
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `DATABASE_URL` | SQLite connection URL | required |
//! | `DATABASE_MAX_CONNECTIONS` | pool size | 10 |
//! | `DATABASE_CONNECT_TIMEOUT_SECS` | pool acquire deadline | 10 |
//! | `API_KEY` | Last.fm API key | required |
//! | `LASTFM_API_URL` | Last.fm endpoint | `http://ws.audioscrobbler.com/2.0/` |
//! | `LYRICS_API_URL` | lyrics endpoint | `https://lyrist.vercel.app/api` |
//! | `HTTP_TIMEOUT_SECS` | per-request timeout for outbound calls | 10 |

use crate::error::{Error, Result};
use crate::logging::{redact_if_sensitive, redact_url_credentials};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LASTFM_BASE_URL: &str = "http://ws.audioscrobbler.com/2.0/";
pub const DEFAULT_LYRICS_BASE_URL: &str = "https://lyrist.vercel.app/api";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the catalog core.
///
/// Use [`CatalogConfigBuilder`] to construct instances.
#[derive(Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// SQLite connection URL (e.g. `sqlite://catalog.db`)
    pub database_url: String,

    /// Maximum number of pooled store connections
    pub max_connections: u32,

    /// Deadline for acquiring a store connection
    pub connect_timeout: Duration,

    /// External metadata and lyrics API configuration
    pub metadata_api_config: MetadataApiConfig,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("database_url", &redact_url_credentials(&self.database_url))
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("metadata_api_config", &self.metadata_api_config)
            .finish()
    }
}

/// External metadata API configuration (Last.fm track info, Lyrist lyrics)
#[derive(Clone, PartialEq, Eq)]
pub struct MetadataApiConfig {
    /// Last.fm API key for `track.getInfo`
    ///
    /// Obtain an API key from: https://www.last.fm/api/account/create
    pub lastfm_api_key: Option<String>,

    /// Base URL of the Last.fm REST endpoint
    pub lastfm_base_url: String,

    /// Base URL of the lyrics API; requests go to `{base}/{song}/{group}`
    pub lyrics_base_url: String,

    /// Timeout applied to every outbound request
    pub request_timeout: Duration,
}

impl std::fmt::Debug for MetadataApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataApiConfig")
            .field(
                "lastfm_api_key",
                &self
                    .lastfm_api_key
                    .as_deref()
                    .map(|key| redact_if_sensitive("lastfm_api_key", key)),
            )
            .field("lastfm_base_url", &self.lastfm_base_url)
            .field("lyrics_base_url", &self.lyrics_base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for MetadataApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataApiConfig {
    /// Creates a configuration pointing at the public endpoints, without an API key
    pub fn new() -> Self {
        Self {
            lastfm_api_key: None,
            lastfm_base_url: DEFAULT_LASTFM_BASE_URL.to_string(),
            lyrics_base_url: DEFAULT_LYRICS_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the Last.fm API key
    pub fn with_lastfm_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.lastfm_api_key = Some(api_key.into());
        self
    }

    /// Overrides the Last.fm endpoint
    pub fn with_lastfm_base_url(mut self, url: impl Into<String>) -> Self {
        self.lastfm_base_url = url.into();
        self
    }

    /// Overrides the lyrics endpoint
    pub fn with_lyrics_base_url(mut self, url: impl Into<String>) -> Self {
        self.lyrics_base_url = url.into();
        self
    }

    /// Sets the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        match self.lastfm_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(Error::Config(
                    "Last.fm API key is required. Set API_KEY or use .with_lastfm_api_key()"
                        .to_string(),
                ))
            }
        }

        for (name, url) in [
            ("Last.fm base URL", &self.lastfm_base_url),
            ("Lyrics base URL", &self.lyrics_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(Error::Config(format!(
                "Request timeout exceeds maximum of {} seconds",
                MAX_REQUEST_TIMEOUT.as_secs()
            )));
        }

        Ok(())
    }

    /// Checks if Last.fm is configured
    pub fn has_lastfm(&self) -> bool {
        self.lastfm_api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

impl CatalogConfig {
    /// Creates a new builder for constructing a `CatalogConfig`.
    pub fn builder() -> CatalogConfigBuilder {
        CatalogConfigBuilder::default()
    }

    /// Loads configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first if it exists;
    /// variables already set in the environment take precedence.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(Error::Config(format!("Failed to read .env file: {}", e)));
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut builder = Self::builder();

        if let Some(url) = lookup("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(max) = lookup("DATABASE_MAX_CONNECTIONS") {
            builder = builder.max_connections(parse_var("DATABASE_MAX_CONNECTIONS", &max)?);
        }
        if let Some(secs) = lookup("DATABASE_CONNECT_TIMEOUT_SECS") {
            builder = builder.connect_timeout(Duration::from_secs(parse_var(
                "DATABASE_CONNECT_TIMEOUT_SECS",
                &secs,
            )?));
        }

        let mut metadata = MetadataApiConfig::new();
        if let Some(key) = lookup("API_KEY") {
            metadata = metadata.with_lastfm_api_key(key);
        }
        if let Some(url) = lookup("LASTFM_API_URL") {
            metadata = metadata.with_lastfm_base_url(url);
        }
        if let Some(url) = lookup("LYRICS_API_URL") {
            metadata = metadata.with_lyrics_base_url(url);
        }
        if let Some(secs) = lookup("HTTP_TIMEOUT_SECS") {
            metadata = metadata
                .with_request_timeout(Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", &secs)?));
        }

        builder.metadata_api_config(metadata).build()
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(Error::Config("Database URL cannot be empty".to_string()));
        }

        if self.max_connections == 0 {
            return Err(Error::Config(
                "Max connections must be greater than 0".to_string(),
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(Error::Config(
                "Connect timeout must be greater than 0".to_string(),
            ));
        }

        self.metadata_api_config.validate()
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::Config(format!(
            "Environment variable {} has invalid value '{}'",
            name, value
        ))
    })
}

/// Builder for [`CatalogConfig`]
#[derive(Debug, Default)]
pub struct CatalogConfigBuilder {
    database_url: Option<String>,
    max_connections: Option<u32>,
    connect_timeout: Option<Duration>,
    metadata_api_config: Option<MetadataApiConfig>,
}

impl CatalogConfigBuilder {
    /// Sets the SQLite connection URL. Required.
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Sets the maximum pool size (default 10).
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    /// Sets the connection acquire deadline (default 10 seconds).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the external API configuration.
    pub fn metadata_api_config(mut self, config: MetadataApiConfig) -> Self {
        self.metadata_api_config = Some(config);
        self
    }

    /// Builds the final `CatalogConfig` instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the database URL or Last.fm API key is
    /// missing, or any value is out of range.
    pub fn build(self) -> Result<CatalogConfig> {
        let database_url = self.database_url.ok_or_else(|| {
            Error::Config(
                "Database URL is required. Set DATABASE_URL or use .database_url()".to_string(),
            )
        })?;

        let config = CatalogConfig {
            database_url,
            max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            metadata_api_config: self.metadata_api_config.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}
