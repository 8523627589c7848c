//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the catalog crates:
//! - Logging and tracing initialization
//! - Configuration loading and validation
//!
//! Nothing here touches the store or the network. Hosts build a
//! [`CatalogConfig`](config::CatalogConfig), call
//! [`init_logging`](logging::init_logging) once, and hand the config to
//! `core_service::bootstrap`.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{CatalogConfig, CatalogConfigBuilder, MetadataApiConfig};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
