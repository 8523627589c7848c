//! Music catalog.
//!
//! Stores songs with their verses, enriches new songs from Last.fm and the
//! Lyrist lyrics API, and exposes the catalog operations through
//! [`CatalogService`]. Host applications depend on this crate alone and call
//! [`bootstrap`].
//!
//! ```no_run
//! # async fn example() -> music_catalog::Result<()> {
//! use music_catalog::{bootstrap, init_logging, CatalogConfig, LoggingConfig, MusicQuery};
//! use tokio_util::sync::CancellationToken;
//!
//! init_logging(LoggingConfig::from_env()?)?;
//! let catalog = bootstrap(&CatalogConfig::from_env()?).await?;
//! let _song = catalog
//!     .save(MusicQuery::new("Sonne", "Rammstein"), &CancellationToken::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub use core_library::{Music, MusicFilters, MusicPatch, MusicQuery, Verse};
pub use core_runtime::{
    init_logging, CatalogConfig, CatalogConfigBuilder, LogFormat, LogLevel, LoggingConfig,
    MetadataApiConfig,
};
pub use core_service::{bootstrap, CatalogService, CoreDependencies, CoreError, Result};
