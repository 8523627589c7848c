//! Core service façade and bootstrap helpers.
//!
//! This crate wires the store, the HTTP bridge and the enrichment providers
//! into a [`CatalogService`]. Hosts either call [`bootstrap`] with a
//! [`CatalogConfig`], or assemble [`CoreDependencies`] themselves (tests swap
//! in fakes this way).

pub mod catalog;
pub mod error;
mod validation;

pub use catalog::CatalogService;
pub use error::{CoreError, Result};
pub use validation::MAX_NAME_LENGTH;

use std::sync::Arc;

use bridge_native::ReqwestHttpClient;
use bridge_traits::http::HttpClient;
use core_library::db::{create_pool, DatabaseConfig};
use core_library::{MusicRepository, SqliteMusicRepository};
use core_metadata::{EnrichmentService, MusicEnricher};
use core_runtime::config::CatalogConfig;
use tracing::info;

/// Aggregated handle to everything the catalog service requires.
pub struct CoreDependencies {
    pub repository: Arc<dyn MusicRepository>,
    pub enricher: Arc<dyn MusicEnricher>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit handles.
    pub fn new(repository: Arc<dyn MusicRepository>, enricher: Arc<dyn MusicEnricher>) -> Self {
        Self {
            repository,
            enricher,
        }
    }

    /// Open the store and build the enrichment providers described by `config`.
    ///
    /// Migrations are applied as part of opening the store.
    pub async fn from_config(config: &CatalogConfig) -> Result<Self> {
        config.validate()?;

        let db_config = DatabaseConfig::from_url(config.database_url.clone())
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout);
        let pool = create_pool(db_config).await?;

        let api_config = &config.metadata_api_config;
        let http_client: Arc<dyn HttpClient> = Arc::new(
            ReqwestHttpClient::with_timeout(api_config.request_timeout)
                .map_err(|err| CoreError::InitializationFailed(err.to_string()))?,
        );
        let enricher = EnrichmentService::from_config(http_client, api_config)?;

        Ok(Self::new(
            Arc::new(SqliteMusicRepository::new(pool)),
            Arc::new(enricher),
        ))
    }
}

impl From<CoreDependencies> for CatalogService {
    fn from(deps: CoreDependencies) -> Self {
        CatalogService::new(deps.repository, deps.enricher)
    }
}

/// Build a ready-to-use [`CatalogService`] from configuration.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// use core_runtime::config::CatalogConfig;
/// use tokio_util::sync::CancellationToken;
///
/// let config = CatalogConfig::from_env()?;
/// let catalog = core_service::bootstrap(&config).await?;
/// let songs = catalog
///     .list_by_filters(&Default::default(), 1, 10, &CancellationToken::new())
///     .await?;
/// # Ok(())
/// # }
/// ```
pub async fn bootstrap(config: &CatalogConfig) -> Result<CatalogService> {
    let deps = CoreDependencies::from_config(config).await?;
    info!("Catalog service ready");
    Ok(CatalogService::from(deps))
}
