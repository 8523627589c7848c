//! # Enrichment Service
//!
//! Builds a full [`Music`] record from a song and group name by asking the
//! metadata provider for the reference page and release date, then the lyrics
//! provider for the verses.
//!
//! ## Flow
//!
//! ```text
//! fetch_enriched(group, song)
//!     │
//!     ├──> LastFmClient::track_info    (link, release date)
//!     │        └── failure: stop, lyrics are never requested
//!     │
//!     └──> LyristClient::lyrics        (verses)
//! ```
//!
//! A release date that cannot be parsed is logged and left unset. Every other
//! failure is returned to the caller.
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::{EnrichmentService, MusicEnricher};
//!
//! let service = EnrichmentService::from_config(http_client, &config.metadata_api_config)?;
//! let music = service.fetch_enriched("rammstein", "sonne").await?;
//! ```

use crate::error::{MetadataError, Result};
use crate::lyrics::split_verses;
use crate::providers::lastfm::{parse_published, LastFmClient};
use crate::providers::lyrist::LyristClient;
use async_trait::async_trait;
use bridge_traits::http::HttpClient;
use core_library::models::Music;
use core_runtime::config::MetadataApiConfig;
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument, Span};

/// Source of enriched song records
#[async_trait]
pub trait MusicEnricher: Send + Sync {
    /// Fetch link, release date and verses for a song
    ///
    /// The returned record has no id and carries the names exactly as passed in.
    async fn fetch_enriched(&self, group_name: &str, song_name: &str) -> Result<Music>;
}

/// [`MusicEnricher`] backed by Last.fm and Lyrist
pub struct EnrichmentService {
    lastfm: LastFmClient,
    lyrist: LyristClient,
    span: Span,
}

impl EnrichmentService {
    pub fn new(lastfm: LastFmClient, lyrist: LyristClient) -> Self {
        Self {
            lastfm,
            lyrist,
            span: tracing::info_span!("enrichment"),
        }
    }

    /// Create both providers from configuration, sharing one HTTP client
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Config`] when no Last.fm API key is configured.
    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &MetadataApiConfig) -> Result<Self> {
        let api_key = config
            .lastfm_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| MetadataError::Config("Last.fm API key is not set".to_string()))?;

        let lastfm = LastFmClient::new(
            Arc::clone(&http_client),
            api_key,
            config.lastfm_base_url.clone(),
            config.request_timeout,
        );
        let lyrist = LyristClient::new(
            http_client,
            config.lyrics_base_url.clone(),
            config.request_timeout,
        );

        Ok(Self::new(lastfm, lyrist))
    }

    /// Replace the span enrichment events are recorded under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    async fn enrich(&self, group_name: &str, song_name: &str) -> Result<Music> {
        let track = self.lastfm.track_info(group_name, song_name).await?;

        let mut music = Music::new(song_name, group_name).with_link(track.url);

        if let Some(published) = track.published.as_deref() {
            match parse_published(published) {
                Ok(date) => music.release_date = Some(date),
                Err(e) => warn!(
                    published,
                    error = %e,
                    "Unparseable release date, leaving it unset"
                ),
            }
        }

        let lyrics = self.lyrist.lyrics(song_name, group_name).await?;
        music.verses = split_verses(&lyrics);

        debug!(verses = music.verses.len(), "Lyrics split into verses");
        Ok(music)
    }
}

#[async_trait]
impl MusicEnricher for EnrichmentService {
    async fn fetch_enriched(&self, group_name: &str, song_name: &str) -> Result<Music> {
        let span = tracing::info_span!(parent: &self.span, "fetch_enriched", group_name, song_name);

        async {
            match self.enrich(group_name, song_name).await {
                Ok(music) => {
                    info!("Song enriched");
                    Ok(music)
                }
                Err(e) => {
                    warn!(error = %e, "Enrichment failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};

    struct Unreachable;

    #[async_trait]
    impl HttpClient for Unreachable {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            unreachable!("construction only")
        }
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let result = EnrichmentService::from_config(Arc::new(Unreachable), &MetadataApiConfig::new());
        assert!(matches!(result, Err(MetadataError::Config(_))));

        let blank = MetadataApiConfig::new().with_lastfm_api_key("  ");
        let result = EnrichmentService::from_config(Arc::new(Unreachable), &blank);
        assert!(matches!(result, Err(MetadataError::Config(_))));
    }

    #[test]
    fn test_from_config_with_api_key() {
        let config = MetadataApiConfig::new().with_lastfm_api_key("key");
        assert!(EnrichmentService::from_config(Arc::new(Unreachable), &config).is_ok());
    }
}
