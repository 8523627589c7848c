//! # Catalog Service
//!
//! Validates caller input, then coordinates the record repository and the
//! enrichment client.
//!
//! ## Saving
//!
//! `save` is lookup-or-create. A song that is already stored is returned as
//! is and the enricher is never called again. A new song is enriched,
//! normalized and persisted. When a concurrent save inserts the same song
//! first, the store reports a conflict and the winner's record is returned.
//!
//! ## Cancellation
//!
//! Every operation takes a [`CancellationToken`]. It is checked before any
//! collaborator is called, and each delegated future is raced against it, so
//! cancelling drops in-flight store queries and HTTP calls.

use crate::error::{CoreError, Result};
use crate::validation::{
    validate_filters, validate_id, validate_page, validate_patch, validate_query,
    validate_verse_range,
};
use core_library::models::{Music, MusicFilters, MusicPatch, MusicQuery};
use core_library::{LibraryError, MusicRepository};
use core_metadata::MusicEnricher;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument, Span};

/// Façade over the music catalog
#[derive(Clone)]
pub struct CatalogService {
    repository: Arc<dyn MusicRepository>,
    enricher: Arc<dyn MusicEnricher>,
    span: Span,
}

impl CatalogService {
    pub fn new(repository: Arc<dyn MusicRepository>, enricher: Arc<dyn MusicEnricher>) -> Self {
        Self {
            repository,
            enricher,
            span: info_span!("catalog"),
        }
    }

    /// Record this service's events under `span`
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Return the stored record for a song, enriching and storing it first if
    /// it is not known yet
    ///
    /// # Errors
    ///
    /// - [`CoreError::Validation`] when the song name is empty
    /// - [`CoreError::Metadata`] when enrichment fails; nothing is stored
    /// - [`CoreError::Cancelled`] when `cancel` fires first
    pub async fn save(&self, query: MusicQuery, cancel: &CancellationToken) -> Result<Music> {
        let query = query.normalized();
        validate_query(&query)?;

        let span = info_span!(
            parent: &self.span,
            "save",
            song_name = %query.song_name,
            group_name = %query.group_name
        );

        self.lookup_or_create(&query, cancel)
            .instrument(span)
            .await
    }

    async fn lookup_or_create(&self, query: &MusicQuery, cancel: &CancellationToken) -> Result<Music> {
        ensure_active(cancel)?;

        let existing = until_cancelled(
            cancel,
            self.repository
                .find_by_name(&query.song_name, &query.group_name),
        )
        .await?;

        if let Some(music) = existing {
            debug!(music_id = ?music.id, "Song already stored");
            return Ok(music);
        }

        let mut music = until_cancelled(
            cancel,
            self.enricher
                .fetch_enriched(&query.group_name, &query.song_name),
        )
        .await?;
        music.normalize_names();

        match until_cancelled(cancel, self.repository.create(&music)).await {
            Ok(created) => {
                info!(music_id = ?created.id, verses = created.verses.len(), "Song saved");
                Ok(created)
            }
            Err(CoreError::Library(LibraryError::Conflict(reason))) => {
                warn!(%reason, "Song was stored concurrently, returning stored record");
                self.find_winner(&music, cancel).await
            }
            Err(e) => Err(e),
        }
    }

    async fn find_winner(&self, music: &Music, cancel: &CancellationToken) -> Result<Music> {
        let stored = until_cancelled(
            cancel,
            self.repository
                .find_by_name(&music.song_name, &music.group_name),
        )
        .await?;

        stored.ok_or_else(|| {
            CoreError::Library(LibraryError::Conflict(format!(
                "song {} by group {} conflicted but is no longer stored",
                music.song_name, music.group_name
            )))
        })
    }

    /// List record heads matching `filters`, one page at a time
    ///
    /// `page` starts at 1. Records come back in store order.
    pub async fn list_by_filters(
        &self,
        filters: &MusicFilters,
        page: i64,
        page_size: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<Music>> {
        validate_filters(filters)?;
        let page_request = validate_page(page, page_size)?;
        ensure_active(cancel)?;

        let span = info_span!(parent: &self.span, "list_by_filters", page, page_size);

        until_cancelled(
            cancel,
            self.repository.list_by_filters(filters, page_request),
        )
        .instrument(span)
        .await
    }

    /// Fetch a record with `limit` of its verses, skipping the first `offset`
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the record is unknown or the window holds no verses.
    pub async fn list_verses(
        &self,
        music_id: &str,
        limit: i64,
        offset: i64,
        cancel: &CancellationToken,
    ) -> Result<Option<Music>> {
        validate_id(music_id)?;
        let range = validate_verse_range(limit, offset)?;
        ensure_active(cancel)?;

        let span = info_span!(parent: &self.span, "list_verses", music_id, limit, offset);

        until_cancelled(cancel, self.repository.list_verses(music_id, range))
            .instrument(span)
            .await
    }

    /// Delete a record and its verses
    ///
    /// # Returns
    ///
    /// Whether a record was removed.
    pub async fn delete(&self, music_id: &str, cancel: &CancellationToken) -> Result<bool> {
        validate_id(music_id)?;
        ensure_active(cancel)?;

        let span = info_span!(parent: &self.span, "delete", music_id);

        until_cancelled(cancel, self.repository.delete(music_id))
            .instrument(span)
            .await
    }

    /// Apply a partial update and return the whole record afterwards
    ///
    /// Supplied names are lower-cased, the form `save` stores them in.
    pub async fn update(&self, mut patch: MusicPatch, cancel: &CancellationToken) -> Result<Music> {
        validate_patch(&patch)?;
        patch.normalize_names();
        ensure_active(cancel)?;

        let span = info_span!(parent: &self.span, "update", music_id = %patch.id);

        until_cancelled(cancel, self.repository.update(&patch))
            .instrument(span)
            .await
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(CoreError::Cancelled);
    }
    Ok(())
}

/// Drive `future` unless `cancel` fires first, in which case it is dropped
async fn until_cancelled<T, E, F>(cancel: &CancellationToken, future: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    CoreError: From<E>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("Operation cancelled by caller");
            Err(CoreError::Cancelled)
        }
        result = future => result.map_err(CoreError::from),
    }
}
