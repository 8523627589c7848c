//! # Metadata & Lyrics Module
//!
//! Enriches a song, known only by name and group, with data from external
//! services.
//!
//! ## Overview
//!
//! This module handles:
//! - Track lookups against Last.fm (reference link, release date)
//! - Lyrics fetching from the Lyrist API
//! - Splitting lyric text into numbered verses
//!
//! [`EnrichmentService`] combines the providers behind the [`MusicEnricher`]
//! trait, which is what the catalog service depends on.

pub mod enrichment_service;
pub mod error;
pub mod lyrics;
pub mod providers;

pub use enrichment_service::{EnrichmentService, MusicEnricher};
pub use error::{MetadataError, Result};
pub use lyrics::split_verses;
pub use providers::{LastFmClient, LyristClient, TrackInfo};
