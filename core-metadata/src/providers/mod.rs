//! External Metadata Providers
//!
//! This module contains clients for the external services a song is enriched from:
//! - Last.fm - reference page and publication date (`track.getInfo`)
//! - Lyrist - full lyric text
//!
//! Providers make a single attempt per call with the configured request timeout.

pub mod lastfm;
pub mod lyrist;

pub use lastfm::{LastFmClient, TrackInfo};
pub use lyrist::LyristClient;
