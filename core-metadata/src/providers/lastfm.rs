//! Last.fm API Client
//!
//! Looks up a song's reference page and publication date.
//!
//! ## API Endpoints
//!
//! - **Track Info**: `{base}?method=track.getInfo&api_key={key}&artist={artist}&track={track}&format=json`
//!
//! ## API Key Requirement
//!
//! Last.fm requires an API key for all requests.
//! Obtain one at: https://www.last.fm/api/account/create
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::providers::LastFmClient;
//!
//! let client = LastFmClient::new(http_client, "your_api_key", DEFAULT_LASTFM_BASE_URL, timeout);
//! let track = client.track_info("Rammstein", "Sonne").await?;
//! println!("{}", track.url);
//! ```

use crate::error::{MetadataError, Result};
use bridge_traits::http::{HttpClient, HttpRequest};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Layout of `track.wiki.published`, e.g. `22 Jan 2001, 00:00`
const PUBLISHED_FORMAT: &str = "%d %b %Y, %H:%M";

/// Last.fm error code for an unknown track
const ERROR_TRACK_NOT_FOUND: i32 = 6;

const PROVIDER: &str = "Last.fm";

/// The parts of `track.getInfo` the catalog uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Track page on last.fm, never empty
    pub url: String,
    /// Raw `wiki.published` value, if the track has a wiki
    pub published: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    track: Option<TrackBody>,
}

#[derive(Debug, Deserialize)]
struct TrackBody {
    #[serde(default)]
    url: String,
    wiki: Option<Wiki>,
}

#[derive(Debug, Deserialize)]
struct Wiki {
    published: Option<String>,
}

/// Last.fm error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: i32,
    message: String,
}

/// Parse a `wiki.published` value into its calendar date
pub fn parse_published(published: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
    NaiveDateTime::parse_from_str(published.trim(), PUBLISHED_FORMAT).map(|dt| dt.date())
}

/// Last.fm API client
pub struct LastFmClient {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    request_timeout: Duration,
}

impl LastFmClient {
    /// Creates a new Last.fm API client
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `api_key` - Last.fm API key
    /// * `base_url` - REST endpoint, normally `http://ws.audioscrobbler.com/2.0/`
    /// * `request_timeout` - Deadline for each request
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            request_timeout,
        }
    }

    fn track_info_url(&self, artist: &str, track: &str) -> String {
        format!(
            "{}?method=track.getInfo&api_key={}&artist={}&track={}&format=json",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(artist),
            urlencoding::encode(track)
        )
    }

    /// Fetches track information
    ///
    /// # Errors
    ///
    /// - [`MetadataError::HttpError`] for any non-2xx status
    /// - [`MetadataError::TrackNotFound`] when Last.fm knows no page for the track
    /// - [`MetadataError::NetworkError`] when the request could not complete
    pub async fn track_info(&self, artist: &str, track: &str) -> Result<TrackInfo> {
        debug!(artist, track, "Querying Last.fm track.getInfo");

        let request = HttpRequest::get(self.track_info_url(artist, track))
            .header("Accept", "application/json")
            .timeout(self.request_timeout);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| MetadataError::NetworkError(format!("Last.fm request failed: {}", e)))?;

        if !response.is_success() {
            return Err(MetadataError::HttpError {
                provider: PROVIDER.to_string(),
                status: response.status,
                body: response.text_lossy(),
            });
        }

        let not_found = || MetadataError::TrackNotFound {
            song: track.to_string(),
            group: artist.to_string(),
        };

        if let Ok(error_resp) = response.json::<ErrorResponse>() {
            return Err(match error_resp.error {
                ERROR_TRACK_NOT_FOUND => not_found(),
                code => MetadataError::RemoteApi(format!(
                    "Last.fm API error {}: {}",
                    code, error_resp.message
                )),
            });
        }

        let body: TrackResponse = response.json().map_err(|e| {
            MetadataError::JsonParse(format!("Failed to parse Last.fm response: {}", e))
        })?;

        let track_body = body.track.ok_or_else(not_found)?;
        if track_body.url.trim().is_empty() {
            return Err(not_found());
        }

        Ok(TrackInfo {
            url: track_body.url,
            published: track_body.wiki.and_then(|wiki| wiki.published),
        })
    }
}
