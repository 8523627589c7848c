//! Lyrist lyrics API client
//!
//! `GET {base}/{song}/{group}` returns `{"lyrics": "..."}` with stanzas
//! separated by blank lines.

use crate::error::{MetadataError, Result};
use bridge_traits::http::{HttpClient, HttpRequest};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const PROVIDER: &str = "Lyrics API";

#[derive(Debug, Deserialize)]
struct LyricsResponse {
    #[serde(default)]
    lyrics: String,
}

/// Lyrist API client
pub struct LyristClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    request_timeout: Duration,
}

impl LyristClient {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout,
        }
    }

    fn lyrics_url(&self, track: &str, artist: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(track),
            urlencoding::encode(artist)
        )
    }

    /// Fetches the full lyric text of a song
    ///
    /// # Errors
    ///
    /// - [`MetadataError::HttpError`] for any non-2xx status
    /// - [`MetadataError::LyricsNotFound`] when the lyrics are empty or whitespace
    pub async fn lyrics(&self, track: &str, artist: &str) -> Result<String> {
        debug!(artist, track, "Fetching lyrics");

        let request = HttpRequest::get(self.lyrics_url(track, artist))
            .header("Accept", "application/json")
            .timeout(self.request_timeout);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| MetadataError::NetworkError(format!("Lyrics request failed: {}", e)))?;

        if !response.is_success() {
            return Err(MetadataError::HttpError {
                provider: PROVIDER.to_string(),
                status: response.status,
                body: response.text_lossy(),
            });
        }

        let body: LyricsResponse = response.json().map_err(|e| {
            MetadataError::JsonParse(format!("Failed to parse lyrics response: {}", e))
        })?;

        if body.lyrics.trim().is_empty() {
            return Err(MetadataError::LyricsNotFound {
                song: track.to_string(),
                group: artist.to_string(),
            });
        }

        Ok(body.lyrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::HttpResponse;

    struct NeverCalled;

    #[async_trait]
    impl HttpClient for NeverCalled {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            unreachable!("url building only")
        }
    }

    #[test]
    fn test_lyrics_url_encodes_segments() {
        let client = LyristClient::new(
            Arc::new(NeverCalled),
            "https://lyrist.vercel.app/api/",
            Duration::from_secs(1),
        );

        assert_eq!(
            client.lyrics_url("Du Hast", "Rammstein"),
            "https://lyrist.vercel.app/api/Du%20Hast/Rammstein"
        );
        assert_eq!(
            client.lyrics_url("AC/DC", "x"),
            "https://lyrist.vercel.app/api/AC%2FDC/x"
        );
    }
}
