use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("{provider} returned HTTP {status}: {body}")]
    HttpError {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Failed to parse response: {0}")]
    JsonParse(String),

    #[error("Remote API error: {0}")]
    RemoteApi(String),

    #[error("no track URL found for song {song} by group {group}")]
    TrackNotFound { song: String, group: String },

    #[error("no lyrics found for song {song} by group {group}")]
    LyricsNotFound { song: String, group: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
