/// Failures of the movie search transport
///
/// The presenter absorbs every one of these and turns it into a
/// `search_error_text` notification.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("TMDB API error [{status}]: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode TMDB response: {0}")]
    Decode(String),

    #[error("Invalid TMDB response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
