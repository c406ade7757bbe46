use thiserror::Error;

/// Failures at the remote-API boundary.
///
/// The sync layer collapses every variant into a display string recorded in
/// the store's `last_error` field; the taxonomy only exists so client code
/// reads cleanly. Nothing here is fatal.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not authenticated")]
    MissingAuth,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("remote rejected the request: {message}")]
    Rejected { message: String },

    #[error("malformed response envelope")]
    MalformedEnvelope,

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
