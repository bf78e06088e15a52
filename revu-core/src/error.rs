use thiserror::Error;

/// Failure reported by an external collaborator (review service or diff provider).
///
/// Poll and status failures are transient and swallowed by the event loop;
/// submit and diff failures abort the session before the terminal is taken over.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("transport error: {0}")]
    Transport(String),
    /// The service answered with a non-success status code.
    #[error("review service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
    /// The diff provider could not compute the changed-file list.
    #[error("diff provider failed: {0}")]
    Diff(String),
    /// Required configuration (base URL, token) is missing.
    #[error("not configured: {0}")]
    Config(String),
}
