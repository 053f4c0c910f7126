/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Missing or unusable API credentials.
    #[error("credentials error: {0}")]
    Credentials(String),
    /// Target URL is empty or cannot be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// Caller-supplied header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    /// Retry configuration that cannot be executed.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// Request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),
    /// Response body is not the expected JSON shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// HTTP status of an upstream rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
