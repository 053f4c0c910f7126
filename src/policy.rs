use std::{fmt, sync::Arc};

use reqwest::StatusCode;

use crate::FetchError;

type Predicate = Arc<dyn Fn(&FetchError) -> bool + Send + Sync>;

/// Decides whether a failed attempt is worth another try.
///
/// Only consulted for per-attempt failures (`Http` and `Transport`). Input
/// and credential errors are never retried.
#[derive(Clone, Default)]
pub enum RetryPolicy {
    /// Retry every failure, client errors included.
    #[default]
    Always,
    /// Retry throttling, 5xx gateway-type statuses and connection-level errors.
    Transient,
    /// Caller-supplied predicate.
    Custom(Predicate),
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("Always"),
            Self::Transient => f.write_str("Transient"),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

impl RetryPolicy {
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&FetchError) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    pub fn should_retry(&self, err: &FetchError) -> bool {
        match err {
            FetchError::Http { .. } | FetchError::Transport(_) => {}
            _ => return false,
        }
        match self {
            Self::Always => true,
            Self::Transient => is_transient(err),
            Self::Custom(predicate) => predicate(err),
        }
    }
}

fn is_transient(err: &FetchError) -> bool {
    match err {
        FetchError::Http { status, .. } => StatusCode::from_u16(*status).is_ok_and(|status| {
            matches!(
                status,
                StatusCode::TOO_MANY_REQUESTS
                    | StatusCode::INTERNAL_SERVER_ERROR
                    | StatusCode::BAD_GATEWAY
                    | StatusCode::SERVICE_UNAVAILABLE
                    | StatusCode::GATEWAY_TIMEOUT
            )
        }),
        FetchError::Transport(err) => {
            err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
        }
        _ => false,
    }
}
