use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use serde::Serialize;

use crate::{FetchError, Result};

/// Caller-side transport configuration for one fetch.
///
/// Defaults to a bodyless `GET` with no extra headers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Method,
    /// Caller headers in insertion order. Credential headers override these.
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    pub fn put() -> Self {
        Self::with_method(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::with_method(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Appends a caller header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a raw request body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `value` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        let encoded = serde_json::to_vec(value)
            .map_err(|err| FetchError::Encode(format!("request body: {err}")))?;
        self.body = Some(encoded);
        Ok(self)
    }

    /// Converts caller headers into a `HeaderMap`.
    ///
    /// Repeated names are appended, not replaced.
    pub(crate) fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len() + 4);
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| FetchError::InvalidHeader(format!("name '{name}': {err}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|err| FetchError::InvalidHeader(format!("value for '{name}': {err}")))?;
            map.append(header_name, header_value);
        }
        Ok(map)
    }
}
