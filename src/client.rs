use std::{fmt, sync::Arc, time::Duration};

use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Response, Url,
};
use serde::de::DeserializeOwned;

use crate::{
    backoff::{linear_backoff, Sleeper, TokioSleeper},
    credentials::{CredentialSource, Credentials, EnvCredentials},
    FetchError, RequestOptions, Result, RetryOptions, RetryPolicy,
};

/// Public REST root of the Inventory Planner API.
pub const DEFAULT_BASE_URL: &str = "https://app.inventory-planner.com/api/v1";

const ACCOUNT_HEADER: &str = "account";

#[derive(Clone)]
/// HTTP fetcher that injects account credentials and retries failed attempts
/// with linear backoff.
pub struct RetryingFetcher {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
    options: RetryOptions,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for RetryingFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryingFetcher")
            .field("base_url", &self.base_url)
            .field("credentials", &"<redacted>")
            .field("options", &self.options)
            .field("policy", &self.policy)
            .field("sleeper", &self.sleeper)
            .finish()
    }
}

impl RetryingFetcher {
    /// Creates a fetcher that resolves credentials from `source` on every call.
    pub fn new(source: impl CredentialSource + 'static) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            credentials: Arc::new(source),
            options: RetryOptions::default(),
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Creates a fetcher with a fixed API key and account id.
    pub fn with_credentials(token: impl AsRef<str>, account: impl AsRef<str>) -> Result<Self> {
        Ok(Self::new(Credentials::new(token, account)?))
    }

    /// Creates a fetcher backed by environment variables.
    ///
    /// Reads:
    /// - `INVENTORY_PLANNER_API_KEY` — API key, sent verbatim as `Authorization`
    /// - `INVENTORY_PLANNER_ACCOUNT` — account id, sent as `Account`
    ///
    /// The variables are checked once here and then re-read on every fetch,
    /// so rotating them does not require a new fetcher.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use inventory_planner_http::RetryingFetcher;
    ///
    /// let fetcher = RetryingFetcher::from_env().expect("missing INVENTORY_PLANNER_* env vars");
    /// ```
    pub fn from_env() -> Result<Self> {
        let source = EnvCredentials::default();
        source.credentials()?;
        Ok(Self::new(source))
    }

    /// Applies attempt limit, backoff unit and timeout.
    pub fn with_options(mut self, opts: RetryOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the delay primitive used between attempts.
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Uses a preconfigured `reqwest::Client` (proxies, TLS roots, pools).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn options(&self) -> &RetryOptions {
        &self.options
    }

    /// Joins `path` onto the base URL.
    ///
    /// Example: `"purchase-orders"` → `"https://app.inventory-planner.com/api/v1/purchase-orders"`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Sends a request using the fetcher's configured retry options.
    ///
    /// On success the response is returned with its body unread.
    pub async fn fetch_with_retry(&self, url: &str, request: RequestOptions) -> Result<Response> {
        self.fetch_with(url, request, &self.options).await
    }

    /// Sends a request with per-call retry options.
    ///
    /// Makes at most `retry.max_attempts` attempts. After failed attempt `n`
    /// it waits `retry.backoff_ms * n` before the next one, unless `n` was
    /// the last attempt or the policy declines the failure. The error from
    /// the final attempt is returned unchanged.
    pub async fn fetch_with(
        &self,
        url: &str,
        request: RequestOptions,
        retry: &RetryOptions,
    ) -> Result<Response> {
        if retry.max_attempts == 0 {
            return Err(FetchError::InvalidOptions(
                "max_attempts must be at least 1".to_owned(),
            ));
        }
        let url = parse_url(url)?;
        let credentials = self.credentials.credentials()?;
        let headers = merged_headers(&request, &credentials)?;

        let mut attempt = 1usize;
        loop {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                attempt,
                max_attempts = retry.max_attempts,
                method = %request.method,
                url = %url,
                "sending request"
            );

            let err = match self.send_once(&url, &request, &headers, retry).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if attempt >= retry.max_attempts || !self.policy.should_retry(&err) {
                return Err(err);
            }

            self.wait_before_retry(retry.backoff_ms, attempt, &err).await;
            attempt += 1;
        }
    }

    /// Fetches `url` and decodes the JSON response body.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        request: RequestOptions,
    ) -> Result<T> {
        let response = self.fetch_with_retry(url, request).await?;
        let body = response.text().await.map_err(FetchError::Transport)?;
        serde_json::from_str::<T>(&body).map_err(|err| {
            FetchError::Decode(format!("invalid response JSON: {err}; body: {body}"))
        })
    }

    /// `GET`s a path under the base URL and decodes the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        self.fetch_json(&url, RequestOptions::get()).await
    }

    async fn send_once(
        &self,
        url: &Url,
        request: &RequestOptions,
        headers: &HeaderMap,
        retry: &RetryOptions,
    ) -> Result<Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .headers(headers.clone())
            .timeout(Duration::from_millis(retry.timeout_ms));
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(FetchError::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Best effort: the body is only needed for the diagnostic.
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => format!("<unreadable body: {err}>"),
        };
        Err(FetchError::Http {
            status: status.as_u16(),
            body,
        })
    }

    async fn wait_before_retry(&self, backoff_ms: u64, attempt: usize, err: &FetchError) {
        let delay = linear_backoff(backoff_ms, attempt);

        #[cfg(feature = "tracing")]
        tracing::warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "request attempt failed, retrying"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = err;

        self.sleeper.sleep(delay).await;
    }
}

fn parse_url(url: &str) -> Result<Url> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidUrl("url is empty".to_owned()));
    }
    let parsed =
        Url::parse(trimmed).map_err(|err| FetchError::InvalidUrl(format!("{trimmed}: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl(format!(
            "{trimmed}: unsupported scheme '{other}'"
        ))),
    }
}

/// Caller headers first, then credential headers with replace semantics.
fn merged_headers(request: &RequestOptions, credentials: &Credentials) -> Result<HeaderMap> {
    let mut headers = request.header_map()?;

    let mut authorization = HeaderValue::from_str(credentials.token()).map_err(|_| {
        FetchError::Credentials("api key is not a valid header value".to_owned())
    })?;
    authorization.set_sensitive(true);
    let account = HeaderValue::from_str(credentials.account()).map_err(|_| {
        FetchError::Credentials("account id is not a valid header value".to_owned())
    })?;

    headers.insert(header::AUTHORIZATION, authorization);
    headers.insert(HeaderName::from_static(ACCOUNT_HEADER), account);
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use reqwest::header;

    use super::{merged_headers, parse_url, RetryingFetcher, DEFAULT_BASE_URL};
    use crate::{Credentials, FetchError, RequestOptions, RetryOptions};

    fn creds() -> Credentials {
        Credentials::new("key-123", "acct-9").expect("valid credentials")
    }

    #[test]
    fn credential_headers_override_caller_headers() {
        let request = RequestOptions::get()
            .header("authorization", "Bearer caller")
            .header("ACCOUNT", "caller-account")
            .header("Content-Type", "text/plain")
            .header("X-Trace", "abc");
        let headers = merged_headers(&request, &creds()).expect("headers must merge");

        assert_eq!(headers.get_all(header::AUTHORIZATION).iter().count(), 1);
        assert_eq!(headers[header::AUTHORIZATION], "key-123");
        assert_eq!(headers["account"], "acct-9");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[header::ACCEPT], "application/json");
        assert_eq!(headers["x-trace"], "abc");
    }

    #[test]
    fn authorization_is_sent_without_scheme() {
        let headers = merged_headers(&RequestOptions::get(), &creds()).expect("headers");
        let value = headers[header::AUTHORIZATION].to_str().expect("ascii");
        assert!(!value.starts_with("Bearer"));
        assert!(headers[header::AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn parse_url_rejects_empty_and_foreign_schemes() {
        assert!(matches!(parse_url("  "), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(parse_url("not a url"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(
            parse_url("ftp://example.com/file"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(parse_url("https://example.com/api").is_ok());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let fetcher = RetryingFetcher::new(creds());
        assert_eq!(
            fetcher.endpoint("/purchase-orders"),
            format!("{DEFAULT_BASE_URL}/purchase-orders")
        );

        let fetcher = fetcher.with_base_url("http://localhost:8080/api/");
        assert_eq!(
            fetcher.endpoint("variants"),
            "http://localhost:8080/api/variants"
        );
    }

    #[test]
    fn debug_redacts_credentials() {
        let fetcher = RetryingFetcher::with_credentials("secret-key", "acct-secret")
            .expect("valid credentials");
        let debug = format!("{fetcher:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains("acct-secret"));
    }

    #[tokio::test]
    async fn zero_attempts_is_rejected_before_io() {
        let fetcher = RetryingFetcher::new(creds());
        let err = fetcher
            .fetch_with(
                "http://127.0.0.1:9/unused",
                RequestOptions::get(),
                &RetryOptions::default().attempts(0),
            )
            .await
            .expect_err("zero attempts must fail");
        assert!(matches!(err, FetchError::InvalidOptions(_)));
    }
}
