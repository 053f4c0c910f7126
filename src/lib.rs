//! `inventory-planner-http` is a retrying async HTTP fetcher for the
//! Inventory Planner REST API.
//!
//! Every request carries the account's `Authorization` and `Account`
//! headers. Failed attempts are retried with linear backoff:
//! - [`RetryingFetcher::fetch_with_retry`]
//! - [`RetryingFetcher::fetch_with`]
//! - [`RetryingFetcher::fetch_json`]

mod backoff;
mod client;
mod credentials;
mod error;
mod options;
mod policy;
mod request;

pub use backoff::{linear_backoff, SleepFuture, Sleeper, TokioSleeper};
pub use client::{RetryingFetcher, DEFAULT_BASE_URL};
pub use credentials::{CredentialSource, Credentials, EnvCredentials, ACCOUNT_ENV, API_KEY_ENV};
pub use error::FetchError;
pub use options::RetryOptions;
pub use policy::RetryPolicy;
pub use request::RequestOptions;

pub type Result<T> = std::result::Result<T, FetchError>;
