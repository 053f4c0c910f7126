//! Account credentials injected into every outbound request.
//!
//! Inventory Planner expects the API key verbatim in `Authorization` (no
//! `Bearer` scheme) and the account identifier in a separate `Account` header.

use std::fmt;

use crate::{FetchError, Result};

/// Default environment variable holding the API key.
pub const API_KEY_ENV: &str = "INVENTORY_PLANNER_API_KEY";
/// Default environment variable holding the account identifier.
pub const ACCOUNT_ENV: &str = "INVENTORY_PLANNER_ACCOUNT";

/// API key and account identifier for one Inventory Planner account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
    account: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("account", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Builds credentials, trimming surrounding whitespace.
    ///
    /// Returns an error if either value is blank.
    pub fn new(token: impl AsRef<str>, account: impl AsRef<str>) -> Result<Self> {
        let token = token.as_ref().trim();
        let account = account.as_ref().trim();
        if token.is_empty() {
            return Err(FetchError::Credentials("api key is empty".to_owned()));
        }
        if account.is_empty() {
            return Err(FetchError::Credentials("account id is empty".to_owned()));
        }
        Ok(Self {
            token: token.to_owned(),
            account: account.to_owned(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

/// Supplies credentials at call time.
///
/// Resolved once per fetch, so a rotated key takes effect on the next call.
pub trait CredentialSource: Send + Sync {
    fn credentials(&self) -> Result<Credentials>;
}

impl CredentialSource for Credentials {
    fn credentials(&self) -> Result<Credentials> {
        Ok(self.clone())
    }
}

/// Reads credentials from process environment variables on every call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvCredentials {
    api_key_var: String,
    account_var: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(API_KEY_ENV, ACCOUNT_ENV)
    }
}

impl EnvCredentials {
    /// Uses custom variable names.
    pub fn new(api_key_var: impl Into<String>, account_var: impl Into<String>) -> Self {
        Self {
            api_key_var: api_key_var.into(),
            account_var: account_var.into(),
        }
    }

    fn read(name: &str) -> Result<String> {
        let value = std::env::var(name)
            .map_err(|_| FetchError::Credentials(format!("missing {name} environment variable")))?;
        if value.trim().is_empty() {
            return Err(FetchError::Credentials(format!("{name} is set but empty")));
        }
        Ok(value)
    }
}

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Result<Credentials> {
        let token = Self::read(&self.api_key_var)?;
        let account = Self::read(&self.account_var)?;
        Credentials::new(token, account)
    }
}
