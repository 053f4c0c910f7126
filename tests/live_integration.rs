use std::fs;

use inventory_planner_http::{
    Credentials, FetchError, RetryOptions, RetryPolicy, RetryingFetcher, ACCOUNT_ENV, API_KEY_ENV,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "INVENTORY_PLANNER_API_KEY")]
    api_key: Option<String>,
    #[serde(rename = "INVENTORY_PLANNER_ACCOUNT")]
    account: Option<String>,
}

fn load_live_credentials() -> Result<Credentials, String> {
    if let (Ok(api_key), Ok(account)) = (std::env::var(API_KEY_ENV), std::env::var(ACCOUNT_ENV)) {
        return Credentials::new(api_key, account).map_err(|err| err.to_string());
    }

    let content = fs::read_to_string("secrets.json")
        .map_err(|_| format!("{API_KEY_ENV}/{ACCOUNT_ENV} env or secrets.json is required"))?;
    let parsed: SecretsFile = serde_json::from_str(&content)
        .map_err(|err| format!("secrets.json could not be parsed: {err}"))?;

    let api_key = parsed
        .api_key
        .ok_or_else(|| format!("missing {API_KEY_ENV} in secrets.json"))?;
    let account = parsed
        .account
        .ok_or_else(|| format!("missing {ACCOUNT_ENV} in secrets.json"))?;
    Credentials::new(api_key, account).map_err(|err| err.to_string())
}

#[tokio::test]
async fn live_purchase_orders_and_rejected_account() {
    let credentials = match load_live_credentials() {
        Ok(values) => values,
        Err(_) => {
            eprintln!("skipping live test: credentials not found in env or secrets.json");
            return;
        }
    };

    let fetcher = RetryingFetcher::new(credentials.clone())
        .with_options(RetryOptions::default().attempts(2).backoff_ms(500));

    let orders: JsonValue = fetcher
        .get_json("purchase-orders?limit=1")
        .await
        .expect("purchase order listing must succeed");
    assert!(orders.is_object());

    let rejected = RetryingFetcher::with_credentials(credentials.token(), "no-such-account")
        .expect("credentials must be non-empty")
        .with_policy(RetryPolicy::Transient);
    let err = rejected
        .get_json::<JsonValue>("purchase-orders?limit=1")
        .await
        .expect_err("unknown account must be rejected");
    match err {
        FetchError::Http { status, .. } => assert!((400..500).contains(&status)),
        other => panic!("expected http rejection, got {other:?}"),
    }
}
