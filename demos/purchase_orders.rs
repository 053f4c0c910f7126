use inventory_planner_http::{RequestOptions, RetryOptions, RetryPolicy, RetryingFetcher};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fetcher = RetryingFetcher::from_env()?
        .with_policy(RetryPolicy::Transient)
        .with_options(RetryOptions::default().attempts(4).backoff_ms(1_000));

    let orders: Value = fetcher.get_json("purchase-orders?status=open&limit=20").await?;
    if let Some(list) = orders["purchase-orders"].as_array() {
        for order in list {
            println!("{} {}", order["id"], order["status"]);
        }
    }

    let url = fetcher.endpoint("purchase-orders");
    let response = fetcher
        .fetch_with_retry(
            &url,
            RequestOptions::post().json(&json!({
                "purchase-order": {
                    "vendor_id": 1,
                    "items": [{ "sku": "DEMO-SKU", "replenishment": 12 }]
                }
            }))?,
        )
        .await?;
    println!("created: {}", response.text().await?);

    Ok(())
}
