//! Ingest Service - Fetches the raw Stats SA unit value index payload
//!
//! Responsibilities:
//! - Issue a single timed GET against the Isibalo ETS endpoint (P0142.7)
//! - Fail fast on HTTP errors or a non-JSON body
//! - Print the payload for inspection
//! - Optionally keep the raw body on disk for later re-runs
//!
//! Usage:
//!   # Fetch and print:
//!   cargo run --bin ingest
//!
//!   # Fetch, print, and save the raw body:
//!   cargo run --bin ingest -- --out data/p0142_7.json

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

#[derive(Parser, Debug)]
#[command(name = "ingest", about = "Fetches the raw unit value index payload")]
struct Args {
    /// Save the raw response body to this path
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Stats SA Isibalo time-series endpoint for publication P0142.7
/// (Export and Import Unit Value Indices, monthly).
const ETS_URL: &str = "https://isibaloweb.statssa.gov.za/data/ETS/Monthly/Export%20and%20Import%20Unit%20Value%20IndicesP0142_7/P0142_7p.json";

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// The endpoint rejects some default agents, so send a browser-style one.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// The payload nests the record list under a `SASTableData+<code>` key.
const TABLE_KEY_PREFIX: &str = "SASTableData+";

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Count the raw records if the payload has the expected shape.
fn record_count(payload: &Value) -> Option<usize> {
    payload
        .as_object()?
        .iter()
        .find(|(key, _)| key.starts_with(TABLE_KEY_PREFIX))
        .and_then(|(_, value)| value.as_array())
        .map(|records| records.len())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    println!("=== Unit Value Indices Ingest ===");
    println!("Fetching: {}", ETS_URL);

    let client = http_client()?;
    let resp = client
        .get(ETS_URL)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .context("HTTP request failed")?
        .error_for_status()
        .context("HTTP request failed")?;

    let body = resp.text().await.context("Failed to read response body")?;
    println!("Downloaded: {} bytes", body.len());

    let payload: Value =
        serde_json::from_str(&body).context("Response body is not valid JSON")?;

    if let Some(path) = &args.out {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).await?;
            }
        }
        fs::write(path, &body)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved raw body to: {}", path.display());
    }

    match record_count(&payload) {
        Some(count) => println!("Payload holds {} raw records", count),
        None => eprintln!("Warning: payload has no {}<code> record list", TABLE_KEY_PREFIX),
    }

    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_count_with_table_key() {
        let payload = json!({
            "SASTableData+P0142_7": [
                { "H01": "P0142.7", "MO012016": 63.1 },
                { "H01": "P0142.7", "MO012016": 70.2 }
            ]
        });
        assert_eq!(record_count(&payload), Some(2));
    }

    #[test]
    fn test_record_count_without_table_key() {
        let payload = json!({ "something_else": [] });
        assert_eq!(record_count(&payload), None);
    }

    #[test]
    fn test_record_count_non_object_payload() {
        let payload = json!([1, 2, 3]);
        assert_eq!(record_count(&payload), None);
    }
}
