//! Demo: Exchange clock vs local clock
//!
//! Run: cargo run --bin server_time

use binance_rest::{clock::local_millis, BinanceRestClient, ClientConfig};
use chrono::{TimeZone, Utc};
use colored::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let client = BinanceRestClient::with_config(ClientConfig::from_env()?)?;

    let before = local_millis();
    let server = client.get_server_time().await?;
    let after = local_millis();

    // Compare against the midpoint of the round-trip
    let round_trip = after.saturating_sub(before);
    let local = before + round_trip / 2;
    let skew = server as i64 - local as i64;

    let server_dt = Utc
        .timestamp_millis_opt(server as i64)
        .single()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| server.to_string());

    println!("{} {}", "Exchange:".yellow(), client.base_url());
    println!("{} {} ({})", "Server time:".yellow(), server, server_dt);
    println!("{} {} ms", "Round trip:".yellow(), round_trip);

    let skew_text = format!("{:+} ms", skew);
    if skew.abs() > 1000 {
        println!("{} {}", "Local skew:".yellow(), skew_text.red());
    } else {
        println!("{} {}", "Local skew:".yellow(), skew_text.green());
    }

    Ok(())
}
