//! Demo: Spot order lifecycle on the Binance testnet
//!
//! Prints balances, places a SELL LIMIT order far above the market, lists
//! open orders, cancels the first one and prints balances again.
//!
//! Reads BINANCE_API_KEY and BINANCE_SECRET_KEY (a `.env` file works too).
//!
//! Run: cargo run --bin spot_walkthrough

use binance_auth::Credentials;
use binance_rest::{AccountInfo, BinanceRestClient, ClientConfig, OrderParams, TimeInForce};
use colored::*;
use rust_decimal_macros::dec;

fn print_balances(account: &AccountInfo) {
    let mut shown = 0;
    for balance in account.non_zero_balances() {
        println!(
            "    {:<8} {} {}  {} {}",
            balance.asset.yellow(),
            balance.free,
            "(free)".dimmed(),
            balance.locked,
            "(locked)".dimmed()
        );
        shown += 1;
    }
    if shown == 0 {
        println!("    {}", "no assets".dimmed());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  BINANCE SPOT WALKTHROUGH".cyan().bold());
    println!("{}", "  Signed REST requests against the testnet".cyan());
    println!("{}", "═".repeat(60).cyan());
    println!();

    let credentials = Credentials::from_env()?;
    let config = ClientConfig::from_env()?.with_credentials(credentials);
    let client = BinanceRestClient::with_config(config)?;
    println!("{} Using {}\n", "✓".green(), client.base_url());

    println!("{}", "1. All non zero assets".bold());
    print_balances(&client.get_user_data(None).await?);

    println!("\n{}", "2. Place an order".bold());
    let params = OrderParams::new()
        .with_time_in_force(TimeInForce::GoodTillCancelled)
        .with_quantity(dec!(0.01))
        .with_price(dec!(25000));
    let order = client.create_order("BTCUSDT", "SELL", "LIMIT", params).await?;
    println!(
        "{} Created order {} on {} ({:?})",
        "✓".green(),
        order.order_id,
        order.symbol,
        order.status
    );

    println!("\n{}", "Assets after creating order".bold());
    print_balances(&client.get_user_data(None).await?);

    println!("\n{}", "3. All open orders".bold());
    let open_orders = client.get_open_orders(None).await?;
    for open in &open_orders {
        println!(
            "    #{} {} {} {} @ {} ({:?})",
            open.order_id, open.symbol, open.side, open.orig_qty, open.price, open.status
        );
    }
    println!("    Number of open orders: {}", open_orders.len().to_string().cyan());

    println!("\n{}", "4. Cancel order".bold());
    match open_orders.first() {
        Some(first) => {
            let cancelled = client.cancel_order(&first.symbol, first.order_id).await?;
            println!(
                "{} Order {} on {}: {:?}",
                "✓".green(),
                first.order_id,
                first.symbol,
                cancelled.status
            );
        }
        None => println!("{} No open order to cancel", "!".yellow()),
    }

    println!("\n{}", "Assets after order cancellation".bold());
    print_balances(&client.get_user_data(None).await?);

    Ok(())
}
