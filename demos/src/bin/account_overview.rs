//! Demo 2: Account Overview
//!
//! Showcases: Signed requests, wallet balances, open orders
//!
//! Requires BINANCE_API_KEY and BINANCE_SECRET_KEY.
//! Run: cargo run --bin account_overview

use binance_rest::{usd_pair, BinanceRestClient, RestError};
use colored::*;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  ACCOUNT OVERVIEW".cyan().bold());
    println!("{}", "  Binance.US REST Demo - Signed Endpoints".cyan());
    println!("{}", "═".repeat(65).cyan());
    println!();

    let client = match BinanceRestClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            println!("  Set BINANCE_API_KEY and BINANCE_SECRET_KEY to run this demo.");
            return Ok(());
        }
    };

    let coins = match client.balances().coins().await {
        Ok(coins) => coins,
        Err(e @ RestError::MalformedRequest(_)) => {
            println!("{} Request rejected: {}", "✗".red(), e);
            println!("  Check the API key permissions and the system clock.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{} {} coins with a balance\n", "✓".green(), coins.len());

    let mut total_usd = Decimal::ZERO;
    for coin in &coins {
        let usd_value = if coin.symbol == "USD" {
            Some(coin.amount())
        } else {
            client
                .market_data()
                .price_for(&usd_pair(&coin.symbol))
                .await
                .ok()
                .map(|price| price * coin.amount())
        };

        if let Some(value) = usd_value.and_then(Decimal::from_f64_retain) {
            total_usd += value;
        }

        println!(
            "  {:<8} {:>20} {:>14}",
            coin.symbol.bold(),
            coin.amount_decimal().normalize(),
            usd_value
                .map(|v| format!("${:.2}", v))
                .unwrap_or_else(|| "-".to_string())
                .dimmed()
        );
    }
    println!("  {}", "─".repeat(44).dimmed());
    println!("  {:<8} {:>35}", "TOTAL".bold(), format!("${:.2}", total_usd).green().bold());

    println!();
    let open = client.spot().open_orders(None, None).await?;
    let open = open.as_array().map(Vec::len).unwrap_or(0);
    println!("  Open orders: {}", open.to_string().yellow());

    Ok(())
}
