//! Demo 1: Price Ticker
//!
//! Showcases: Public market data, typed price helpers, error classification
//!
//! Run: cargo run --bin price_ticker -- BTC ETH SOL

use binance_rest::{usd_pair, BinanceRestClient, RestError};
use colored::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut coins: Vec<String> = std::env::args().skip(1).collect();
    if coins.is_empty() {
        coins = vec!["BTC".into(), "ETH".into(), "SOL".into()];
    }

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  PRICE TICKER".cyan().bold());
    println!("{}", "  Binance.US REST Demo - Public Market Data".cyan());
    println!("{}", "═".repeat(65).cyan());
    println!();

    let client = BinanceRestClient::new();
    let time = client.market_data().server_time().await?;
    println!("{} Exchange time {}\n", "✓".green(), time.to_rfc3339());

    println!(
        "  {:<10} {:>14} {:>14} {:>14}",
        "PAIR".bold(),
        "LAST".bold(),
        "AVG (5m)".bold(),
        "VWAP (24h)".bold()
    );
    println!("  {}", "─".repeat(55).dimmed());

    for coin in &coins {
        let pair = usd_pair(coin);
        let market = client.market_data();

        match market.price_for(&pair).await {
            Ok(last) => {
                let avg = market.avg_price_for(&pair).await.unwrap_or(f64::NAN);
                let vwap = market.avg_price_24h_for(&pair).await.unwrap_or(f64::NAN);
                let colored_last = if last >= vwap {
                    format!("{:>14.4}", last).green()
                } else {
                    format!("{:>14.4}", last).red()
                };
                println!("  {:<10} {} {:>14.4} {:>14.4}", pair, colored_last, avg, vwap);
            }
            Err(e @ RestError::MalformedRequest(_)) => {
                let reason = format!("unknown symbol ({})", e.message().unwrap_or("?"));
                println!("  {:<10} {}", pair, reason.yellow());
            }
            Err(e) if e.is_rate_limited() => {
                println!("  {} {}", "Rate limited:".red().bold(), e);
                if let Some(delay) = e.recovery_strategy().initial_delay() {
                    println!("  Backing off for {:?}", delay);
                    tokio::time::sleep(delay.min(Duration::from_secs(10))).await;
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!();
    match client.market_data().book_ticker_for(&usd_pair(&coins[0])).await {
        Ok(book) => println!(
            "  {} bid {} / ask {} (spread {})",
            book.symbol.bold(),
            book.bid_price.to_string().green(),
            book.ask_price.to_string().red(),
            book.spread()
        ),
        Err(e) => println!("  {} {}", "Book ticker failed:".red(), e),
    }

    Ok(())
}
