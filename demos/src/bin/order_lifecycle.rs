//! Demo 3: Order Lifecycle
//!
//! Showcases: Order validation, placement, lookup by client id, cancellation,
//! and handling an unknown outcome (HTTP 504)
//!
//! Places a far-from-market LIMIT_MAKER order and cancels it again.
//! Requires BINANCE_API_KEY and BINANCE_SECRET_KEY.
//! Run: cargo run --bin order_lifecycle -- BTCUSD

use binance_rest::{BinanceRestClient, NewOrder, OrderRef, OrderSide, RestError};
use colored::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "BTCUSD".to_string());
    let client = BinanceRestClient::from_env()?;

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  ORDER LIFECYCLE".cyan().bold());
    println!("{}", "═".repeat(65).cyan());
    println!();

    let book = client.market_data().book_ticker_for(&symbol).await?;
    let price = (book.bid_price / dec!(2)).round_dp(2);
    let client_id = format!("demo-{}", std::process::id());

    let order = NewOrder::limit_maker(&symbol, OrderSide::Buy, dec!(0.001), price)
        .with_client_order_id(&client_id);
    println!("  Placing {} {} @ {} (best bid {})", order.side, symbol, price, book.bid_price);

    match client.spot().create_order(&order).await {
        Ok(ack) => println!("{} Placed order {}", "✓".green(), ack["orderId"]),
        Err(e) if e.is_outcome_unknown() => {
            // The exchange may or may not have the order; ask before doing anything else
            println!("{} {}", "?".yellow(), e);
            let lookup = client
                .spot()
                .get_order(&symbol, &OrderRef::client(&client_id), None)
                .await;
            match lookup {
                Ok(found) => println!("  Order exists with status {}", found["status"]),
                Err(RestError::MalformedRequest(_)) => {
                    println!("  Order was not placed");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(e) => return Err(e.into()),
    }

    let status = client
        .spot()
        .get_order(&symbol, &OrderRef::client(&client_id), None)
        .await?;
    let filled: Decimal = status["executedQty"]
        .as_str()
        .and_then(|q| q.parse().ok())
        .unwrap_or_default();
    println!("  Status {} (filled {})", status["status"], filled);

    let cancelled = client
        .spot()
        .cancel_order(&symbol, &OrderRef::client(&client_id), None, None)
        .await?;
    println!("{} Cancelled: {}", "✓".green(), cancelled["status"]);

    Ok(())
}
