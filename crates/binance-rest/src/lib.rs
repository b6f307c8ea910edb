//! REST API client for the Binance.US cryptocurrency exchange
//!
//! This crate provides a REST client for market data, wallet queries and
//! spot trading on Binance.US.
//!
//! # Features
//!
//! - **Market Data**: Prices, order book, trades, klines, 24h statistics
//! - **Wallet**: Coin balances, account snapshots, account status
//! - **Spot**: Place, query and cancel orders; account information and trades
//!
//! # Authentication
//!
//! Every endpoint has a fixed [`TrustTier`]. Public endpoints send no
//! credentials, key-only endpoints send the `X-MBX-APIKEY` header, and signed
//! endpoints also append `timestamp` and an HMAC-SHA256 `signature`.
//!
//! # Example
//!
//! ```no_run
//! use binance_rest::{BinanceRestClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Public endpoints (no auth required)
//!     let client = BinanceRestClient::new();
//!     let price = client.market_data().price_for("BTCUSD").await?;
//!     println!("BTC/USD: {}", price);
//!
//!     // Signed endpoints (BINANCE_API_KEY / BINANCE_SECRET_KEY)
//!     let client = BinanceRestClient::with_config(ClientConfig::from_env()?);
//!     for coin in client.balances().coins().await? {
//!         println!("{}: {}", coin.symbol, coin.amount());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Nothing is retried inside the client. Each failure maps to one
//! [`RestError`] variant by HTTP status; see
//! [`RestError::recovery_strategy`] for advice on what to do next.
//! A [`RestError::ResponseReadTimeout`] (HTTP 504) means the request's
//! outcome is unknown: check before resubmitting an order.

pub mod balances;
pub mod client;
pub mod config;
pub mod connection;
pub mod endpoints;
pub mod error;
pub mod market_data;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types
pub use balances::{Balances, Coin};
pub use client::BinanceRestClient;
pub use config::ClientConfig;
pub use connection::{Connection, ConnectionProvider};
pub use error::{ApiFailure, RecoveryStrategy, RestError, RestResult};
pub use market_data::{usd_pair, MarketData};
pub use request::{ApiRequest, HttpMethod, Params, TrustTier};
pub use response::{classify, Response};

pub use binance_auth::{AuthError, Credentials};

// Re-export endpoint-specific types
pub use types::{
    // Market data
    AvgPrice, BookTicker, KlineInterval, PriceTicker, ServerTime, Ticker24h,
    // Wallet
    SnapshotType,
    // Trading
    NewOrder, OrderRef, OrderResponseType, OrderSide, OrderType, TimeInForce,
};
