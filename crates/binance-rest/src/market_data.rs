//! Typed helpers over the market endpoints
//!
//! One parametrized function per question ("what is the price of X?"),
//! returning plain numbers instead of raw payloads.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument;

use crate::client::BinanceRestClient;
use crate::error::{RestError, RestResult};
use crate::types::{AvgPrice, BookTicker, PriceTicker, Ticker24h};

/// Quote currency used by [`usd_pair`]
pub const USD: &str = "USD";

/// Build the USD trading pair for a coin (`"btc"` → `"BTCUSD"`)
pub fn usd_pair(coin: &str) -> String {
    format!("{}{}", coin.trim().to_uppercase(), USD)
}

/// Typed price and exchange-status queries
pub struct MarketData<'a> {
    client: &'a BinanceRestClient,
}

impl<'a> MarketData<'a> {
    pub fn new(client: &'a BinanceRestClient) -> Self {
        Self { client }
    }

    /// Latest price for `symbol`
    #[instrument(skip(self))]
    pub async fn price_for(&self, symbol: &str) -> RestResult<f64> {
        let ticker: PriceTicker = decode(self.client.market().price(symbol).await?)?;
        parse_price("price", &ticker.price)
    }

    /// Current average price for `symbol`
    #[instrument(skip(self))]
    pub async fn avg_price_for(&self, symbol: &str) -> RestResult<f64> {
        let avg: AvgPrice = decode(self.client.market().avg_price(symbol).await?)?;
        parse_price("price", &avg.price)
    }

    /// Volume weighted average price over the last 24 hours
    #[instrument(skip(self))]
    pub async fn avg_price_24h_for(&self, symbol: &str) -> RestResult<f64> {
        let ticker: Ticker24h = decode(self.client.market().ticker_24h(symbol).await?)?;
        parse_price("weightedAvgPrice", &ticker.weighted_avg_price)
    }

    /// Best bid and ask for `symbol`
    #[instrument(skip(self))]
    pub async fn book_ticker_for(&self, symbol: &str) -> RestResult<BookTicker> {
        decode(self.client.market().book_ticker(symbol).await?)
    }

    /// Exchange clock
    #[instrument(skip(self))]
    pub async fn server_time(&self) -> RestResult<DateTime<Utc>> {
        let time = self.client.market().server_time_raw().await?;
        Utc.timestamp_millis_opt(time.server_time)
            .single()
            .ok_or_else(|| {
                RestError::Decode(format!("server time out of range: {}", time.server_time))
            })
    }

    /// Exchange timezone (e.g. "UTC")
    #[instrument(skip(self))]
    pub async fn timezone(&self) -> RestResult<String> {
        let info = self.status().await?;
        info.get("timezone")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RestError::Decode("exchange info has no timezone".to_string()))
    }

    /// Full exchange info: rate limits, symbols and filters
    #[instrument(skip(self))]
    pub async fn status(&self) -> RestResult<Value> {
        self.client.market().exchange_info(None).await
    }
}

fn decode<T: DeserializeOwned>(payload: Value) -> RestResult<T> {
    serde_json::from_value(payload).map_err(|e| RestError::Decode(e.to_string()))
}

fn parse_price(field: &str, raw: &str) -> RestResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| RestError::Decode(format!("{} is not a number: {:?}", field, raw)))
}
