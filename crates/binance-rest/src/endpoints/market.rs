//! Market data endpoints
//!
//! Everything here is public except `historical_trades`, which needs the
//! API key header.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::BinanceRestClient;
use crate::error::RestResult;
use crate::request::{ApiRequest, HttpMethod, Params};
use crate::types::{KlineInterval, ServerTime};

const PING: &str = "/api/v3/ping";
const TIME: &str = "/api/v3/time";
const EXCHANGE_INFO: &str = "/api/v3/exchangeInfo";
const DEPTH: &str = "/api/v3/depth";
const TRADES: &str = "/api/v3/trades";
const HISTORICAL_TRADES: &str = "/api/v3/historicalTrades";
const AGG_TRADES: &str = "/api/v3/aggTrades";
const KLINES: &str = "/api/v3/klines";
const TICKER_PRICE: &str = "/api/v3/ticker/price";
const BOOK_TICKER: &str = "/api/v3/ticker/bookTicker";
const AVG_PRICE: &str = "/api/v3/avgPrice";
const TICKER_24H: &str = "/api/v3/ticker/24hr";

/// Market data endpoints
pub struct MarketEndpoints<'a> {
    client: &'a BinanceRestClient,
}

impl<'a> MarketEndpoints<'a> {
    pub fn new(client: &'a BinanceRestClient) -> Self {
        Self { client }
    }

    /// Test connectivity; the payload is an empty object
    #[instrument(skip(self))]
    pub async fn ping(&self) -> RestResult<Value> {
        self.client
            .execute(ApiRequest::public(HttpMethod::Get, PING))
            .await
    }

    /// Get server time
    #[instrument(skip(self))]
    pub async fn server_time_raw(&self) -> RestResult<ServerTime> {
        debug!("Fetching server time");
        self.client
            .execute_as(ApiRequest::public(HttpMethod::Get, TIME))
            .await
    }

    /// Exchange trading rules and symbol information
    ///
    /// # Arguments
    /// * `symbol` - Restrict to one symbol (e.g., "BTCUSD"); all symbols when `None`
    #[instrument(skip(self))]
    pub async fn exchange_info(&self, symbol: Option<&str>) -> RestResult<Value> {
        debug!("Fetching exchange info");
        let params = Params::new().with_opt("symbol", symbol);
        self.client
            .execute(ApiRequest::public(HttpMethod::Get, EXCHANGE_INFO).with_params(params))
            .await
    }

    /// Order book depth
    ///
    /// # Arguments
    /// * `symbol` - Trading pair (e.g., "BTCUSD")
    /// * `limit` - Number of levels (default 100, max 5000)
    #[instrument(skip(self))]
    pub async fn depth(&self, symbol: &str, limit: Option<u16>) -> RestResult<Value> {
        debug!("Fetching order book for {}", symbol);
        let params = Params::new().with("symbol", symbol).with_opt("limit", limit);
        self.client
            .execute(ApiRequest::public(HttpMethod::Get, DEPTH).with_params(params))
            .await
    }

    /// Recent trades
    #[instrument(skip(self))]
    pub async fn trades(&self, symbol: &str, limit: Option<u16>) -> RestResult<Value> {
        let params = Params::new().with("symbol", symbol).with_opt("limit", limit);
        self.client
            .execute(ApiRequest::public(HttpMethod::Get, TRADES).with_params(params))
            .await
    }

    /// Older trades, paged by trade id (requires the API key)
    #[instrument(skip(self))]
    pub async fn historical_trades(
        &self,
        symbol: &str,
        from_id: Option<u64>,
        limit: Option<u16>,
    ) -> RestResult<Value> {
        let params = Params::new()
            .with("symbol", symbol)
            .with_opt("fromId", from_id)
            .with_opt("limit", limit);
        self.client
            .execute(ApiRequest::secure(HttpMethod::Get, HISTORICAL_TRADES).with_params(params))
            .await
    }

    /// Compressed, aggregate trades
    ///
    /// Times are milliseconds since the epoch.
    #[instrument(skip(self))]
    pub async fn agg_trades(
        &self,
        symbol: &str,
        from_id: Option<u64>,
        start_time: Option<u64>,
        end_time: Option<u64>,
        limit: Option<u16>,
    ) -> RestResult<Value> {
        let params = Params::new()
            .with("symbol", symbol)
            .with_opt("fromId", from_id)
            .with_opt("startTime", start_time)
            .with_opt("endTime", end_time)
            .with_opt("limit", limit);
        self.client
            .execute(ApiRequest::public(HttpMethod::Get, AGG_TRADES).with_params(params))
            .await
    }

    /// Candlestick bars
    #[instrument(skip(self))]
    pub async fn klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        start_time: Option<u64>,
        end_time: Option<u64>,
        limit: Option<u16>,
    ) -> RestResult<Value> {
        debug!("Fetching {} klines for {}", interval, symbol);
        let params = Params::new()
            .with("symbol", symbol)
            .with("interval", interval)
            .with_opt("startTime", start_time)
            .with_opt("endTime", end_time)
            .with_opt("limit", limit);
        self.client
            .execute(ApiRequest::public(HttpMethod::Get, KLINES).with_params(params))
            .await
    }

    /// Latest price for a symbol
    #[instrument(skip(self))]
    pub async fn price(&self, symbol: &str) -> RestResult<Value> {
        let params = Params::new().with("symbol", symbol);
        self.client
            .execute(ApiRequest::public(HttpMethod::Get, TICKER_PRICE).with_params(params))
            .await
    }

    /// Best price and quantity on the book
    #[instrument(skip(self))]
    pub async fn book_ticker(&self, symbol: &str) -> RestResult<Value> {
        let params = Params::new().with("symbol", symbol);
        self.client
            .execute(ApiRequest::public(HttpMethod::Get, BOOK_TICKER).with_params(params))
            .await
    }

    /// Current average price
    #[instrument(skip(self))]
    pub async fn avg_price(&self, symbol: &str) -> RestResult<Value> {
        let params = Params::new().with("symbol", symbol);
        self.client
            .execute(ApiRequest::public(HttpMethod::Get, AVG_PRICE).with_params(params))
            .await
    }

    /// 24 hour rolling window price change statistics
    #[instrument(skip(self))]
    pub async fn ticker_24h(&self, symbol: &str) -> RestResult<Value> {
        let params = Params::new().with("symbol", symbol);
        self.client
            .execute(ApiRequest::public(HttpMethod::Get, TICKER_24H).with_params(params))
            .await
    }
}
