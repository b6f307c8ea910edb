//! Types for Binance.US REST API requests and responses

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RestError, RestResult};
use crate::request::Params;

// ============================================================================
// Market Data Types
// ============================================================================

/// Latest price for a symbol (`/api/v3/ticker/price`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceTicker {
    pub symbol: String,
    /// Price as sent by the exchange (decimal string)
    pub price: String,
}

/// Current average price (`/api/v3/avgPrice`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AvgPrice {
    /// Averaging window in minutes
    pub mins: u32,
    pub price: String,
}

/// Best bid/ask on the book (`/api/v3/ticker/bookTicker`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTicker {
    pub symbol: String,
    pub bid_price: Decimal,
    pub bid_qty: Decimal,
    pub ask_price: Decimal,
    pub ask_qty: Decimal,
}

impl BookTicker {
    /// Get the mid price (average of bid and ask)
    pub fn mid_price(&self) -> Decimal {
        (self.bid_price + self.ask_price) / Decimal::TWO
    }

    /// Get the spread
    pub fn spread(&self) -> Decimal {
        self.ask_price - self.bid_price
    }
}

/// 24 hour rolling window statistics (`/api/v3/ticker/24hr`)
///
/// Only the fields the client reads; the full payload is available from
/// [`MarketEndpoints::ticker_24h`](crate::endpoints::MarketEndpoints::ticker_24h).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24h {
    pub symbol: String,
    pub price_change: String,
    pub price_change_percent: String,
    /// Volume weighted average price over the window
    pub weighted_avg_price: String,
    pub last_price: String,
    pub volume: String,
    #[serde(default)]
    pub count: u64,
}

/// Server time (`/api/v3/time`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerTime {
    /// Milliseconds since the Unix epoch
    pub server_time: i64,
}

/// Candlestick interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KlineInterval {
    OneMinute,
    ThreeMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FourHours,
    SixHours,
    EightHours,
    TwelveHours,
    OneDay,
    ThreeDays,
    OneWeek,
    OneMonth,
}

impl KlineInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::ThreeMinutes => "3m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::TwoHours => "2h",
            Self::FourHours => "4h",
            Self::SixHours => "6h",
            Self::EightHours => "8h",
            Self::TwelveHours => "12h",
            Self::OneDay => "1d",
            Self::ThreeDays => "3d",
            Self::OneWeek => "1w",
            Self::OneMonth => "1M",
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Wallet Types
// ============================================================================

/// Account snapshot kind (`/api/v1/accountSnapshot`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SnapshotType {
    Spot,
    Margin,
    Futures,
}

impl fmt::Display for SnapshotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spot => write!(f, "SPOT"),
            Self::Margin => write!(f, "MARGIN"),
            Self::Futures => write!(f, "FUTURES"),
        }
    }
}

// ============================================================================
// Trading Types
// ============================================================================

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    /// Buy order
    Buy,
    /// Sell order
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    StopLoss,
    StopLossLimit,
    TakeProfit,
    TakeProfitLimit,
    /// Limit order rejected if it would immediately match
    LimitMaker,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Limit => "LIMIT",
            Self::Market => "MARKET",
            Self::StopLoss => "STOP_LOSS",
            Self::StopLossLimit => "STOP_LOSS_LIMIT",
            Self::TakeProfit => "TAKE_PROFIT",
            Self::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
            Self::LimitMaker => "LIMIT_MAKER",
        }
    }

    fn needs_time_in_force(&self) -> bool {
        matches!(
            self,
            Self::Limit | Self::StopLossLimit | Self::TakeProfitLimit
        )
    }

    fn needs_price(&self) -> bool {
        matches!(
            self,
            Self::Limit | Self::StopLossLimit | Self::TakeProfitLimit | Self::LimitMaker
        )
    }

    fn needs_stop_price(&self) -> bool {
        matches!(
            self,
            Self::StopLoss | Self::StopLossLimit | Self::TakeProfit | Self::TakeProfitLimit
        )
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time in force for orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till cancelled
    #[serde(rename = "GTC")]
    GoodTillCancelled,
    /// Immediate or cancel
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
    /// Fill or kill
    #[serde(rename = "FOK")]
    FillOrKill,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoodTillCancelled => write!(f, "GTC"),
            Self::ImmediateOrCancel => write!(f, "IOC"),
            Self::FillOrKill => write!(f, "FOK"),
        }
    }
}

/// How much detail the order placement response carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderResponseType {
    Ack,
    Result,
    Full,
}

impl fmt::Display for OrderResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack => write!(f, "ACK"),
            Self::Result => write!(f, "RESULT"),
            Self::Full => write!(f, "FULL"),
        }
    }
}

/// Identifies an existing order: by exchange id or by client order id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRef {
    OrderId(u64),
    ClientOrderId(String),
}

impl OrderRef {
    pub fn client(id: impl Into<String>) -> Self {
        Self::ClientOrderId(id.into())
    }

    pub(crate) fn push_to(&self, params: &mut Params) {
        match self {
            Self::OrderId(id) => params.push("orderId", id),
            Self::ClientOrderId(id) => params.push("origClientOrderId", id),
        };
    }
}

impl From<u64> for OrderRef {
    fn from(id: u64) -> Self {
        Self::OrderId(id)
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrderId(id) => write!(f, "orderId={}", id),
            Self::ClientOrderId(id) => write!(f, "origClientOrderId={}", id),
        }
    }
}

/// Request to place an order (`POST /api/v3/order`)
///
/// Mandatory parameters depend on the order type:
///
/// | type              | required                                         |
/// |-------------------|--------------------------------------------------|
/// | LIMIT             | timeInForce, quantity, price                     |
/// | MARKET            | quantity or quoteOrderQty                        |
/// | STOP_LOSS         | quantity, stopPrice                              |
/// | STOP_LOSS_LIMIT   | timeInForce, quantity, price, stopPrice          |
/// | TAKE_PROFIT       | quantity, stopPrice                              |
/// | TAKE_PROFIT_LIMIT | timeInForce, quantity, price, stopPrice          |
/// | LIMIT_MAKER       | quantity, price                                  |
///
/// [`validate`](Self::validate) checks these before anything is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub time_in_force: Option<TimeInForce>,
    pub quantity: Option<Decimal>,
    /// Quote asset amount to spend or receive (MARKET only)
    pub quote_order_qty: Option<Decimal>,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub iceberg_qty: Option<Decimal>,
    pub new_client_order_id: Option<String>,
    pub response_type: Option<OrderResponseType>,
    pub recv_window: Option<u64>,
}

impl NewOrder {
    /// Create an order with only the required identity fields set
    pub fn new(symbol: impl Into<String>, side: OrderSide, order_type: OrderType) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type,
            time_in_force: None,
            quantity: None,
            quote_order_qty: None,
            price: None,
            stop_price: None,
            iceberg_qty: None,
            new_client_order_id: None,
            response_type: None,
            recv_window: None,
        }
    }

    /// Create a market order for a base asset quantity
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: Decimal) -> Self {
        Self::new(symbol, side, OrderType::Market).with_quantity(quantity)
    }

    /// Create a market order for a quote asset amount
    pub fn market_quote(symbol: impl Into<String>, side: OrderSide, quote_qty: Decimal) -> Self {
        let mut order = Self::new(symbol, side, OrderType::Market);
        order.quote_order_qty = Some(quote_qty);
        order
    }

    /// Create a good-till-cancelled limit order
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self::new(symbol, side, OrderType::Limit)
            .with_quantity(quantity)
            .with_price(price)
            .with_time_in_force(TimeInForce::GoodTillCancelled)
    }

    /// Create a limit-maker (post only) order
    pub fn limit_maker(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self::new(symbol, side, OrderType::LimitMaker)
            .with_quantity(quantity)
            .with_price(price)
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_stop_price(mut self, stop_price: Decimal) -> Self {
        self.stop_price = Some(stop_price);
        self
    }

    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    pub fn with_iceberg_qty(mut self, qty: Decimal) -> Self {
        self.iceberg_qty = Some(qty);
        self
    }

    /// Set a client order id (must be unique among open orders)
    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.new_client_order_id = Some(id.into());
        self
    }

    pub fn with_response_type(mut self, response_type: OrderResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    pub fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window = Some(recv_window_ms);
        self
    }

    /// Check the type-specific mandatory parameters
    pub fn validate(&self) -> RestResult<()> {
        let missing = |field: &str| -> RestResult<()> {
            Err(RestError::InvalidRequest(format!(
                "{} order requires {}",
                self.order_type, field
            )))
        };

        if self.symbol.trim().is_empty() {
            return Err(RestError::InvalidRequest("order symbol is empty".to_string()));
        }

        if self.order_type == OrderType::Market {
            if self.quantity.is_none() && self.quote_order_qty.is_none() {
                return missing("quantity or quoteOrderQty");
            }
        } else {
            if self.quantity.is_none() {
                return missing("quantity");
            }
            if self.quote_order_qty.is_some() {
                return Err(RestError::InvalidRequest(format!(
                    "quoteOrderQty is only valid for MARKET orders, not {}",
                    self.order_type
                )));
            }
        }
        if self.order_type.needs_time_in_force() && self.time_in_force.is_none() {
            return missing("timeInForce");
        }
        if self.order_type.needs_price() && self.price.is_none() {
            return missing("price");
        }
        if self.order_type.needs_stop_price() && self.stop_price.is_none() {
            return missing("stopPrice");
        }
        Ok(())
    }

    /// Validate and convert into wire params
    pub fn to_params(&self) -> RestResult<Params> {
        self.validate()?;

        Ok(Params::new()
            .with("symbol", &self.symbol)
            .with("side", self.side)
            .with("type", self.order_type)
            .with_opt("timeInForce", self.time_in_force)
            .with_opt("quantity", self.quantity)
            .with_opt("quoteOrderQty", self.quote_order_qty)
            .with_opt("price", self.price)
            .with_opt("stopPrice", self.stop_price)
            .with_opt("icebergQty", self.iceberg_qty)
            .with_opt("newClientOrderId", self.new_client_order_id.as_deref())
            .with_opt("newOrderRespType", self.response_type)
            .with_opt("recvWindow", self.recv_window))
    }
}
