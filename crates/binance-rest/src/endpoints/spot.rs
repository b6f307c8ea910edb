//! Spot account and order endpoints
//!
//! All of these are signed. Placement goes out as a form body; queries and
//! cancellations carry their params in the query string.

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::client::BinanceRestClient;
use crate::error::RestResult;
use crate::request::{ApiRequest, HttpMethod, Params};
use crate::types::{NewOrder, OrderRef};

const ORDER: &str = "/api/v3/order";
const OPEN_ORDERS: &str = "/api/v3/openOrders";
const ALL_ORDERS: &str = "/api/v3/allOrders";
const ACCOUNT: &str = "/api/v3/account";
const MY_TRADES: &str = "/api/v3/myTrades";

/// Signed spot trading endpoints
pub struct SpotEndpoints<'a> {
    client: &'a BinanceRestClient,
}

impl<'a> SpotEndpoints<'a> {
    pub fn new(client: &'a BinanceRestClient) -> Self {
        Self { client }
    }

    /// Place a new order
    ///
    /// The order is validated locally first; a malformed order never leaves
    /// the process. On [`RestError::ResponseReadTimeout`](crate::RestError::ResponseReadTimeout)
    /// the order may or may not exist: query it before resubmitting.
    #[instrument(skip(self, order), fields(symbol = %order.symbol, side = %order.side, order_type = %order.order_type))]
    pub async fn create_order(&self, order: &NewOrder) -> RestResult<Value> {
        let params = order.to_params()?;
        info!("Placing order");
        self.client
            .execute(ApiRequest::signed(HttpMethod::Post, ORDER).with_params(params))
            .await
    }

    /// Cancel an active order
    ///
    /// # Arguments
    /// * `symbol` - Trading pair
    /// * `order` - Exchange order id or original client order id
    /// * `new_client_order_id` - Id to tag the cancellation with
    #[instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        symbol: &str,
        order: &OrderRef,
        new_client_order_id: Option<&str>,
        recv_window: Option<u64>,
    ) -> RestResult<Value> {
        let mut params = Params::new().with("symbol", symbol);
        order.push_to(&mut params);
        params
            .push_opt("newClientOrderId", new_client_order_id)
            .push_opt("recvWindow", recv_window);

        info!("Cancelling order {}", order);
        self.client
            .execute(ApiRequest::signed(HttpMethod::Delete, ORDER).with_params(params))
            .await
    }

    /// Cancel every open order on a symbol
    #[instrument(skip(self))]
    pub async fn cancel_all_orders(
        &self,
        symbol: &str,
        recv_window: Option<u64>,
    ) -> RestResult<Value> {
        let params = Params::new()
            .with("symbol", symbol)
            .with_opt("recvWindow", recv_window);
        info!("Cancelling all orders on {}", symbol);
        self.client
            .execute(ApiRequest::signed(HttpMethod::Delete, OPEN_ORDERS).with_params(params))
            .await
    }

    /// Query one order's status
    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        symbol: &str,
        order: &OrderRef,
        recv_window: Option<u64>,
    ) -> RestResult<Value> {
        let mut params = Params::new().with("symbol", symbol);
        order.push_to(&mut params);
        params.push_opt("recvWindow", recv_window);
        self.client
            .execute(ApiRequest::signed(HttpMethod::Get, ORDER).with_params(params))
            .await
    }

    /// Open orders, on one symbol or all of them
    #[instrument(skip(self))]
    pub async fn open_orders(
        &self,
        symbol: Option<&str>,
        recv_window: Option<u64>,
    ) -> RestResult<Value> {
        debug!("Fetching open orders");
        let params = Params::new()
            .with_opt("symbol", symbol)
            .with_opt("recvWindow", recv_window);
        self.client
            .execute(ApiRequest::signed(HttpMethod::Get, OPEN_ORDERS).with_params(params))
            .await
    }

    /// All orders on a symbol: active, cancelled or filled
    ///
    /// # Arguments
    /// * `order_id` - Return orders from this id onwards
    /// * `start_time` / `end_time` - Window in milliseconds since the epoch
    /// * `limit` - Default 500, max 1000
    #[instrument(skip(self))]
    pub async fn all_orders(
        &self,
        symbol: &str,
        order_id: Option<u64>,
        start_time: Option<u64>,
        end_time: Option<u64>,
        limit: Option<u16>,
        recv_window: Option<u64>,
    ) -> RestResult<Value> {
        let params = Params::new()
            .with("symbol", symbol)
            .with_opt("orderId", order_id)
            .with_opt("startTime", start_time)
            .with_opt("endTime", end_time)
            .with_opt("limit", limit)
            .with_opt("recvWindow", recv_window);
        self.client
            .execute(ApiRequest::signed(HttpMethod::Get, ALL_ORDERS).with_params(params))
            .await
    }

    /// Account information, including balances
    #[instrument(skip(self))]
    pub async fn account_information(&self, recv_window: Option<u64>) -> RestResult<Value> {
        debug!("Fetching account information");
        let params = Params::new().with_opt("recvWindow", recv_window);
        self.client
            .execute(ApiRequest::signed(HttpMethod::Get, ACCOUNT).with_params(params))
            .await
    }

    /// Trades for a symbol on this account
    #[instrument(skip(self))]
    pub async fn trades_list(
        &self,
        symbol: &str,
        start_time: Option<u64>,
        end_time: Option<u64>,
        from_id: Option<u64>,
        limit: Option<u16>,
        recv_window: Option<u64>,
    ) -> RestResult<Value> {
        let params = Params::new()
            .with("symbol", symbol)
            .with_opt("startTime", start_time)
            .with_opt("endTime", end_time)
            .with_opt("fromId", from_id)
            .with_opt("limit", limit)
            .with_opt("recvWindow", recv_window);
        self.client
            .execute(ApiRequest::signed(HttpMethod::Get, MY_TRADES).with_params(params))
            .await
    }
}
