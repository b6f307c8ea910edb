//! Wallet endpoints
//!
//! All of these are signed.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::BinanceRestClient;
use crate::error::RestResult;
use crate::request::{ApiRequest, HttpMethod, Params};
use crate::types::SnapshotType;

const ALL_COINS: &str = "/sapi/v1/capital/config/getall";
const ACCOUNT_SNAPSHOT: &str = "/api/v1/accountSnapshot";
const ACCOUNT_STATUS: &str = "/api/v1/account";

/// Signed wallet endpoints
pub struct WalletEndpoints<'a> {
    client: &'a BinanceRestClient,
}

impl<'a> WalletEndpoints<'a> {
    pub fn new(client: &'a BinanceRestClient) -> Self {
        Self { client }
    }

    /// Every coin the account knows about, with balances and network info
    #[instrument(skip(self))]
    pub async fn coins(&self, recv_window: Option<u64>) -> RestResult<Value> {
        debug!("Fetching coin information");
        let params = Params::new().with_opt("recvWindow", recv_window);
        self.client
            .execute(ApiRequest::signed(HttpMethod::Get, ALL_COINS).with_params(params))
            .await
    }

    /// Daily account snapshots
    ///
    /// # Arguments
    /// * `snapshot_type` - Account kind to snapshot
    /// * `start_time` / `end_time` - Window in milliseconds since the epoch
    #[instrument(skip(self))]
    pub async fn snapshot(
        &self,
        snapshot_type: SnapshotType,
        start_time: Option<u64>,
        end_time: Option<u64>,
        recv_window: Option<u64>,
    ) -> RestResult<Value> {
        let params = Params::new()
            .with("type", snapshot_type)
            .with_opt("startTime", start_time)
            .with_opt("endTime", end_time)
            .with_opt("recvWindow", recv_window);
        self.client
            .execute(ApiRequest::signed(HttpMethod::Get, ACCOUNT_SNAPSHOT).with_params(params))
            .await
    }

    /// Account status
    #[instrument(skip(self))]
    pub async fn account_status(&self, recv_window: Option<u64>) -> RestResult<Value> {
        let params = Params::new().with_opt("recvWindow", recv_window);
        self.client
            .execute(ApiRequest::signed(HttpMethod::Get, ACCOUNT_STATUS).with_params(params))
            .await
    }
}
