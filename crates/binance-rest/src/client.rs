//! Main REST client implementation

use std::sync::Arc;

use binance_auth::Credentials;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::instrument::WithSubscriber;
use tracing::{debug, instrument};

use crate::balances::Balances;
use crate::config::ClientConfig;
use crate::connection::{Connection, ConnectionProvider};
use crate::endpoints::{MarketEndpoints, SpotEndpoints, WalletEndpoints};
use crate::error::{RestError, RestResult};
use crate::market_data::MarketData;
use crate::request::{ApiRequest, TrustTier};
use crate::response::classify;

/// Binance.US REST API client
///
/// Cheap to clone; clones share one connection cache.
///
/// # Example
///
/// ```no_run
/// use binance_rest::{BinanceRestClient, ClientConfig, Credentials};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Public endpoints only
///     let client = BinanceRestClient::new();
///     let price = client.market_data().price_for("BTCUSD").await?;
///
///     // With authentication for signed endpoints
///     let client = BinanceRestClient::with_config(
///         ClientConfig::new().with_credentials(Credentials::from_env()?),
///     );
///     let orders = client.spot().open_orders(None, None).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BinanceRestClient {
    provider: Arc<ConnectionProvider>,
}

impl BinanceRestClient {
    /// Create a new client without authentication
    ///
    /// Only public endpoints will be available.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with credentials
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self::with_config(ClientConfig::new().with_credentials(credentials))
    }

    /// Create a new client with custom configuration
    ///
    /// Nothing is connected until the first request on each tier.
    pub fn with_config(config: ClientConfig) -> Self {
        debug!("Created Binance REST client");
        Self {
            provider: Arc::new(ConnectionProvider::new(config)),
        }
    }

    /// Create a client configured from environment variables
    pub fn from_env() -> RestResult<Self> {
        Ok(Self::with_config(ClientConfig::from_env()?))
    }

    pub fn config(&self) -> &ClientConfig {
        self.provider.config()
    }

    /// Check if the client can reach signed endpoints
    pub fn has_credentials(&self) -> bool {
        let credentials = &self.config().credentials;
        credentials.has_api_key() && credentials.has_secret_key()
    }

    /// Base URL in use
    pub fn base_url(&self) -> Arc<str> {
        self.provider.base_url()
    }

    /// Get the cached connection for a tier, building it on first use
    pub fn connection_for(&self, tier: TrustTier) -> RestResult<Arc<Connection>> {
        self.provider.connection_for(tier)
    }

    /// Drop every cached connection; the next request rebuilds them
    pub fn reload(&self) {
        self.provider.reload();
    }

    /// Rebuild one tier's connection
    pub fn reload_tier(&self, tier: TrustTier) -> RestResult<Arc<Connection>> {
        self.provider.reload_tier(tier)
    }

    /// Execute a request and return the JSON payload
    ///
    /// Sends exactly once. Every failure, local or remote, comes back as a
    /// single [`RestError`].
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path(), tier = %request.tier()))]
    pub async fn execute(&self, request: ApiRequest) -> RestResult<Value> {
        request.validate()?;
        let connection = self.connection_for(request.tier())?;

        let exchange = connection.send(&request);
        let response = match &self.config().dispatch {
            Some(dispatch) => exchange.with_subscriber(dispatch.clone()).await?,
            None => exchange.await?,
        };

        classify(&request, response)
    }

    /// Execute a request and decode the payload into `T`
    pub async fn execute_as<T: DeserializeOwned>(&self, request: ApiRequest) -> RestResult<T> {
        let label = request.to_string();
        let payload = self.execute(request).await?;
        serde_json::from_value(payload)
            .map_err(|e| RestError::Decode(format!("{}: {}", label, e)))
    }

    // ========================================================================
    // Endpoint groups
    // ========================================================================

    /// Market data endpoints
    pub fn market(&self) -> MarketEndpoints<'_> {
        MarketEndpoints::new(self)
    }

    /// Wallet endpoints (signed)
    pub fn wallet(&self) -> WalletEndpoints<'_> {
        WalletEndpoints::new(self)
    }

    /// Spot account and order endpoints (signed)
    pub fn spot(&self) -> SpotEndpoints<'_> {
        SpotEndpoints::new(self)
    }

    /// Typed price and exchange-status helpers
    pub fn market_data(&self) -> MarketData<'_> {
        MarketData::new(self)
    }

    /// Wallet balances as [`Coin`](crate::Coin)s
    pub fn balances(&self) -> Balances<'_> {
        Balances::new(self)
    }
}

impl Default for BinanceRestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BinanceRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceRestClient")
            .field("has_credentials", &self.has_credentials())
            .field("provider", &self.provider)
            .finish()
    }
}
