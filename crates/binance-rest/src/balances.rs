//! Wallet balances as coins
//!
//! Amounts arrive as decimal strings and are kept as integer satoshis
//! (1e-8 units) so they compare and sum exactly.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::client::BinanceRestClient;
use crate::error::{RestError, RestResult};

/// Satoshis per whole unit
pub const SATOSHIS_PER_UNIT: i64 = 100_000_000;

/// One coin held in the wallet
#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    /// Display name (e.g. "Bitcoin")
    pub name: String,
    /// Ticker symbol (e.g. "BTC")
    pub symbol: String,
    /// Free balance in satoshis
    pub amount_satoshi: i64,
    /// Amount being withdrawn, in satoshis
    pub withdrawing: i64,
    /// Whether the coin can be traded
    pub trading: bool,
    /// The coin's full payload
    pub raw: Value,
}

impl Coin {
    /// Build from one element of `/sapi/v1/capital/config/getall`
    pub fn from_json(raw: &Value) -> RestResult<Self> {
        let text = |field: &str| {
            raw.get(field)
                .and_then(Value::as_str)
                .ok_or_else(|| RestError::Decode(format!("coin is missing {}", field)))
        };

        let symbol = text("coin")?.to_string();
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&symbol)
            .to_string();

        Ok(Self {
            amount_satoshi: to_satoshi(parse_amount("free", text("free")?)?)?,
            withdrawing: match raw.get("withdrawing").and_then(Value::as_str) {
                Some(w) => to_satoshi(parse_amount("withdrawing", w)?)?,
                None => 0,
            },
            trading: raw.get("trading").and_then(Value::as_bool).unwrap_or(false),
            raw: raw.clone(),
            name,
            symbol,
        })
    }

    /// Free balance in whole units
    pub fn amount(&self) -> f64 {
        self.amount_satoshi as f64 / SATOSHIS_PER_UNIT as f64
    }

    /// Alias for [`amount`](Self::amount)
    pub fn balance(&self) -> f64 {
        self.amount()
    }

    /// Free balance as an exact decimal
    pub fn amount_decimal(&self) -> Decimal {
        Decimal::new(self.amount_satoshi, 8)
    }
}

fn parse_amount(field: &str, raw: &str) -> RestResult<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| RestError::Decode(format!("{} is not a decimal: {:?}", field, raw)))
}

/// Truncate to whole satoshis
pub fn to_satoshi(amount: Decimal) -> RestResult<i64> {
    amount
        .checked_mul(Decimal::from(SATOSHIS_PER_UNIT))
        .and_then(|scaled| scaled.trunc().to_i64())
        .ok_or_else(|| RestError::Decode(format!("amount out of range: {}", amount)))
}

/// Wallet balance queries
pub struct Balances<'a> {
    client: &'a BinanceRestClient,
}

impl<'a> Balances<'a> {
    pub fn new(client: &'a BinanceRestClient) -> Self {
        Self { client }
    }

    /// Coins with a positive free balance
    ///
    /// Fractional holdings count: 0.5 BTC is a positive balance.
    #[instrument(skip(self))]
    pub async fn coins(&self) -> RestResult<Vec<Coin>> {
        let payload = self.client.wallet().coins(None).await?;
        let coins = coins_from_payload(&payload)?;
        debug!("{} coins with a balance", coins.len());
        Ok(coins)
    }
}

fn coins_from_payload(payload: &Value) -> RestResult<Vec<Coin>> {
    let entries = payload
        .as_array()
        .ok_or_else(|| RestError::Decode("coin list is not an array".to_string()))?;

    let mut coins = Vec::new();
    for entry in entries {
        let coin = Coin::from_json(entry)?;
        if coin.amount_satoshi > 0 {
            coins.push(coin);
        }
    }
    Ok(coins)
}
