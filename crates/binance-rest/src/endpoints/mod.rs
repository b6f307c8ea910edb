//! API endpoint implementations
//!
//! Each group borrows the client and turns typed arguments into an
//! [`ApiRequest`](crate::ApiRequest) with the endpoint's fixed trust tier.

pub mod market;
pub mod spot;
pub mod wallet;

pub use market::MarketEndpoints;
pub use spot::SpotEndpoints;
pub use wallet::WalletEndpoints;
