//! Credentials and request signing for the Binance.US REST API
//!
//! This crate holds the API key / secret key pair and signs outbound requests
//! for `SIGNED` endpoints with HMAC-SHA256.
//!
//! # Example
//!
//! ```no_run
//! use binance_auth::{Credentials, RequestSigner};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load credentials from environment
//!     let creds = Credentials::from_env()?;
//!
//!     // Sign a request right before it is sent
//!     let signer = RequestSigner::new(creds)?;
//!     let url = reqwest::Url::parse("https://api.binance.us/api/v3/account")?;
//!     let mut request = reqwest::Request::new(reqwest::Method::GET, url);
//!     signer.sign(&mut request)?;
//!
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod signer;

pub use credentials::{Credentials, API_KEY_ENV, SECRET_KEY_ENV};
pub use error::{AuthError, AuthResult};
pub use signer::{
    signing_payload, timestamp_ms, RequestSigner, API_KEY_HEADER, SIGNATURE_PARAM,
    TIMESTAMP_PARAM,
};
