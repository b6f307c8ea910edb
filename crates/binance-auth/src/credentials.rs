//! API credentials for Binance.US
//!
//! Private endpoints are authenticated with an API key sent as a header and,
//! for signed endpoints, an HMAC-SHA256 signature keyed by the secret key.
//!
//! # Security
//!
//! The secret key is stored using the `secrecy` crate which:
//! - Zeroizes memory on drop (prevents memory scanning)
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "BINANCE_API_KEY";

/// Environment variable holding the secret key
pub const SECRET_KEY_ENV: &str = "BINANCE_SECRET_KEY";

/// API credentials for authenticated requests
///
/// Either half may be empty: public endpoints need neither, API-key endpoints
/// need only the key. Presence is reported by [`has_api_key`](Self::has_api_key)
/// and [`has_secret_key`](Self::has_secret_key); whether the values are valid is
/// only ever decided by the exchange.
pub struct Credentials {
    /// API key (sent in the clear as a header)
    api_key: String,
    /// Secret key (zeroized on drop)
    secret_key: SecretString,
}

impl Credentials {
    /// Create new credentials from an API key and a secret key
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    /// Credentials with neither key set, usable for public endpoints only
    pub fn anonymous() -> Self {
        Self::new(String::new(), String::new())
    }

    /// Create credentials from environment variables
    ///
    /// Reads `BINANCE_API_KEY` and `BINANCE_SECRET_KEY` from the environment.
    pub fn from_env() -> AuthResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(API_KEY_ENV.to_string()))?;
        let secret_key = std::env::var(SECRET_KEY_ENV)
            .map_err(|_| AuthError::EnvVarNotSet(SECRET_KEY_ENV.to_string()))?;

        Ok(Self::new(api_key, secret_key))
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Whether a non-empty API key is configured
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Whether a non-empty secret key is configured
    pub fn has_secret_key(&self) -> bool {
        !self.secret_key.expose_secret().trim().is_empty()
    }

    /// Sign a payload with HMAC-SHA256 and return the lowercase hex digest
    ///
    /// The payload is the exact byte sequence the exchange will verify:
    /// the transmitted query string followed by the request body.
    pub fn sign(&self, payload: &[u8]) -> String {
        // expose_secret() provides controlled access to the key
        let mut mac = HmacSha256::new_from_slice(self.secret_key.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl Clone for Credentials {
    /// Clone credentials (creates a new SecretString with the same content)
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            secret_key: SecretString::from(self.secret_key.expose_secret().to_owned()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.api_key.chars().take(8).collect();
        f.debug_struct("Credentials")
            .field("api_key", &format!("{}...", prefix))
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Published HMAC-SHA256 vectors from Binance's signature examples
    const EXAMPLE_SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

    #[test]
    fn test_presence_checks() {
        let creds = Credentials::new("key", "secret");
        assert!(creds.has_api_key());
        assert!(creds.has_secret_key());

        let key_only = Credentials::new("key", "");
        assert!(key_only.has_api_key());
        assert!(!key_only.has_secret_key());

        let anonymous = Credentials::anonymous();
        assert!(!anonymous.has_api_key());
        assert!(!anonymous.has_secret_key());
    }

    #[test]
    fn test_whitespace_counts_as_absent() {
        let creds = Credentials::new("   ", "\t");
        assert!(!creds.has_api_key());
        assert!(!creds.has_secret_key());
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("test_api_key_123456", "super_secret_value");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super_secret_value"));
        assert!(!debug.contains("test_api_key_123456"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("test_api"));
    }

    #[test]
    fn test_sign_matches_published_vector_simple() {
        let creds = Credentials::new("test_key", EXAMPLE_SECRET);
        let signature = creds.sign(b"timestamp=1578963600000");
        assert_eq!(
            signature,
            "d84e6641b1e328e7b418fff030caed655c266299c9355e36ce801ed14631eed4"
        );
    }

    #[test]
    fn test_sign_matches_published_vector_order() {
        let creds = Credentials::new("test_key", EXAMPLE_SECRET);
        let payload = "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559";
        assert_eq!(
            creds.sign(payload.as_bytes()),
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_signature_is_lowercase_hex() {
        let creds = Credentials::new("k", "s");
        let signature = creds.sign(b"symbol=BTCUSD");
        assert_eq!(signature.len(), 64);
        assert!(signature
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_clone_keeps_secret() {
        let creds = Credentials::new("k", "s");
        let cloned = creds.clone();
        assert_eq!(creds.sign(b"x"), cloned.sign(b"x"));
        assert_eq!(cloned.api_key(), "k");
    }
}
