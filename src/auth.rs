// src/auth.rs

//! Request signing for the replay service.
//!
//! Every call carries:
//! - `x-auth-nonce`: wall-clock time in units of 10µs (seconds * 100_000)
//! - `Authorization`: base64("<apikey>:" + sha256hex(nonce + apisecret))
//! - `x-replayd-api-version`: protocol version this client speaks
//! - `Content-Type: application/json`
//!
//! The client never validates credentials or nonce freshness; the server
//! rejects stale nonces and bad signatures.

use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use sha2::{Digest, Sha256};

/// Protocol version announced in `x-replayd-api-version`.
pub const API_VERSION: &str = "0.0.1";

pub const NONCE_HEADER: &str = "x-auth-nonce";
pub const API_VERSION_HEADER: &str = "x-replayd-api-version";

/// Nonce ticks per second.
const NONCE_TICKS_PER_SEC: i64 = 100_000;

/// Source of wall-clock time for nonces.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// API key and shared secret.
#[derive(Clone)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Derive the nonce for an instant.
///
/// Instants before the Unix epoch map to 0.
pub fn nonce_at(at: DateTime<Utc>) -> u64 {
    let ticks = at.timestamp() * NONCE_TICKS_PER_SEC
        + i64::from(at.timestamp_subsec_micros() / 10);
    u64::try_from(ticks).unwrap_or_default()
}

/// Signature material for exactly one request.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub nonce: u64,
    pub signature: String,
    pub authorization: String,
}

impl SignedRequest {
    /// Sign with the current time of `clock`.
    pub fn new(creds: &Credentials, clock: &dyn Clock) -> Self {
        Self::with_nonce(creds, nonce_at(clock.now()))
    }

    pub fn with_nonce(creds: &Credentials, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(nonce.to_string().as_bytes());
        hasher.update(creds.secret.as_bytes());
        let signature = hex::encode(hasher.finalize());

        let authorization =
            general_purpose::STANDARD.encode(format!("{}:{}", creds.key, signature));

        Self {
            nonce,
            signature,
            authorization,
        }
    }

    /// Headers to attach to the outgoing request.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(
            HeaderName::from_static(NONCE_HEADER),
            HeaderValue::from(self.nonce),
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.authorization)
                .context("Invalid API key for Authorization header")?,
        );
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }
}
