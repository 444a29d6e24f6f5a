// src/api.rs

//! HTTP gateway to the replay service.
//!
//! One method per endpoint. Each call is signed afresh and returns the raw
//! status + body; callers decide whether a non-success status is fatal.

use crate::auth::{Clock, Credentials, SignedRequest, SystemClock};
use crate::config::Settings;
use crate::model::{ErrorBody, StartRequest};

use anyhow::{anyhow, Context, Result};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!("replaycli/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .with_context(|| format!("Server returned invalid JSON (HTTP {})", self.status))
    }

    /// Server-provided error message.
    ///
    /// Falls back to the raw body, then the canonical reason phrase.
    pub fn message(&self) -> String {
        if let Ok(err) = serde_json::from_str::<ErrorBody>(&self.body) {
            return err.msg;
        }

        let body = self.body.trim();
        if !body.is_empty() {
            return body.to_string();
        }

        self.status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    }
}

/// Signed client for the replay service.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    clock: Box<dyn Clock + Send + Sync>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = base_url.into();
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("Invalid service URL: {:?}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Service URL cannot carry a path: {}", base_url));
        }

        Ok(Self {
            http,
            base_url,
            credentials,
            clock: Box::new(SystemClock),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.url.clone(),
            Credentials::new(settings.apikey.clone(), settings.apisecret.clone()),
        )
    }

    /// Replace the nonce clock.
    #[cfg(test)]
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// `GET /storms`
    pub async fn storms(&self) -> Result<ApiResponse> {
        self.call(Method::GET, &["storms"], None).await
    }

    /// `POST /configure`
    pub async fn configure(&self, request: &StartRequest) -> Result<ApiResponse> {
        let body = serde_json::to_string(request).context("Failed to serialise start request")?;
        self.call(Method::POST, &["configure"], Some(body)).await
    }

    /// `GET /status`
    pub async fn status(&self) -> Result<ApiResponse> {
        self.call(Method::GET, &["status"], None).await
    }

    /// `POST /storm/<name>/nextAdv`
    pub async fn next_adv(&self, name: &str) -> Result<ApiResponse> {
        self.call(Method::POST, &["storm", name, "nextAdv"], None).await
    }

    /// `DELETE /storm/<name>`
    pub async fn delete(&self, name: &str) -> Result<ApiResponse> {
        self.call(Method::DELETE, &["storm", name], None).await
    }

    /// `GET /uuid`
    pub async fn uuid(&self) -> Result<ApiResponse> {
        self.call(Method::GET, &["uuid"], None).await
    }

    /// Base URL extended by `segments`, each percent-encoded as a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Service URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call(&self, method: Method, segments: &[&str], body: Option<String>) -> Result<ApiResponse> {
        let url = self.endpoint(segments)?;
        let signed = SignedRequest::new(&self.credentials, self.clock.as_ref());

        tracing::debug!(%method, %url, nonce = signed.nonce, "sending request");

        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .headers(signed.headers()?);
        if let Some(b) = body {
            req = req.body(b);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("Failed to call {} {}", method, url))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {} {}", method, url))?;

        tracing::debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "response received");

        Ok(ApiResponse { status, body })
    }
}
