use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::{Result, TransportError};

/// Header carrying the upstream API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Status and body of an upstream reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    /// HTTP status code
    pub status: u16,
    /// Body as text
    pub body: String,
}

impl UpstreamReply {
    /// Create a reply
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one JSON POST to the poll-hosting service.
///
/// Any HTTP status is a reply; only failures to get a reply at all are
/// `TransportError`s.
#[async_trait]
pub trait Upstream: Send + Sync + std::fmt::Debug {
    /// POST `payload` to `url` with the API key header
    async fn post(
        &self,
        url: &Url,
        api_key: &str,
        payload: &Value,
    ) -> std::result::Result<UpstreamReply, TransportError>;
}

/// `Upstream` backed by a shared `reqwest` client.
///
/// Once a status line has arrived the call always yields a reply: a body that
/// cannot be read in time becomes a placeholder text, so a 2xx is never
/// reported as a transport failure.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
    timeout: Duration,
}

impl HttpUpstream {
    /// Build a client that bounds connecting, waiting for the status and
    /// reading the body by `timeout` each
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn post(
        &self,
        url: &Url,
        api_key: &str,
        payload: &Value,
    ) -> std::result::Result<UpstreamReply, TransportError> {
        let request = self
            .client
            .post(url.clone())
            .header(API_KEY_HEADER, api_key)
            .json(payload)
            .send();
        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| TransportError(format!("no response within {:?}", self.timeout)))??;

        let status = response.status().as_u16();
        let body = match tokio::time::timeout(self.timeout, response.text()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                log::warn!("Upstream answered {} but the body could not be read: {}", status, e);
                format!("<unreadable body: {}>", e)
            }
            Err(_) => {
                log::warn!("Upstream answered {} but the body did not arrive in time", status);
                format!("<body not received within {:?}>", self.timeout)
            }
        };
        Ok(UpstreamReply { status, body })
    }
}
