#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use votebridge::{TransportError, Upstream, UpstreamReply};

/// One request the relay sent upstream
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub api_key: String,
    pub payload: Value,
}

/// Upstream double that answers from a script and records every call
#[derive(Debug, Default)]
pub struct ScriptedUpstream {
    replies: Mutex<VecDeque<Result<UpstreamReply, TransportError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedUpstream {
    pub fn new(replies: Vec<Result<UpstreamReply, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::default(),
        })
    }

    /// Every call rejected with the same status
    pub fn always(status: u16, body: &str) -> Arc<Self> {
        Self::new((0..32).map(|_| Ok(UpstreamReply::new(status, body))).collect())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for ScriptedUpstream {
    async fn post(
        &self,
        url: &Url,
        api_key: &str,
        payload: &Value,
    ) -> Result<UpstreamReply, TransportError> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            api_key: api_key.to_string(),
            payload: payload.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(UpstreamReply::new(500, "unscripted call")))
    }
}

pub fn ok(body: &str) -> Result<UpstreamReply, TransportError> {
    Ok(UpstreamReply::new(200, body))
}

pub fn status(code: u16, body: &str) -> Result<UpstreamReply, TransportError> {
    Ok(UpstreamReply::new(code, body))
}

pub fn transport(message: &str) -> Result<UpstreamReply, TransportError> {
    Err(TransportError(message.to_string()))
}

pub const API_KEY: &str = "test-key";
pub const ADMIN_SECRET: &str = "admin-secret";
pub const BASE_URL: &str = "http://upstream.test/v3";

pub fn test_config() -> votebridge::Config {
    votebridge::Config {
        upstream_url: Url::parse(BASE_URL).unwrap(),
        upstream_api_key: Some(API_KEY.to_string()),
        admin_secret: Some(ADMIN_SECRET.to_string()),
        ..votebridge::Config::default()
    }
}

/// Local HTTP server that answers every request with `200` headers and a
/// body cut short: six bytes of a promised hundred, then either an immediate
/// close or a stall of `hold` before closing.
///
/// Returns the base URL and the number of requests it answered.
pub async fn spawn_short_body_upstream(
    hold: std::time::Duration,
) -> (Url, Arc<std::sync::atomic::AtomicUsize>) {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let answered = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&answered);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                // Consume the whole request before answering
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        return;
                    }
                    request.extend_from_slice(&chunk[..n]);
                    if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                        let headers = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
                        let length = headers
                            .lines()
                            .find_map(|line| line.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        if request.len() >= end + 4 + length {
                            break;
                        }
                    }
                }

                counter.fetch_add(1, Ordering::SeqCst);
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"id\":",
                    )
                    .await;
                let _ = socket.flush().await;
                tokio::time::sleep(hold).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    let base = Url::parse(&format!("http://{}/v3", addr)).unwrap();
    (base, answered)
}
