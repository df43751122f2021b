use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use crate::{
    core::{
        gate::AdminGate,
        mode::{ModeController, DEFAULT_CLOSED_MESSAGE, DEFAULT_OPEN_MESSAGE},
        relay::VoteRelay,
        tally::LocalTally,
        upstream::{HttpUpstream, Upstream},
    },
    error::{AppError, Result},
    utils::parse_category_map,
};

/// Default upstream API base.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.strawpoll.com/v3";

/// Configuration for the application
#[derive(Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Base URL of the poll-hosting API
    pub upstream_url: Url,
    /// API key sent as `X-API-Key`; votes are refused without it
    pub upstream_api_key: Option<String>,
    /// Shared secret for admin routes; admin routes are refused without it
    pub admin_secret: Option<String>,
    /// Bound on connecting, awaiting the status and reading the body of each upstream call
    pub upstream_timeout: Duration,
    /// pollId -> tally category
    pub tally_categories: HashMap<String, String>,
    /// Message shown while voting is open
    pub open_message: String,
    /// Message shown after voting is closed
    pub closed_message: String,
    /// Maximum accepted request body in bytes
    pub max_body_bytes: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("upstream_url", &self.upstream_url.as_str())
            .field("upstream_api_key", &self.upstream_api_key.as_ref().map(|_| "<set>"))
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "<set>"))
            .field("upstream_timeout", &self.upstream_timeout)
            .field("tally_categories", &self.tally_categories)
            .field("open_message", &self.open_message)
            .field("closed_message", &self.closed_message)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8787)),
            upstream_url: Url::parse(DEFAULT_UPSTREAM_URL).expect("default upstream URL is valid"),
            upstream_api_key: None,
            admin_secret: None,
            upstream_timeout: Duration::from_secs(10),
            tally_categories: HashMap::new(),
            open_message: DEFAULT_OPEN_MESSAGE.to_string(),
            closed_message: DEFAULT_CLOSED_MESSAGE.to_string(),
            max_body_bytes: 16 * 1024, // 16KB
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Unset or empty variables keep their defaults; malformed values are errors.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(bind) = get("VOTEBRIDGE_BIND") {
            config.bind_addr = bind
                .parse()
                .map_err(|e| AppError::Config(format!("VOTEBRIDGE_BIND={}: {}", bind, e)))?;
        }

        if let Some(url) = get("VOTEBRIDGE_UPSTREAM_URL") {
            let parsed = Url::parse(&url)
                .map_err(|e| AppError::Config(format!("VOTEBRIDGE_UPSTREAM_URL={}: {}", url, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::Config(format!(
                    "VOTEBRIDGE_UPSTREAM_URL must be http or https, got {}",
                    parsed.scheme()
                )));
            }
            config.upstream_url = parsed;
        }

        config.upstream_api_key =
            get("VOTEBRIDGE_UPSTREAM_API_KEY").or_else(|| get("STRAWPOLL_API_KEY"));
        config.admin_secret = get("VOTEBRIDGE_ADMIN_SECRET");

        if let Some(secs) = get("VOTEBRIDGE_UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e| {
                AppError::Config(format!("VOTEBRIDGE_UPSTREAM_TIMEOUT_SECS={}: {}", secs, e))
            })?;
            if secs == 0 {
                return Err(AppError::Config(
                    "VOTEBRIDGE_UPSTREAM_TIMEOUT_SECS must be positive".to_string(),
                ));
            }
            config.upstream_timeout = Duration::from_secs(secs);
        }

        if let Some(mapping) = get("VOTEBRIDGE_TALLY_CATEGORIES") {
            let pairs = parse_category_map(&mapping).ok_or_else(|| {
                AppError::Config(format!(
                    "VOTEBRIDGE_TALLY_CATEGORIES must look like name=pollId,...; got {}",
                    mapping
                ))
            })?;
            config.tally_categories = pairs.into_iter().collect();
        }

        if let Some(message) = get("VOTEBRIDGE_OPEN_MESSAGE") {
            config.open_message = message;
        }
        if let Some(message) = get("VOTEBRIDGE_CLOSED_MESSAGE") {
            config.closed_message = message;
        }

        if let Some(limit) = get("VOTEBRIDGE_MAX_BODY_BYTES") {
            config.max_body_bytes = limit.parse().map_err(|e| {
                AppError::Config(format!("VOTEBRIDGE_MAX_BODY_BYTES={}: {}", limit, e))
            })?;
        }

        Ok(config)
    }
}

/// Application state that can be shared across handlers
#[derive(Debug)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Open/closed voting state
    pub mode: ModeController,
    /// Advisory local counters
    pub tally: LocalTally,
    /// Admin secret check
    pub gate: AdminGate,
    /// Absent when no upstream API key is configured
    relay: Option<VoteRelay>,
}

impl AppState {
    /// Create the application state with a real HTTP upstream
    pub fn with_config(config: Config) -> Result<Arc<Self>> {
        let upstream = HttpUpstream::new(config.upstream_timeout)?;
        Ok(Self::with_upstream(config, Arc::new(upstream)))
    }

    /// Create the application state around any upstream implementation
    pub fn with_upstream(config: Config, upstream: Arc<dyn Upstream>) -> Arc<Self> {
        let relay = match &config.upstream_api_key {
            Some(key) => Some(VoteRelay::new(upstream, config.upstream_url.clone(), key.clone())),
            None => {
                log::warn!("No upstream API key configured; /vote will answer 500");
                None
            }
        };
        if config.admin_secret.is_none() {
            log::warn!("No admin secret configured; admin routes will answer 500");
        }

        Arc::new(Self {
            mode: ModeController::new(config.open_message.clone(), config.closed_message.clone()),
            tally: LocalTally::new(config.tally_categories.clone()),
            gate: AdminGate::new(config.admin_secret.clone()),
            relay,
            config,
        })
    }

    /// The vote relay, or a misconfiguration error when no API key is set
    pub fn relay(&self) -> Result<&VoteRelay> {
        self.relay
            .as_ref()
            .ok_or_else(|| AppError::Misconfigured("upstream API key is not set".to_string()))
    }
}
