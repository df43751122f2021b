//! Ordered fallback relay of a single vote to the upstream service
//!
//! The upstream's accepted request shape differs between deployments, so each
//! vote is tried against a table of (endpoint, encoding) strategies until one
//! returns 2xx. A non-2xx reply is treated as a shape mismatch and the next
//! strategy is tried; the same strategy is never retried. Strategies for one
//! item never run concurrently, since two accepted shapes would cast two votes.

use std::{fmt, sync::Arc};

use reqwest::Url;

use crate::{
    core::{
        strategy::{Strategy, DEFAULT_STRATEGIES},
        upstream::Upstream,
    },
    models::{
        outcome::{Attempt, RelayOutcome},
        vote::VoteItem,
    },
    utils::{parse_upstream_body, truncate_for_log},
};

/// Relays votes through an ordered strategy table.
pub struct VoteRelay {
    upstream: Arc<dyn Upstream>,
    base_url: Url,
    api_key: String,
    strategies: Vec<Strategy>,
}

impl fmt::Debug for VoteRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoteRelay")
            .field("upstream", &self.upstream)
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("strategies", &self.strategies.len())
            .finish()
    }
}

impl VoteRelay {
    /// Create a relay using the built-in strategy table
    pub fn new(upstream: Arc<dyn Upstream>, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            upstream,
            base_url,
            api_key: api_key.into(),
            strategies: DEFAULT_STRATEGIES.to_vec(),
        }
    }

    /// Replace the strategy table
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Strategies in the order they are tried
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Relay one vote, returning the first success or every failed attempt.
    pub async fn relay(&self, item: &VoteItem) -> RelayOutcome {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for (index, strategy) in self.strategies.iter().enumerate() {
            let Some(url) = strategy.endpoint(&self.base_url, &item.poll_id) else {
                attempts.push(Attempt {
                    strategy_index: index,
                    strategy: strategy.name.to_string(),
                    endpoint: self.base_url.to_string(),
                    status: None,
                    body: "base URL cannot carry a path".to_string(),
                });
                continue;
            };

            let payload = strategy.payload(item);
            log::debug!(
                "Relaying vote {}/{} via {} ({})",
                item.poll_id,
                item.option_id,
                strategy.name,
                url
            );

            match self.upstream.post(&url, &self.api_key, &payload).await {
                Ok(reply) if reply.is_success() => {
                    if !attempts.is_empty() {
                        log::info!(
                            "Vote {}/{} accepted by {} after {} rejected attempt(s)",
                            item.poll_id,
                            item.option_id,
                            strategy.name,
                            attempts.len()
                        );
                    }
                    return RelayOutcome::Success {
                        strategy_index: index,
                        body: parse_upstream_body(&reply.body),
                    };
                }
                Ok(reply) => {
                    log::warn!(
                        "Strategy {} rejected with {}: {}",
                        strategy.name,
                        reply.status,
                        truncate_for_log(&reply.body)
                    );
                    attempts.push(Attempt {
                        strategy_index: index,
                        strategy: strategy.name.to_string(),
                        endpoint: url.to_string(),
                        status: Some(reply.status),
                        body: reply.body,
                    });
                }
                Err(e) => {
                    log::warn!("Strategy {} failed: {}", strategy.name, e);
                    attempts.push(Attempt {
                        strategy_index: index,
                        strategy: strategy.name.to_string(),
                        endpoint: url.to_string(),
                        status: None,
                        body: e.0,
                    });
                }
            }
        }

        log::error!(
            "Vote {}/{} rejected by all {} strategies",
            item.poll_id,
            item.option_id,
            attempts.len()
        );
        RelayOutcome::Failure { attempts }
    }
}
