use serde::Serialize;
use serde_json::Value;

/// One strategy tried against the upstream for a single vote item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    /// Position of the strategy in the relay's table.
    pub strategy_index: usize,
    /// Name of the strategy, for logs and traces.
    pub strategy: String,
    /// Fully rendered upstream URL.
    pub endpoint: String,
    /// Upstream status code; absent when the request never got a response.
    #[serde(rename = "statusCode")]
    pub status: Option<u16>,
    /// Upstream response body, or the transport error text.
    #[serde(rename = "responseBody")]
    pub body: String,
}

/// Result of relaying one vote item.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    /// A strategy got a 2xx reply.
    Success {
        /// Index of the strategy that succeeded.
        strategy_index: usize,
        /// Upstream body, parsed as JSON or wrapped as `{"raw": text}`.
        body: Value,
    },
    /// Every strategy failed.
    Failure {
        /// All attempts in the order they were made.
        attempts: Vec<Attempt>,
    },
}

impl RelayOutcome {
    /// Whether a strategy succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
