#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

//! # votebridge
//!
//! A small HTTP relay that forwards votes to a poll-hosting API whose accepted
//! request shape is not known in advance.
//!
//! ## Features
//!
//! - **Fallback relay**: each vote is tried against an ordered table of
//!   (endpoint, payload encoding) strategies until the upstream answers 2xx
//! - **Diagnostic traces**: when every strategy fails, the caller gets the
//!   status and body of each attempt, in order
//! - **Voting mode**: an admin-toggled open/closed switch checked before any relay
//! - **Local tally**: advisory in-memory counters for operational visibility
//! - **Web API**: axum server with permissive CORS and a shared-secret admin gate
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use votebridge::{create_router, init, AppState, Config, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     init()?;
//!     let config = Config::from_env()?;
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
//!     let app = create_router(AppState::with_config(config)?);
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

// Internal modules
pub mod api;
pub mod core;
/// Defines the application's error types and result aliases.
pub mod error;
pub mod models;
mod state;
mod utils;

#[allow(dead_code, missing_docs, unreachable_pub)]
pub(crate) mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

// Public API exports
pub use crate::{
    core::{
        gate::AdminGate,
        mode::{ModeController, PollMode},
        relay::VoteRelay,
        strategy::{Encoding, Segment, Strategy, DEFAULT_STRATEGIES},
        tally::{LocalTally, TallySnapshot},
        upstream::{HttpUpstream, Upstream, UpstreamReply},
    },
    error::{AppError, Result, TransportError},
    models::{
        outcome::{Attempt, RelayOutcome},
        vote::{VoteItem, VoteRequest},
    },
    state::{AppState, Config},
};

#[cfg(feature = "web")]
pub use crate::api::create_router;

/// Initialize logging with sensible defaults
///
/// Reads `RUST_LOG` (default `info`). `tower-http` request spans are
/// forwarded to the same logger through `tracing`'s `log` feature.
/// It should be called once, early in the application startup process.
///
/// # Errors
///
/// Returns an error if a logger was already installed.
pub fn init() -> Result<()> {
    let env = env_logger::Env::default()
        .default_filter_or("info")
        .default_write_style_or("auto");

    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .format_module_path(false)
        .format_target(false)
        .try_init()
        .map_err(|e| AppError::Internal(format!("Logger initialization failed: {}", e)))?;

    log::info!(
        "Initializing {} {} (built {})",
        built_info::PKG_NAME,
        built_info::PKG_VERSION,
        built_info::BUILT_TIME_UTC
    );
    Ok(())
}
