use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Uri},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    built_info,
    core::gate::ADMIN_SECRET_HEADER,
    error::{AppError, Result},
    models::{outcome::RelayOutcome, vote::VoteRequest},
    AppState,
};

use super::responses::{ApiResponse, ModeChanged, Notice, ResetAck, VoteResults};

fn admin_secret(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
}

/// Liveness line with the crate name and version
pub(crate) async fn ping() -> String {
    format!("{} {} ok", built_info::PKG_NAME, built_info::PKG_VERSION)
}

/// Current voting mode and its message
pub(crate) async fn get_mode(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.mode.current())
}

/// Relay every vote item upstream in order, stopping at the first rejected item
pub(crate) async fn submit_vote(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    // One read of the mode decides the whole request
    let mode = state.mode.current();
    if !mode.open {
        return Err(AppError::VotingClosed(mode.message));
    }

    let request = VoteRequest::from_json(&body)?;
    let relay = state.relay()?;

    // Items go out one at a time so a failure stops the batch at that item
    let mut results = Vec::with_capacity(request.len());
    for (item_index, item) in request.items().iter().enumerate() {
        match relay.relay(item).await {
            RelayOutcome::Success { body, .. } => {
                results.push(body);
                state.tally.record(item);
            }
            RelayOutcome::Failure { attempts } => {
                return Err(AppError::UpstreamRejected {
                    item_index,
                    poll_id: item.poll_id.clone(),
                    option_id: item.option_id.clone(),
                    attempts,
                });
            }
        }
    }

    log::info!("Relayed {} vote(s)", results.len());
    Ok(ApiResponse::success(VoteResults { results }))
}

/// Logical reset for the front-end; local and upstream state are left alone.
pub(crate) async fn reset() -> impl IntoResponse {
    ApiResponse::success(ResetAck {
        reset_at: chrono::Utc::now(),
    })
}

/// Flip voting between open and closed
pub(crate) async fn admin_toggle_mode(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    state.gate.check(admin_secret(&headers))?;
    let mode = state.mode.toggle();
    Ok(ApiResponse::success(ModeChanged { mode }))
}

/// Zero the local counters
pub(crate) async fn admin_reset_tally(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    state.gate.check(admin_secret(&headers))?;
    state.tally.reset();
    Ok(ApiResponse::success(Notice {
        message: "Local counters reset.".to_string(),
    }))
}

/// Snapshot of the local counters
pub(crate) async fn admin_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    state.gate.check(admin_secret(&headers))?;
    Ok(Json(state.tally.snapshot()))
}

/// 404 for unknown paths and wrong methods
pub(crate) async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
