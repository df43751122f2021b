use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::core::mode::PollMode;

/// Successful response: `{"ok": true, ...data}`
#[derive(Serialize, Debug)]
pub(crate) struct ApiResponse<T: Serialize> {
    pub(crate) ok: bool,
    #[serde(flatten)]
    pub(crate) data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) fn success(data: T) -> Self {
        Self { ok: true, data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Upstream bodies, one per vote item, in request order
#[derive(Serialize, Debug)]
pub(crate) struct VoteResults {
    pub(crate) results: Vec<Value>,
}

/// Mode after an admin toggle
#[derive(Serialize, Debug)]
pub(crate) struct ModeChanged {
    pub(crate) mode: PollMode,
}

/// Acknowledgement of a logical reset
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetAck {
    pub(crate) reset_at: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
pub(crate) struct Notice {
    pub(crate) message: String,
}
