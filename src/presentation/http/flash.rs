use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

pub const UNAUTHORIZED_MESSAGE: &str = "Access unauthorized.";
pub const TAKEN_MESSAGE: &str = "Username or email already taken";

#[derive(Debug, Serialize, ToSchema)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

/// One-shot notice for the client, e.g. `{"flash": {"category": "danger", ...}}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FlashResponse {
    pub flash: Flash,
}

fn flash(status: StatusCode, category: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(FlashResponse {
            flash: Flash {
                category: category.to_string(),
                message: message.into(),
            },
        }),
    )
        .into_response()
}

pub fn danger(status: StatusCode, message: impl Into<String>) -> Response {
    flash(status, "danger", message)
}

pub fn success(status: StatusCode, message: impl Into<String>) -> Response {
    flash(status, "success", message)
}

/// Protected routes answer anonymous callers with 200 and this notice.
pub fn unauthorized() -> Response {
    danger(StatusCode::OK, UNAUTHORIZED_MESSAGE)
}

pub(crate) fn internal(err: anyhow::Error) -> StatusCode {
    tracing::error!(error = ?err, "request_failed");
    StatusCode::INTERNAL_SERVER_ERROR
}
