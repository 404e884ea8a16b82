use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use index_worker::ControllerError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ControllerError> for AppError {
    fn from(e: ControllerError) -> Self {
        match e {
            ControllerError::Validation(_) | ControllerError::Query(_) => {
                AppError::BadRequest(e.to_string())
            }
            ControllerError::NotFound(_) => AppError::NotFound(e.to_string()),
            ControllerError::Store(_) | ControllerError::Queue(_) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
