use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

/// JSON error envelope returned by every failing endpoint. The `message`
/// field is always present; unexpected errors additionally expose the
/// underlying error text (this is an internal admin tool).
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, message: message.into(), detail }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, None)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = match self.detail {
            Some(detail) => serde_json::json!({ "message": self.message, "error": detail }),
            None => serde_json::json!({ "message": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::Validation(_) | ServiceError::DuplicateName(_) | ServiceError::Parse(_) => {
                JsonApiError::new(StatusCode::BAD_REQUEST, err.to_string(), None)
            }
            ServiceError::NotFound(_) => JsonApiError::not_found(err.to_string()),
            ServiceError::Report(_) | ServiceError::Db(_) => {
                error!(err = %err, "unexpected service error");
                JsonApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "unexpected error",
                    Some(err.to_string()),
                )
            }
        }
    }
}
