//! services/api/src/web/error.rs
//!
//! Maps core `PortError`s onto HTTP responses with a `{"message": ...}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use scripture_core::ports::PortError;
use std::fmt::Display;
use tracing::{debug, error, warn};

use crate::web::dto::ErrorBody;

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Translates a port failure raised while performing `operation`.
    /// Unexpected failures are logged and reported with a generic message.
    pub fn from_port(operation: &str, entity: Option<&str>, err: PortError) -> Self {
        let entity = entity.unwrap_or("-");
        match err {
            PortError::NotFound(msg) => {
                debug!(operation, entity, "Not found: {}", msg);
                Self::new(StatusCode::NOT_FOUND, msg)
            }
            PortError::Validation(msg) => {
                debug!(operation, entity, "Rejected input: {}", msg);
                Self::new(StatusCode::BAD_REQUEST, msg)
            }
            PortError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized"),
            PortError::ProviderUnavailable(msg) => {
                warn!(operation, entity, "Text provider unavailable: {}", msg);
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Text provider is unavailable",
                )
            }
            PortError::Unexpected(msg) => {
                error!(operation, entity, "Failed to {}: {}", operation, msg);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to {}", operation),
                )
            }
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

/// `map_err` adapter for handlers: `.map_err(failed("list books"))`.
pub fn failed(operation: &'static str) -> impl FnOnce(PortError) -> ErrorResponse {
    move |e| ErrorResponse::from_port(operation, None, e)
}

/// Like `failed`, recording the id of the entity being acted on.
pub fn failed_for(
    operation: &'static str,
    entity: impl Display,
) -> impl FnOnce(PortError) -> ErrorResponse {
    let entity = entity.to_string();
    move |e| ErrorResponse::from_port(operation, Some(&entity), e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_port_error_to_a_status() {
        let cases = [
            (PortError::NotFound("Book 99 not found".into()), StatusCode::NOT_FOUND),
            (PortError::Validation("Title is required".into()), StatusCode::BAD_REQUEST),
            (PortError::Unauthorized, StatusCode::UNAUTHORIZED),
            (PortError::ProviderUnavailable("timeout".into()), StatusCode::SERVICE_UNAVAILABLE),
            (PortError::Unexpected("pool closed".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(failed("test")(err).status, status);
        }
    }

    #[test]
    fn unexpected_errors_hide_details() {
        let resp = failed_for("delete bookmark", "42")(PortError::Unexpected(
            "connection reset".into(),
        ));
        assert_eq!(resp.message, "Failed to delete bookmark");
    }

    #[test]
    fn validation_errors_keep_their_message() {
        let resp = failed("create prayer request")(PortError::Validation(
            "Title is required".into(),
        ));
        assert_eq!(resp.message, "Title is required");
    }
}
