//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use scripture_core::ports::PortError;
use tracing::{debug, error, Level};

use crate::web::dto::ErrorBody;
use crate::web::state::{AppState, AuthUser};

const SESSION_COOKIE: &str = "session=";

/// Middleware that validates the caller's auth session and extracts the user id.
///
/// The session id is read from the `session` cookie, or from an
/// `Authorization: Bearer` header when no cookie is present.
/// If valid, inserts an `AuthUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_session_id) = session_id(req.headers()) else {
        return unauthorized();
    };

    let user_id = match state.sessions.validate_auth_session(&auth_session_id).await {
        Ok(user_id) => user_id,
        Err(e) => {
            if rejection_level(&e) == Level::ERROR {
                error!("Failed to validate auth session: {}", e);
            } else {
                debug!("Rejected auth session: {}", e);
            }
            return unauthorized();
        }
    };

    req.extensions_mut().insert(AuthUser(user_id));
    next.run(req).await
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| c.trim().strip_prefix(SESSION_COOKIE));

    let from_bearer = || {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    };

    from_cookie
        .or_else(from_bearer)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Unknown or expired sessions are routine; anything else means the session
/// store itself is failing.
fn rejection_level(err: &PortError) -> Level {
    match err {
        PortError::Unauthorized | PortError::NotFound(_) => Level::DEBUG,
        _ => Level::ERROR,
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            message: "Unauthorized".to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; lang=tl"),
        );
        assert_eq!(session_id(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn falls_back_to_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(session_id(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn store_failures_are_logged_as_errors() {
        assert_eq!(rejection_level(&PortError::Unauthorized), Level::DEBUG);
        assert_eq!(
            rejection_level(&PortError::Unexpected("pool timed out".into())),
            Level::ERROR
        );
    }

    #[test]
    fn empty_or_missing_session_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_id(&headers), None);
    }
}
