//! services/api/src/web/user.rs
//!
//! Authenticated handlers for the caller's profile and reading preferences.

use axum::{extract::State, response::Json, Extension};
use scripture_core::domain::{UserPreferences, UserProfile};
use std::sync::Arc;

use crate::web::dto::{ErrorBody, UpdatePreferencesRequest, UpsertUserRequest, UserResponse};
use crate::web::error::{failed_for, ErrorResponse};
use crate::web::state::{AppState, AuthUser};

#[utoipa::path(
    get,
    path = "/user",
    tag = "User",
    responses(
        (status = 200, description = "The caller's profile", body = UserResponse),
        (status = 404, description = "No profile stored yet", body = ErrorBody),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<UserResponse>, ErrorResponse> {
    let user = state
        .bible
        .get_user(&user_id)
        .await
        .map_err(failed_for("get user", &user_id))?;
    Ok(Json(user.into()))
}

/// Create or update the caller's profile. Omitted fields keep their stored value.
#[utoipa::path(
    put,
    path = "/user",
    tag = "User",
    request_body = UpsertUserRequest,
    responses(
        (status = 200, description = "The stored profile", body = UserResponse),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn upsert_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(body): Json<UpsertUserRequest>,
) -> Result<Json<UserResponse>, ErrorResponse> {
    let profile = UserProfile {
        id: user_id.clone(),
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
        profile_image_url: body.profile_image_url,
        language: body.language,
        theme: body.theme,
        font_size: body.font_size,
    };
    let user = state
        .bible
        .upsert_user(profile)
        .await
        .map_err(failed_for("upsert user", &user_id))?;
    Ok(Json(user.into()))
}

/// Partially update language, theme and font size.
#[utoipa::path(
    patch,
    path = "/user/preferences",
    tag = "User",
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "The updated profile", body = UserResponse),
        (status = 400, description = "Font size is not positive", body = ErrorBody),
        (status = 404, description = "No profile stored yet", body = ErrorBody),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn update_preferences_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(body): Json<UpdatePreferencesRequest>,
) -> Result<Json<UserResponse>, ErrorResponse> {
    let preferences = UserPreferences {
        language: body.language,
        theme: body.theme,
        font_size: body.font_size,
    };
    let user = state
        .bible
        .update_user_preferences(&user_id, preferences)
        .await
        .map_err(failed_for("update preferences", &user_id))?;
    Ok(Json(user.into()))
}
