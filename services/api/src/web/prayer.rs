//! services/api/src/web/prayer.rs
//!
//! Authenticated handlers for the caller's prayer requests.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use scripture_core::domain::{NewPrayerRequest, PrayerRequestUpdate};
use std::sync::Arc;
use uuid::Uuid;

use crate::web::dto::{
    CreatePrayerRequestBody, ErrorBody, PrayerRequestResponse, UpdatePrayerRequestBody,
};
use crate::web::error::{failed, failed_for, ErrorResponse};
use crate::web::state::{AppState, AuthUser};

#[utoipa::path(
    get,
    path = "/prayer-requests",
    tag = "Prayer",
    responses(
        (status = 200, description = "The caller's requests, newest first", body = [PrayerRequestResponse]),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn list_prayer_requests_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
) -> Result<Json<Vec<PrayerRequestResponse>>, ErrorResponse> {
    let requests = state
        .bible
        .list_prayer_requests(&owner_id)
        .await
        .map_err(failed("list prayer requests"))?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/prayer-requests",
    tag = "Prayer",
    request_body = CreatePrayerRequestBody,
    responses(
        (status = 201, description = "Request created", body = PrayerRequestResponse),
        (status = 400, description = "Blank title", body = ErrorBody),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn create_prayer_request_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Json(body): Json<CreatePrayerRequestBody>,
) -> Result<(StatusCode, Json<PrayerRequestResponse>), ErrorResponse> {
    let request = state
        .bible
        .create_prayer_request(
            &owner_id,
            NewPrayerRequest {
                title: body.title,
                description: body.description,
                is_private: body.is_private.unwrap_or(false),
            },
        )
        .await
        .map_err(failed("create prayer request"))?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

/// Mark a request answered or unanswered. Foreign or unknown ids yield 404.
#[utoipa::path(
    patch,
    path = "/prayer-requests/{id}",
    tag = "Prayer",
    params(("id" = Uuid, Path, description = "Prayer request id")),
    request_body = UpdatePrayerRequestBody,
    responses(
        (status = 200, description = "The updated request", body = PrayerRequestResponse),
        (status = 404, description = "Not found for this caller", body = ErrorBody),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn update_prayer_request_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<UpdatePrayerRequestBody>,
) -> Result<Json<PrayerRequestResponse>, ErrorResponse> {
    let request = state
        .bible
        .update_prayer_request(
            &owner_id,
            request_id,
            PrayerRequestUpdate {
                is_answered: body.is_answered,
            },
        )
        .await
        .map_err(failed_for("update prayer request", request_id))?;
    Ok(Json(request.into()))
}
