//! services/api/src/web/rest.rs
//!
//! Assembles the REST router and holds the master definition for the
//! OpenAPI specification.

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    response::Json,
    routing::{delete, get, patch},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::{OpenApi, ToSchema};

use crate::web::annotations::*;
use crate::web::bible::*;
use crate::web::dto::*;
use crate::web::middleware::require_auth;
use crate::web::prayer::*;
use crate::web::state::AppState;
use crate::web::user::*;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        list_books_handler,
        get_book_handler,
        list_verses_handler,
        search_handler,
        daily_verse_handler,
        daily_verse_fallback_handler,
        verse_commentary_handler,
        chapter_commentary_handler,
        list_bookmarks_handler,
        create_bookmark_handler,
        delete_bookmark_handler,
        list_highlights_handler,
        create_highlight_handler,
        delete_highlight_handler,
        list_reading_progress_handler,
        mark_chapter_complete_handler,
        list_prayer_requests_handler,
        create_prayer_request_handler,
        update_prayer_request_handler,
        get_user_handler,
        upsert_user_handler,
        update_preferences_handler,
    ),
    components(
        schemas(
            HealthResponse,
            BookResponse,
            VerseResponse,
            BookmarkResponse,
            BookmarkEntryResponse,
            HighlightResponse,
            ReadingProgressResponse,
            DailyVerseResponse,
            FallbackDailyVerseResponse,
            EnrichedVerseResponse,
            PrayerRequestResponse,
            UserResponse,
            SuccessResponse,
            ErrorBody,
            CreateBookmarkRequest,
            CreateHighlightRequest,
            MarkChapterRequest,
            CreatePrayerRequestBody,
            UpdatePrayerRequestBody,
            UpdatePreferencesRequest,
            UpsertUserRequest,
        )
    ),
    tags(
        (name = "Bible", description = "Public scripture reference data."),
        (name = "Annotations", description = "A reader's bookmarks, highlights and progress."),
        (name = "Prayer", description = "A reader's prayer requests."),
        (name = "User", description = "Profile and reading preferences.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Health
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

//=========================================================================================
// Router
//=========================================================================================

/// Builds the API router: public reference routes, session-protected
/// annotation routes, and the shared CORS, timeout and tracing layers.
pub fn build_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/books", get(list_books_handler))
        .route("/books/{id}", get(get_book_handler))
        .route("/verses/{book_id}/{chapter}", get(list_verses_handler))
        .route(
            "/verses/{book_id}/{chapter}/commentary",
            get(chapter_commentary_handler),
        )
        .route(
            "/verses/{book_id}/{chapter}/{verse}/commentary",
            get(verse_commentary_handler),
        )
        .route("/search", get(search_handler))
        .route("/daily-verse", get(daily_verse_handler))
        .route("/daily-verse/fallback", get(daily_verse_fallback_handler));

    let protected_routes = Router::new()
        .route(
            "/bookmarks",
            get(list_bookmarks_handler).post(create_bookmark_handler),
        )
        .route("/bookmarks/{id}", delete(delete_bookmark_handler))
        .route(
            "/highlights",
            get(list_highlights_handler).post(create_highlight_handler),
        )
        .route("/highlights/{id}", delete(delete_highlight_handler))
        .route(
            "/reading-progress",
            get(list_reading_progress_handler).post(mark_chapter_complete_handler),
        )
        .route(
            "/prayer-requests",
            get(list_prayer_requests_handler).post(create_prayer_request_handler),
        )
        .route("/prayer-requests/{id}", patch(update_prayer_request_handler))
        .route("/user", get(get_user_handler).put(upsert_user_handler))
        .route("/user/preferences", patch(update_preferences_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let mut router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(TraceLayer::new_for_http());

    match state.config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => {
            let cors = CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);
            router = router.layer(cors);
        }
        Err(_) => warn!(
            "CORS_ORIGIN '{}' is not a valid header value; CORS disabled",
            state.config.cors_origin
        ),
    }

    router.with_state(state)
}
