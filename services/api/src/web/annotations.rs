//! services/api/src/web/annotations.rs
//!
//! Authenticated handlers for bookmarks, highlights and reading progress.
//! Every call is scoped to the `AuthUser` inserted by `require_auth`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use scripture_core::domain::{NewBookmark, NewHighlight};
use std::sync::Arc;
use uuid::Uuid;

use crate::web::dto::{
    BookmarkEntryResponse, BookmarkResponse, CreateBookmarkRequest, CreateHighlightRequest,
    ErrorBody, HighlightQuery, HighlightResponse, MarkChapterRequest, ReadingProgressResponse,
    SuccessResponse,
};
use crate::web::error::{failed, failed_for, ErrorResponse};
use crate::web::state::{AppState, AuthUser};

//=========================================================================================
// Bookmarks
//=========================================================================================

/// List the caller's bookmarks, newest first, with book and verse text.
#[utoipa::path(
    get,
    path = "/bookmarks",
    tag = "Annotations",
    responses(
        (status = 200, description = "The caller's bookmarks", body = [BookmarkEntryResponse]),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn list_bookmarks_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
) -> Result<Json<Vec<BookmarkEntryResponse>>, ErrorResponse> {
    let entries = state
        .bible
        .list_bookmarks(&owner_id)
        .await
        .map_err(failed("list bookmarks"))?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/bookmarks",
    tag = "Annotations",
    request_body = CreateBookmarkRequest,
    responses(
        (status = 201, description = "Bookmark created", body = BookmarkResponse),
        (status = 404, description = "No such book", body = ErrorBody),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn create_bookmark_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Json(body): Json<CreateBookmarkRequest>,
) -> Result<(StatusCode, Json<BookmarkResponse>), ErrorResponse> {
    let bookmark = state
        .bible
        .create_bookmark(
            &owner_id,
            NewBookmark {
                book_id: body.book_id,
                chapter: body.chapter,
                verse_number: body.verse_number,
                note: body.note,
            },
        )
        .await
        .map_err(failed("create bookmark"))?;
    Ok((StatusCode::CREATED, Json(bookmark.into())))
}

/// Delete one of the caller's bookmarks. Unknown or foreign ids succeed silently.
#[utoipa::path(
    delete,
    path = "/bookmarks/{id}",
    tag = "Annotations",
    params(("id" = Uuid, Path, description = "Bookmark id")),
    responses(
        (status = 200, description = "Always reports success", body = SuccessResponse),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn delete_bookmark_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Path(bookmark_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ErrorResponse> {
    state
        .bible
        .delete_bookmark(&owner_id, bookmark_id)
        .await
        .map_err(failed_for("delete bookmark", bookmark_id))?;
    Ok(Json(SuccessResponse { success: true }))
}

//=========================================================================================
// Highlights
//=========================================================================================

/// List the caller's highlights. Filtering applies only when both `bookId`
/// and `chapter` are supplied.
#[utoipa::path(
    get,
    path = "/highlights",
    tag = "Annotations",
    params(HighlightQuery),
    responses(
        (status = 200, description = "The caller's highlights", body = [HighlightResponse]),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn list_highlights_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Query(query): Query<HighlightQuery>,
) -> Result<Json<Vec<HighlightResponse>>, ErrorResponse> {
    let highlights = state
        .bible
        .list_highlights(&owner_id, query.book_id, query.chapter)
        .await
        .map_err(failed("list highlights"))?;
    Ok(Json(highlights.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/highlights",
    tag = "Annotations",
    request_body = CreateHighlightRequest,
    responses(
        (status = 201, description = "Highlight created", body = HighlightResponse),
        (status = 404, description = "No such book", body = ErrorBody),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn create_highlight_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Json(body): Json<CreateHighlightRequest>,
) -> Result<(StatusCode, Json<HighlightResponse>), ErrorResponse> {
    let highlight = state
        .bible
        .create_highlight(
            &owner_id,
            NewHighlight {
                book_id: body.book_id,
                chapter: body.chapter,
                verse_number: body.verse_number,
                color: body.color,
            },
        )
        .await
        .map_err(failed("create highlight"))?;
    Ok((StatusCode::CREATED, Json(highlight.into())))
}

#[utoipa::path(
    delete,
    path = "/highlights/{id}",
    tag = "Annotations",
    params(("id" = Uuid, Path, description = "Highlight id")),
    responses(
        (status = 200, description = "Always reports success", body = SuccessResponse),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn delete_highlight_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Path(highlight_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ErrorResponse> {
    state
        .bible
        .delete_highlight(&owner_id, highlight_id)
        .await
        .map_err(failed_for("delete highlight", highlight_id))?;
    Ok(Json(SuccessResponse { success: true }))
}

//=========================================================================================
// Reading Progress
//=========================================================================================

#[utoipa::path(
    get,
    path = "/reading-progress",
    tag = "Annotations",
    responses(
        (status = 200, description = "Completed chapters, newest first", body = [ReadingProgressResponse]),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn list_reading_progress_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
) -> Result<Json<Vec<ReadingProgressResponse>>, ErrorResponse> {
    let progress = state
        .bible
        .list_reading_progress(&owner_id)
        .await
        .map_err(failed("list reading progress"))?;
    Ok(Json(progress.into_iter().map(Into::into).collect()))
}

/// Mark a chapter complete. Repeating the call returns the original record.
#[utoipa::path(
    post,
    path = "/reading-progress",
    tag = "Annotations",
    request_body = MarkChapterRequest,
    responses(
        (status = 200, description = "The completion record", body = ReadingProgressResponse),
        (status = 401, description = "No valid session", body = ErrorBody)
    )
)]
pub async fn mark_chapter_complete_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(owner_id)): Extension<AuthUser>,
    Json(body): Json<MarkChapterRequest>,
) -> Result<Json<ReadingProgressResponse>, ErrorResponse> {
    let progress = state
        .bible
        .mark_chapter_complete(&owner_id, body.book_id, body.chapter)
        .await
        .map_err(failed_for(
            "mark chapter complete",
            format!("{}:{}", body.book_id, body.chapter),
        ))?;
    Ok(Json(progress.into()))
}
