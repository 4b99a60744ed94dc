//! services/api/src/web/bible.rs
//!
//! Public, read-only handlers for books, verses, search and the daily verse.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use scripture_core::domain::Language;
use std::sync::Arc;

use crate::web::dto::{
    BookResponse, CommentaryQuery, DailyVerseQuery, DailyVerseResponse, EnrichedVerseResponse,
    ErrorBody, FallbackDailyVerseResponse, SearchQuery, VerseResponse,
};
use crate::web::error::{failed, failed_for, ErrorResponse};
use crate::web::state::AppState;

/// List all books in canonical order.
#[utoipa::path(
    get,
    path = "/books",
    tag = "Bible",
    responses(
        (status = 200, description = "Every book, ordered by id", body = [BookResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_books_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ErrorResponse> {
    let books = state.bible.list_books().await.map_err(failed("list books"))?;
    Ok(Json(books.into_iter().map(Into::into).collect()))
}

/// Fetch a single book.
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "Bible",
    params(("id" = i32, Path, description = "Canonical book id (1-66)")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 404, description = "No such book", body = ErrorBody)
    )
)]
pub async fn get_book_handler(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<i32>,
) -> Result<Json<BookResponse>, ErrorResponse> {
    let book = state
        .bible
        .get_book(book_id)
        .await
        .map_err(failed_for("get book", book_id))?;
    Ok(Json(book.into()))
}

/// List the verses of one chapter, ordered by verse number.
#[utoipa::path(
    get,
    path = "/verses/{book_id}/{chapter}",
    tag = "Bible",
    params(
        ("book_id" = i32, Path, description = "Canonical book id"),
        ("chapter" = i32, Path, description = "Chapter number")
    ),
    responses(
        (status = 200, description = "Verses of the chapter; empty when nothing is seeded", body = [VerseResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_verses_handler(
    State(state): State<Arc<AppState>>,
    Path((book_id, chapter)): Path<(i32, i32)>,
) -> Result<Json<Vec<VerseResponse>>, ErrorResponse> {
    let verses = state
        .bible
        .list_verses(book_id, chapter)
        .await
        .map_err(failed_for("list verses", format!("{}:{}", book_id, chapter)))?;
    Ok(Json(verses.into_iter().map(Into::into).collect()))
}

/// Case-insensitive substring search over verse text, capped at 50 results.
#[utoipa::path(
    get,
    path = "/search",
    tag = "Bible",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching verses", body = [VerseResponse]),
        (status = 400, description = "Missing or blank query", body = ErrorBody)
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<VerseResponse>>, ErrorResponse> {
    let language = Language::from_code(query.lang.as_deref());
    let verses = state
        .bible
        .search_verses(query.q.as_deref().unwrap_or_default(), language)
        .await
        .map_err(failed("search verses"))?;
    Ok(Json(verses.into_iter().map(Into::into).collect()))
}

/// The curated daily verse for a date, joined with its book and text.
#[utoipa::path(
    get,
    path = "/daily-verse",
    tag = "Bible",
    params(DailyVerseQuery),
    responses(
        (status = 200, description = "The daily verse", body = DailyVerseResponse),
        (status = 404, description = "Nothing curated for the date", body = ErrorBody)
    )
)]
pub async fn daily_verse_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DailyVerseQuery>,
) -> Result<Json<DailyVerseResponse>, ErrorResponse> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let entry = state
        .bible
        .get_daily_verse(date)
        .await
        .map_err(failed_for("get daily verse", date))?;
    Ok(Json(entry.into()))
}

/// The deterministic rotation pick for a date, used when nothing is curated.
#[utoipa::path(
    get,
    path = "/daily-verse/fallback",
    tag = "Bible",
    params(DailyVerseQuery),
    responses(
        (status = 200, description = "The rotation pick", body = FallbackDailyVerseResponse),
        (status = 404, description = "The rotation pool is empty", body = ErrorBody)
    )
)]
pub async fn daily_verse_fallback_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DailyVerseQuery>,
) -> Result<Json<FallbackDailyVerseResponse>, ErrorResponse> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let pick = state
        .bible
        .daily_verse_fallback(date)
        .await
        .map_err(failed_for("resolve daily verse", date))?;
    Ok(Json(pick.into()))
}

/// Text and commentary for one verse from the external provider.
#[utoipa::path(
    get,
    path = "/verses/{book_id}/{chapter}/{verse}/commentary",
    tag = "Bible",
    params(
        ("book_id" = i32, Path, description = "Canonical book id"),
        ("chapter" = i32, Path, description = "Chapter number"),
        ("verse" = i32, Path, description = "Verse number"),
        CommentaryQuery
    ),
    responses(
        (status = 200, description = "The enriched verse", body = EnrichedVerseResponse),
        (status = 404, description = "No such book", body = ErrorBody),
        (status = 503, description = "The provider could not be reached", body = ErrorBody)
    )
)]
pub async fn verse_commentary_handler(
    State(state): State<Arc<AppState>>,
    Path((book_id, chapter, verse)): Path<(i32, i32, i32)>,
    Query(query): Query<CommentaryQuery>,
) -> Result<Json<EnrichedVerseResponse>, ErrorResponse> {
    let translation = query
        .translation
        .unwrap_or_else(|| state.config.default_translation.clone());
    let enriched = state
        .bible
        .verse_commentary(book_id, chapter, verse, Some(&translation))
        .await
        .map_err(failed_for(
            "fetch commentary",
            format!("{}:{}:{}", book_id, chapter, verse),
        ))?;
    Ok(Json(enriched.into()))
}

/// Text and commentary for every verse of a chapter from the external provider.
#[utoipa::path(
    get,
    path = "/verses/{book_id}/{chapter}/commentary",
    tag = "Bible",
    params(
        ("book_id" = i32, Path, description = "Canonical book id"),
        ("chapter" = i32, Path, description = "Chapter number"),
        CommentaryQuery
    ),
    responses(
        (status = 200, description = "The enriched verses, by verse number", body = [EnrichedVerseResponse]),
        (status = 404, description = "No such book", body = ErrorBody),
        (status = 503, description = "The provider could not be reached", body = ErrorBody)
    )
)]
pub async fn chapter_commentary_handler(
    State(state): State<Arc<AppState>>,
    Path((book_id, chapter)): Path<(i32, i32)>,
    Query(query): Query<CommentaryQuery>,
) -> Result<Json<Vec<EnrichedVerseResponse>>, ErrorResponse> {
    let translation = query
        .translation
        .unwrap_or_else(|| state.config.default_translation.clone());
    let verses = state
        .bible
        .chapter_commentary(book_id, chapter, Some(&translation))
        .await
        .map_err(failed_for(
            "fetch chapter commentary",
            format!("{}:{}", book_id, chapter),
        ))?;
    Ok(Json(verses.into_iter().map(Into::into).collect()))
}
