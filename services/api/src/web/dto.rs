//! services/api/src/web/dto.rs
//!
//! JSON request and response payloads. Field names are camelCase on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use scripture_core::domain::{
    Book, Bookmark, BookmarkEntry, DailyVerseEntry, EnrichedVerse, FallbackDailyVerse, Highlight,
    PrayerRequest, ReadingProgress, User, Verse,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: i32,
    pub name: String,
    pub localized_name: Option<String>,
    /// `old` or `new`.
    pub testament: String,
    pub chapter_count: i32,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            name: book.name,
            localized_name: book.localized_name,
            testament: book.testament.as_str().to_string(),
            chapter_count: book.chapter_count,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerseResponse {
    pub id: String,
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub text: String,
    pub localized_text: Option<String>,
    pub translation: String,
    pub commentary: Option<String>,
}

impl From<Verse> for VerseResponse {
    fn from(verse: Verse) -> Self {
        Self {
            id: verse.id,
            book_id: verse.book_id,
            chapter: verse.chapter,
            verse_number: verse.verse_number,
            text: verse.text,
            localized_text: verse.localized_text,
            translation: verse.translation,
            commentary: verse.commentary,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkResponse {
    pub id: Uuid,
    pub owner_id: String,
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Bookmark> for BookmarkResponse {
    fn from(b: Bookmark) -> Self {
        Self {
            id: b.id,
            owner_id: b.owner_id,
            book_id: b.book_id,
            chapter: b.chapter,
            verse_number: b.verse_number,
            note: b.note,
            created_at: b.created_at,
        }
    }
}

/// A bookmark with its book and the bookmarked verse's text.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkEntryResponse {
    #[serde(flatten)]
    pub bookmark: BookmarkResponse,
    pub book: BookResponse,
    pub verse_text: String,
}

impl From<BookmarkEntry> for BookmarkEntryResponse {
    fn from(entry: BookmarkEntry) -> Self {
        Self {
            bookmark: entry.bookmark.into(),
            book: entry.book.into(),
            verse_text: entry.verse_text,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HighlightResponse {
    pub id: Uuid,
    pub owner_id: String,
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl From<Highlight> for HighlightResponse {
    fn from(h: Highlight) -> Self {
        Self {
            id: h.id,
            owner_id: h.owner_id,
            book_id: h.book_id,
            chapter: h.chapter,
            verse_number: h.verse_number,
            color: h.color,
            created_at: h.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgressResponse {
    pub id: Uuid,
    pub owner_id: String,
    pub book_id: i32,
    pub chapter: i32,
    pub completed_at: DateTime<Utc>,
}

impl From<ReadingProgress> for ReadingProgressResponse {
    fn from(p: ReadingProgress) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            book_id: p.book_id,
            chapter: p.chapter,
            completed_at: p.completed_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DailyVerseResponse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub explanation: Option<String>,
    pub book: BookResponse,
    pub verse_text: String,
}

impl From<DailyVerseEntry> for DailyVerseResponse {
    fn from(entry: DailyVerseEntry) -> Self {
        let d = entry.daily_verse;
        Self {
            id: d.id,
            date: d.date,
            book_id: d.book_id,
            chapter: d.chapter,
            verse_number: d.verse_number,
            explanation: d.explanation,
            book: entry.book.into(),
            verse_text: entry.verse_text,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FallbackDailyVerseResponse {
    pub date: NaiveDate,
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub book: BookResponse,
    pub verse_text: Option<String>,
}

impl From<FallbackDailyVerse> for FallbackDailyVerseResponse {
    fn from(f: FallbackDailyVerse) -> Self {
        Self {
            date: f.date,
            book_id: f.verse.book_id,
            chapter: f.verse.chapter,
            verse_number: f.verse.verse_number,
            book: f.book.into(),
            verse_text: f.verse_text,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedVerseResponse {
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub text: String,
    pub translation: String,
    pub commentary: Option<String>,
}

impl From<EnrichedVerse> for EnrichedVerseResponse {
    fn from(v: EnrichedVerse) -> Self {
        Self {
            book_id: v.book_id,
            chapter: v.chapter,
            verse_number: v.verse_number,
            text: v.text,
            translation: v.translation,
            commentary: v.commentary,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PrayerRequestResponse {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub is_answered: bool,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl From<PrayerRequest> for PrayerRequestResponse {
    fn from(p: PrayerRequest) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            title: p.title,
            description: p.description,
            is_private: p.is_private,
            is_answered: p.is_answered,
            created_at: p.created_at,
            answered_at: p.answered_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub language: String,
    pub theme: String,
    pub font_size: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            profile_image_url: u.profile_image_url,
            language: u.language,
            theme: u.theme,
            font_size: u.font_size,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorBody {
    pub message: String,
}

//=========================================================================================
// Request Bodies
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmarkRequest {
    pub book_id: i32,
    pub chapter: i32,
    #[serde(alias = "verse")]
    pub verse_number: i32,
    pub note: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHighlightRequest {
    pub book_id: i32,
    pub chapter: i32,
    #[serde(alias = "verse")]
    pub verse_number: i32,
    pub color: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkChapterRequest {
    pub book_id: i32,
    pub chapter: i32,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrayerRequestBody {
    /// Must not be blank. A missing title is reported as a validation error.
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub is_private: Option<bool>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrayerRequestBody {
    pub is_answered: Option<bool>,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub language: Option<String>,
    pub theme: Option<String>,
    pub font_size: Option<i32>,
}

/// Profile data pushed by the auth provider. The id always comes from the session.
#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub language: Option<String>,
    pub theme: Option<String>,
    pub font_size: Option<i32>,
}

//=========================================================================================
// Query Strings
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Substring to look for. Required.
    pub q: Option<String>,
    /// `en` (default) or `tl`.
    pub lang: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct HighlightQuery {
    /// Only applied together with `chapter`.
    pub book_id: Option<i32>,
    /// Only applied together with `bookId`.
    pub chapter: Option<i32>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyVerseQuery {
    /// `YYYY-MM-DD`; defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommentaryQuery {
    /// Translation code; defaults to the configured translation.
    pub translation: Option<String>,
}
