//! crates/scripture_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{
    Book, Bookmark, ChapterFilter, DailyVerse, EnrichedVerse, Highlight, Language,
    NewBookmark, NewHighlight, NewPrayerRequest, PrayerRequest, ReadingProgress, User,
    UserPreferences, UserProfile, Verse, VerseRef,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Text provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Ports (Traits)
//=========================================================================================

/// Read access to canonical books, verse text and seeded daily verses.
///
/// Nothing here mutates at request time, so implementations can be shared
/// across requests without locking.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// All books ordered by id.
    async fn list_books(&self) -> PortResult<Vec<Book>>;

    /// Fails with `NotFound` when no book has this id.
    async fn get_book(&self, book_id: i32) -> PortResult<Book>;

    /// Verses of one chapter, ordered by verse number. Empty when nothing is seeded.
    async fn list_verses(&self, book_id: i32, chapter: i32) -> PortResult<Vec<Verse>>;

    /// Case-insensitive substring search over the column selected by `language`,
    /// ordered by (book, chapter, verse, id) and truncated to `limit`.
    async fn search_verses(
        &self,
        query: &str,
        language: Language,
        limit: usize,
    ) -> PortResult<Vec<Verse>>;

    /// Looks up the text for each reference. References without seeded text are
    /// absent from the map. When several translations exist the default one wins,
    /// then the alphabetically first.
    async fn verse_texts(&self, refs: &[VerseRef]) -> PortResult<HashMap<VerseRef, String>>;

    async fn daily_verse_for(&self, date: NaiveDate) -> PortResult<Option<DailyVerse>>;
}

/// Owner-scoped bookmarks, highlights, reading progress and prayer requests.
///
/// Every method takes the caller's owner id and must use it in the store
/// predicate; rows of other owners are never read or touched.
///
/// Deletes and updates deliberately differ: a delete of an id the owner does
/// not hold affects nothing and succeeds, while a prayer-request lookup or
/// update of such an id fails with `NotFound`.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    // --- Bookmarks ---
    /// Newest first.
    async fn list_bookmarks(&self, owner_id: &str) -> PortResult<Vec<Bookmark>>;

    async fn create_bookmark(&self, owner_id: &str, bookmark: NewBookmark) -> PortResult<Bookmark>;

    async fn delete_bookmark(&self, owner_id: &str, bookmark_id: Uuid) -> PortResult<()>;

    // --- Highlights ---
    /// Ordered by verse number; `filter` narrows to one chapter.
    async fn list_highlights(
        &self,
        owner_id: &str,
        filter: Option<ChapterFilter>,
    ) -> PortResult<Vec<Highlight>>;

    /// `highlight.color` is already resolved by the caller.
    async fn create_highlight(
        &self,
        owner_id: &str,
        highlight: NewHighlight,
    ) -> PortResult<Highlight>;

    async fn delete_highlight(&self, owner_id: &str, highlight_id: Uuid) -> PortResult<()>;

    // --- Reading Progress ---
    /// Most recently completed first.
    async fn list_reading_progress(&self, owner_id: &str) -> PortResult<Vec<ReadingProgress>>;

    /// Inserts the progress row unless one already exists for
    /// (owner, book, chapter), in which case the existing row is returned as is.
    /// The store itself must guarantee uniqueness under concurrent calls.
    async fn mark_chapter_complete(
        &self,
        owner_id: &str,
        book_id: i32,
        chapter: i32,
    ) -> PortResult<ReadingProgress>;

    // --- Prayer Requests ---
    /// Newest first.
    async fn list_prayer_requests(&self, owner_id: &str) -> PortResult<Vec<PrayerRequest>>;

    async fn create_prayer_request(
        &self,
        owner_id: &str,
        request: NewPrayerRequest,
    ) -> PortResult<PrayerRequest>;

    async fn get_prayer_request(&self, owner_id: &str, request_id: Uuid)
        -> PortResult<PrayerRequest>;

    /// Writes both answer fields as given. `NotFound` when the owner holds no such request.
    async fn set_prayer_answered(
        &self,
        owner_id: &str,
        request_id: Uuid,
        is_answered: bool,
        answered_at: Option<DateTime<Utc>>,
    ) -> PortResult<PrayerRequest>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> PortResult<User>;

    /// Inserts or updates keyed on `profile.id`. `None` fields keep the stored value.
    async fn upsert_user(&self, profile: UserProfile) -> PortResult<User>;

    /// Fails with `NotFound` for an unknown user.
    async fn update_preferences(
        &self,
        user_id: &str,
        preferences: UserPreferences,
    ) -> PortResult<User>;
}

/// Resolves session ids issued by the external auth provider.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session's user id, or `Unauthorized` when the session is
    /// unknown or expired.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<String>;
}

//=========================================================================================
// External Service Ports
//=========================================================================================

/// External scripture service used only to enrich verses with commentary.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Fetches one verse. Fails with `ProviderUnavailable` on any transport,
    /// status or payload problem.
    async fn fetch_verse(
        &self,
        book_name: &str,
        chapter: i32,
        verse_number: i32,
        translation: &str,
    ) -> PortResult<EnrichedVerse>;

    /// Fetches every verse of a chapter.
    async fn fetch_chapter(
        &self,
        book_name: &str,
        chapter: i32,
        translation: &str,
    ) -> PortResult<Vec<EnrichedVerse>>;
}
