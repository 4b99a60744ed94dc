//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of the
//! store ports from the `core` crate. It handles all interactions with the
//! PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use scripture_core::canon;
use scripture_core::domain::{
    Book, Bookmark, ChapterFilter, DailyVerse, Highlight, Language, NewBookmark, NewHighlight,
    NewPrayerRequest, PrayerRequest, ReadingProgress, Testament, User, UserPreferences, UserProfile,
    Verse, VerseRef, DEFAULT_HIGHLIGHT_COLOR, DEFAULT_TRANSLATION,
};
use scripture_core::ports::{
    AnnotationStore, PortError, PortResult, ReferenceStore, SessionStore, UserStore,
};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements every store port over one connection pool.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Inserts the 66 canonical books, leaving existing rows untouched.
    pub async fn seed_reference_data(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for book in canon::books() {
            let result = sqlx::query(
                "INSERT INTO bible_books (id, name, name_tagalog, testament, chapters) \
                 VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING",
            )
            .bind(book.id)
            .bind(&book.name)
            .bind(&book.localized_name)
            .bind(book.testament.as_str())
            .bind(book.chapter_count)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;
        info!(inserted, "Canonical books seeded");
        Ok(())
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Escapes LIKE wildcards so the query is matched literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct BookRecord {
    id: i32,
    name: String,
    name_tagalog: Option<String>,
    testament: String,
    chapters: i32,
}
impl BookRecord {
    fn to_domain(self) -> PortResult<Book> {
        let testament = self
            .testament
            .parse::<Testament>()
            .map_err(PortError::Unexpected)?;
        Ok(Book {
            id: self.id,
            name: self.name,
            localized_name: self.name_tagalog,
            testament,
            chapter_count: self.chapters,
        })
    }
}

#[derive(FromRow)]
struct VerseRecord {
    id: String,
    book_id: i32,
    chapter: i32,
    verse: i32,
    text_english: String,
    text_tagalog: Option<String>,
    translation: String,
    commentary: Option<String>,
}
impl VerseRecord {
    fn to_domain(self) -> Verse {
        Verse {
            id: self.id,
            book_id: self.book_id,
            chapter: self.chapter,
            verse_number: self.verse,
            text: self.text_english,
            localized_text: self.text_tagalog,
            translation: self.translation,
            commentary: self.commentary,
        }
    }
}

#[derive(FromRow)]
struct VerseTextRecord {
    book_id: i32,
    chapter: i32,
    verse: i32,
    text_english: String,
}

#[derive(FromRow)]
struct DailyVerseRecord {
    id: Uuid,
    date: NaiveDate,
    book_id: i32,
    chapter: i32,
    verse: i32,
    explanation: Option<String>,
}
impl DailyVerseRecord {
    fn to_domain(self) -> DailyVerse {
        DailyVerse {
            id: self.id,
            date: self.date,
            book_id: self.book_id,
            chapter: self.chapter,
            verse_number: self.verse,
            explanation: self.explanation,
        }
    }
}

#[derive(FromRow)]
struct BookmarkRecord {
    id: Uuid,
    user_id: String,
    book_id: i32,
    chapter: i32,
    verse: i32,
    note: Option<String>,
    created_at: DateTime<Utc>,
}
impl BookmarkRecord {
    fn to_domain(self) -> Bookmark {
        Bookmark {
            id: self.id,
            owner_id: self.user_id,
            book_id: self.book_id,
            chapter: self.chapter,
            verse_number: self.verse,
            note: self.note,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct HighlightRecord {
    id: Uuid,
    user_id: String,
    book_id: i32,
    chapter: i32,
    verse: i32,
    color: String,
    created_at: DateTime<Utc>,
}
impl HighlightRecord {
    fn to_domain(self) -> Highlight {
        Highlight {
            id: self.id,
            owner_id: self.user_id,
            book_id: self.book_id,
            chapter: self.chapter,
            verse_number: self.verse,
            color: self.color,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ReadingProgressRecord {
    id: Uuid,
    user_id: String,
    book_id: i32,
    chapter: i32,
    completed_at: DateTime<Utc>,
}
impl ReadingProgressRecord {
    fn to_domain(self) -> ReadingProgress {
        ReadingProgress {
            id: self.id,
            owner_id: self.user_id,
            book_id: self.book_id,
            chapter: self.chapter,
            completed_at: self.completed_at,
        }
    }
}

#[derive(FromRow)]
struct PrayerRequestRecord {
    id: Uuid,
    user_id: String,
    title: String,
    description: Option<String>,
    is_private: bool,
    is_answered: bool,
    created_at: DateTime<Utc>,
    answered_at: Option<DateTime<Utc>>,
}
impl PrayerRequestRecord {
    fn to_domain(self) -> PrayerRequest {
        PrayerRequest {
            id: self.id,
            owner_id: self.user_id,
            title: self.title,
            description: self.description,
            is_private: self.is_private,
            is_answered: self.is_answered,
            created_at: self.created_at,
            answered_at: self.answered_at,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    profile_image_url: Option<String>,
    language: String,
    theme: String,
    font_size: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            profile_image_url: self.profile_image_url,
            language: self.language,
            theme: self.theme,
            font_size: self.font_size,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const VERSE_COLUMNS: &str =
    "id, book_id, chapter, verse, text_english, text_tagalog, translation, commentary";
const BOOKMARK_COLUMNS: &str = "id, user_id, book_id, chapter, verse, note, created_at";
const HIGHLIGHT_COLUMNS: &str = "id, user_id, book_id, chapter, verse, color, created_at";
const PROGRESS_COLUMNS: &str = "id, user_id, book_id, chapter, completed_at";
const PRAYER_COLUMNS: &str =
    "id, user_id, title, description, is_private, is_answered, created_at, answered_at";
const USER_COLUMNS: &str = "id, email, first_name, last_name, profile_image_url, language, \
                            theme, font_size, created_at, updated_at";

//=========================================================================================
// `ReferenceStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReferenceStore for DbAdapter {
    async fn list_books(&self) -> PortResult<Vec<Book>> {
        let records = sqlx::query_as::<_, BookRecord>(
            "SELECT id, name, name_tagalog, testament, chapters FROM bible_books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(BookRecord::to_domain).collect()
    }

    async fn get_book(&self, book_id: i32) -> PortResult<Book> {
        let record = sqlx::query_as::<_, BookRecord>(
            "SELECT id, name, name_tagalog, testament, chapters FROM bible_books WHERE id = $1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Book {} not found", book_id)))?;

        record.to_domain()
    }

    async fn list_verses(&self, book_id: i32, chapter: i32) -> PortResult<Vec<Verse>> {
        let sql = format!(
            "SELECT {VERSE_COLUMNS} FROM bible_verses \
             WHERE book_id = $1 AND chapter = $2 ORDER BY verse, translation"
        );
        let records = sqlx::query_as::<_, VerseRecord>(&sql)
            .bind(book_id)
            .bind(chapter)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(records.into_iter().map(VerseRecord::to_domain).collect())
    }

    async fn search_verses(
        &self,
        query: &str,
        language: Language,
        limit: usize,
    ) -> PortResult<Vec<Verse>> {
        let column = match language {
            Language::English => "text_english",
            Language::Tagalog => "text_tagalog",
        };
        let sql = format!(
            "SELECT {VERSE_COLUMNS} FROM bible_verses WHERE {column} ILIKE $1 \
             ORDER BY book_id, chapter, verse, id LIMIT $2"
        );
        let records = sqlx::query_as::<_, VerseRecord>(&sql)
            .bind(like_pattern(query))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(records.into_iter().map(VerseRecord::to_domain).collect())
    }

    async fn verse_texts(&self, refs: &[VerseRef]) -> PortResult<HashMap<VerseRef, String>> {
        if refs.is_empty() {
            return Ok(HashMap::new());
        }
        let book_ids: Vec<i32> = refs.iter().map(|r| r.book_id).collect();
        let chapters: Vec<i32> = refs.iter().map(|r| r.chapter).collect();
        let verses: Vec<i32> = refs.iter().map(|r| r.verse_number).collect();

        let records = sqlx::query_as::<_, VerseTextRecord>(
            "SELECT DISTINCT ON (v.book_id, v.chapter, v.verse) \
                    v.book_id, v.chapter, v.verse, v.text_english \
             FROM bible_verses v \
             JOIN UNNEST($1::int4[], $2::int4[], $3::int4[]) AS r(book_id, chapter, verse) \
               ON v.book_id = r.book_id AND v.chapter = r.chapter AND v.verse = r.verse \
             ORDER BY v.book_id, v.chapter, v.verse, (v.translation = $4) DESC, v.translation",
        )
        .bind(&book_ids)
        .bind(&chapters)
        .bind(&verses)
        .bind(DEFAULT_TRANSLATION)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records
            .into_iter()
            .map(|r| (VerseRef::new(r.book_id, r.chapter, r.verse), r.text_english))
            .collect())
    }

    async fn daily_verse_for(&self, date: NaiveDate) -> PortResult<Option<DailyVerse>> {
        let record = sqlx::query_as::<_, DailyVerseRecord>(
            "SELECT id, date, book_id, chapter, verse, explanation FROM daily_verses WHERE date = $1",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.map(DailyVerseRecord::to_domain))
    }
}

//=========================================================================================
// `AnnotationStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnnotationStore for DbAdapter {
    async fn list_bookmarks(&self, owner_id: &str) -> PortResult<Vec<Bookmark>> {
        let sql = format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE user_id = $1 \
             ORDER BY created_at DESC, id"
        );
        let records = sqlx::query_as::<_, BookmarkRecord>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(records.into_iter().map(BookmarkRecord::to_domain).collect())
    }

    async fn create_bookmark(&self, owner_id: &str, bookmark: NewBookmark) -> PortResult<Bookmark> {
        let sql = format!(
            "INSERT INTO bookmarks (id, user_id, book_id, chapter, verse, note) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {BOOKMARK_COLUMNS}"
        );
        let record = sqlx::query_as::<_, BookmarkRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(bookmark.book_id)
            .bind(bookmark.chapter)
            .bind(bookmark.verse_number)
            .bind(&bookmark.note)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn delete_bookmark(&self, owner_id: &str, bookmark_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1 AND user_id = $2")
            .bind(bookmark_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        debug!(%bookmark_id, rows = result.rows_affected(), "Bookmark delete");
        Ok(())
    }

    async fn list_highlights(
        &self,
        owner_id: &str,
        filter: Option<ChapterFilter>,
    ) -> PortResult<Vec<Highlight>> {
        let records = match filter {
            Some(ChapterFilter { book_id, chapter }) => {
                let sql = format!(
                    "SELECT {HIGHLIGHT_COLUMNS} FROM highlights \
                     WHERE user_id = $1 AND book_id = $2 AND chapter = $3 \
                     ORDER BY verse, created_at"
                );
                sqlx::query_as::<_, HighlightRecord>(&sql)
                    .bind(owner_id)
                    .bind(book_id)
                    .bind(chapter)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!(
                    "SELECT {HIGHLIGHT_COLUMNS} FROM highlights WHERE user_id = $1 \
                     ORDER BY verse, created_at"
                );
                sqlx::query_as::<_, HighlightRecord>(&sql)
                    .bind(owner_id)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(unexpected)?;

        Ok(records.into_iter().map(HighlightRecord::to_domain).collect())
    }

    async fn create_highlight(
        &self,
        owner_id: &str,
        highlight: NewHighlight,
    ) -> PortResult<Highlight> {
        let sql = format!(
            "INSERT INTO highlights (id, user_id, book_id, chapter, verse, color) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {HIGHLIGHT_COLUMNS}"
        );
        let color = highlight
            .color
            .unwrap_or_else(|| DEFAULT_HIGHLIGHT_COLOR.to_string());
        let record = sqlx::query_as::<_, HighlightRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(highlight.book_id)
            .bind(highlight.chapter)
            .bind(highlight.verse_number)
            .bind(color)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn delete_highlight(&self, owner_id: &str, highlight_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM highlights WHERE id = $1 AND user_id = $2")
            .bind(highlight_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        debug!(%highlight_id, rows = result.rows_affected(), "Highlight delete");
        Ok(())
    }

    async fn list_reading_progress(&self, owner_id: &str) -> PortResult<Vec<ReadingProgress>> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM reading_progress WHERE user_id = $1 \
             ORDER BY completed_at DESC, id"
        );
        let records = sqlx::query_as::<_, ReadingProgressRecord>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(records.into_iter().map(ReadingProgressRecord::to_domain).collect())
    }

    async fn mark_chapter_complete(
        &self,
        owner_id: &str,
        book_id: i32,
        chapter: i32,
    ) -> PortResult<ReadingProgress> {
        // The unique (user_id, book_id, chapter) constraint arbitrates concurrent calls.
        let inserted = sqlx::query(
            "INSERT INTO reading_progress (id, user_id, book_id, chapter) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (user_id, book_id, chapter) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(book_id)
        .bind(chapter)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?
        .rows_affected();

        if inserted == 0 {
            debug!(book_id, chapter, "Chapter already marked complete");
        }

        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM reading_progress \
             WHERE user_id = $1 AND book_id = $2 AND chapter = $3"
        );
        let record = sqlx::query_as::<_, ReadingProgressRecord>(&sql)
            .bind(owner_id)
            .bind(book_id)
            .bind(chapter)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn list_prayer_requests(&self, owner_id: &str) -> PortResult<Vec<PrayerRequest>> {
        let sql = format!(
            "SELECT {PRAYER_COLUMNS} FROM prayer_requests WHERE user_id = $1 \
             ORDER BY created_at DESC, id"
        );
        let records = sqlx::query_as::<_, PrayerRequestRecord>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(records.into_iter().map(PrayerRequestRecord::to_domain).collect())
    }

    async fn create_prayer_request(
        &self,
        owner_id: &str,
        request: NewPrayerRequest,
    ) -> PortResult<PrayerRequest> {
        let sql = format!(
            "INSERT INTO prayer_requests (id, user_id, title, description, is_private) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PRAYER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, PrayerRequestRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&request.title)
            .bind(&request.description)
            .bind(request.is_private)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn get_prayer_request(
        &self,
        owner_id: &str,
        request_id: Uuid,
    ) -> PortResult<PrayerRequest> {
        let sql =
            format!("SELECT {PRAYER_COLUMNS} FROM prayer_requests WHERE id = $1 AND user_id = $2");
        let record = sqlx::query_as::<_, PrayerRequestRecord>(&sql)
            .bind(request_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| {
                PortError::NotFound(format!("Prayer request {} not found", request_id))
            })?;

        Ok(record.to_domain())
    }

    async fn set_prayer_answered(
        &self,
        owner_id: &str,
        request_id: Uuid,
        is_answered: bool,
        answered_at: Option<DateTime<Utc>>,
    ) -> PortResult<PrayerRequest> {
        let sql = format!(
            "UPDATE prayer_requests SET is_answered = $3, answered_at = $4 \
             WHERE id = $1 AND user_id = $2 RETURNING {PRAYER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, PrayerRequestRecord>(&sql)
            .bind(request_id)
            .bind(owner_id)
            .bind(is_answered)
            .bind(answered_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| {
                PortError::NotFound(format!("Prayer request {} not found", request_id))
            })?;

        Ok(record.to_domain())
    }
}

//=========================================================================================
// `UserStore` and `SessionStore` Trait Implementations
//=========================================================================================

#[async_trait]
impl UserStore for DbAdapter {
    async fn get_user(&self, user_id: &str) -> PortResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;

        Ok(record.to_domain())
    }

    async fn upsert_user(&self, profile: UserProfile) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (id, email, first_name, last_name, profile_image_url, \
                                language, theme, font_size) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'en'), COALESCE($7, 'light'), \
                     COALESCE($8, 18)) \
             ON CONFLICT (id) DO UPDATE SET \
                email = COALESCE($2, users.email), \
                first_name = COALESCE($3, users.first_name), \
                last_name = COALESCE($4, users.last_name), \
                profile_image_url = COALESCE($5, users.profile_image_url), \
                language = COALESCE($6, users.language), \
                theme = COALESCE($7, users.theme), \
                font_size = COALESCE($8, users.font_size), \
                updated_at = NOW() \
             RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&profile.id)
            .bind(&profile.email)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.profile_image_url)
            .bind(&profile.language)
            .bind(&profile.theme)
            .bind(profile.font_size)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn update_preferences(
        &self,
        user_id: &str,
        preferences: UserPreferences,
    ) -> PortResult<User> {
        let sql = format!(
            "UPDATE users SET \
                language = COALESCE($2, language), \
                theme = COALESCE($3, theme), \
                font_size = COALESCE($4, font_size), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .bind(&preferences.language)
            .bind(&preferences.theme)
            .bind(preferences.font_size)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;

        Ok(record.to_domain())
    }
}

#[async_trait]
impl SessionStore for DbAdapter {
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<String> {
        let user_id: Option<String> = sqlx::query_scalar(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        user_id.ok_or(PortError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_wraps_and_escapes_wildcards() {
        assert_eq!(like_pattern("light"), "%light%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }
}
