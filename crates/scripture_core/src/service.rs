//! crates/scripture_core/src/service.rs
//!
//! `BibleService` is the single entry point for reading scripture and reading or
//! mutating a reader's annotations. It validates input before any store access,
//! scopes every annotation call to the caller's owner id, and composes the joins
//! between annotation rows and reference data.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::canon;
use crate::daily::{resolve_daily_verse, DEFAULT_POOL};
use crate::domain::{
    Book, Bookmark, BookmarkEntry, ChapterFilter, DailyVerseEntry, EnrichedVerse,
    FallbackDailyVerse, Highlight, Language, NewBookmark, NewHighlight, NewPrayerRequest,
    PrayerRequest, PrayerRequestUpdate, ReadingProgress, User, UserPreferences, UserProfile,
    Verse, VerseRef, DEFAULT_HIGHLIGHT_COLOR, DEFAULT_TRANSLATION, SEARCH_RESULT_LIMIT,
};
use crate::ports::{
    AnnotationStore, PortError, PortResult, ReferenceStore, TextProvider, UserStore,
};

#[derive(Clone)]
pub struct BibleService {
    reference: Arc<dyn ReferenceStore>,
    annotations: Arc<dyn AnnotationStore>,
    users: Arc<dyn UserStore>,
    text_provider: Option<Arc<dyn TextProvider>>,
    daily_pool: Vec<VerseRef>,
}

impl BibleService {
    pub fn new(
        reference: Arc<dyn ReferenceStore>,
        annotations: Arc<dyn AnnotationStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            reference,
            annotations,
            users,
            text_provider: None,
            daily_pool: DEFAULT_POOL.to_vec(),
        }
    }

    /// Enables commentary enrichment through an external provider.
    pub fn with_text_provider(mut self, provider: Arc<dyn TextProvider>) -> Self {
        self.text_provider = Some(provider);
        self
    }

    /// Replaces the pool the fallback daily verse cycles through.
    pub fn with_daily_pool(mut self, pool: Vec<VerseRef>) -> Self {
        self.daily_pool = pool;
        self
    }

    //=====================================================================================
    // Reference Data
    //=====================================================================================

    pub async fn list_books(&self) -> PortResult<Vec<Book>> {
        self.reference.list_books().await
    }

    pub async fn get_book(&self, book_id: i32) -> PortResult<Book> {
        self.reference.get_book(book_id).await
    }

    /// An empty result means the chapter has no seeded text; it does not say
    /// whether the book exists. Use `get_book` for that.
    pub async fn list_verses(&self, book_id: i32, chapter: i32) -> PortResult<Vec<Verse>> {
        self.reference.list_verses(book_id, chapter).await
    }

    /// Case-insensitive substring search, capped at `SEARCH_RESULT_LIMIT`.
    /// A blank query is rejected before the store is touched.
    pub async fn search_verses(&self, query: &str, language: Language) -> PortResult<Vec<Verse>> {
        if query.trim().is_empty() {
            return Err(PortError::Validation(
                "Query parameter is required".to_string(),
            ));
        }
        self.reference
            .search_verses(query, language, SEARCH_RESULT_LIMIT)
            .await
    }

    //=====================================================================================
    // Bookmarks
    //=====================================================================================

    /// The owner's bookmarks joined with book and verse text, newest first.
    /// Bookmarks pointing at verses without seeded text are left out.
    pub async fn list_bookmarks(&self, owner_id: &str) -> PortResult<Vec<BookmarkEntry>> {
        let bookmarks = self.annotations.list_bookmarks(owner_id).await?;
        if bookmarks.is_empty() {
            return Ok(Vec::new());
        }

        let refs: Vec<VerseRef> = bookmarks.iter().map(Bookmark::reference).collect();
        let texts = self.reference.verse_texts(&refs).await?;
        let books = self.books_by_id().await?;

        let entries = bookmarks
            .into_iter()
            .filter_map(|bookmark| {
                let verse_text = texts.get(&bookmark.reference())?.clone();
                let book = books.get(&bookmark.book_id)?.clone();
                Some(BookmarkEntry {
                    bookmark,
                    book,
                    verse_text,
                })
            })
            .collect();
        Ok(entries)
    }

    /// The book must exist; chapter and verse are stored as given.
    /// Bookmarking the same verse twice creates two rows.
    pub async fn create_bookmark(
        &self,
        owner_id: &str,
        bookmark: NewBookmark,
    ) -> PortResult<Bookmark> {
        self.reference.get_book(bookmark.book_id).await?;
        self.annotations.create_bookmark(owner_id, bookmark).await
    }

    /// Succeeds without effect when the id is unknown or owned by someone else,
    /// so callers learn nothing about other readers' bookmarks.
    pub async fn delete_bookmark(&self, owner_id: &str, bookmark_id: Uuid) -> PortResult<()> {
        self.annotations.delete_bookmark(owner_id, bookmark_id).await
    }

    //=====================================================================================
    // Highlights
    //=====================================================================================

    /// Filters to one chapter only when both `book_id` and `chapter` are given.
    /// Supplying just one of them returns every highlight of the owner.
    pub async fn list_highlights(
        &self,
        owner_id: &str,
        book_id: Option<i32>,
        chapter: Option<i32>,
    ) -> PortResult<Vec<Highlight>> {
        let filter = match (book_id, chapter) {
            (Some(book_id), Some(chapter)) => Some(ChapterFilter { book_id, chapter }),
            _ => None,
        };
        self.annotations.list_highlights(owner_id, filter).await
    }

    pub async fn create_highlight(
        &self,
        owner_id: &str,
        mut highlight: NewHighlight,
    ) -> PortResult<Highlight> {
        self.reference.get_book(highlight.book_id).await?;
        let color = highlight
            .color
            .take()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HIGHLIGHT_COLOR.to_string());
        highlight.color = Some(color);
        self.annotations.create_highlight(owner_id, highlight).await
    }

    /// Same no-op semantics as `delete_bookmark`.
    pub async fn delete_highlight(&self, owner_id: &str, highlight_id: Uuid) -> PortResult<()> {
        self.annotations.delete_highlight(owner_id, highlight_id).await
    }

    //=====================================================================================
    // Reading Progress
    //=====================================================================================

    pub async fn list_reading_progress(&self, owner_id: &str) -> PortResult<Vec<ReadingProgress>> {
        self.annotations.list_reading_progress(owner_id).await
    }

    /// The book must exist. Idempotent: a repeat call returns the first
    /// record untouched.
    pub async fn mark_chapter_complete(
        &self,
        owner_id: &str,
        book_id: i32,
        chapter: i32,
    ) -> PortResult<ReadingProgress> {
        self.reference.get_book(book_id).await?;
        self.annotations
            .mark_chapter_complete(owner_id, book_id, chapter)
            .await
    }

    //=====================================================================================
    // Daily Verse
    //=====================================================================================

    /// `NotFound` when nothing is seeded for the date or its verse has no text.
    pub async fn get_daily_verse(&self, date: NaiveDate) -> PortResult<DailyVerseEntry> {
        let not_found = || PortError::NotFound(format!("Daily verse for {}", date));

        let daily_verse = self
            .reference
            .daily_verse_for(date)
            .await?
            .ok_or_else(not_found)?;
        let verse_text = self
            .reference
            .verse_texts(&[daily_verse.reference()])
            .await?
            .remove(&daily_verse.reference())
            .ok_or_else(not_found)?;
        let book = match self.reference.get_book(daily_verse.book_id).await {
            Ok(book) => book,
            Err(PortError::NotFound(_)) => return Err(not_found()),
            Err(e) => return Err(e),
        };

        Ok(DailyVerseEntry {
            daily_verse,
            book,
            verse_text,
        })
    }

    /// Resolver pick for `date` from the configured pool, joined with its book.
    /// Verse text is attached only when it has been seeded.
    pub async fn daily_verse_fallback(&self, date: NaiveDate) -> PortResult<FallbackDailyVerse> {
        let verse = resolve_daily_verse(date, &self.daily_pool)
            .ok_or_else(|| PortError::NotFound("Daily verse pool is empty".to_string()))?;
        let book = self.reference.get_book(verse.book_id).await?;
        let verse_text = self.reference.verse_texts(&[verse]).await?.remove(&verse);

        Ok(FallbackDailyVerse {
            date,
            verse,
            book,
            verse_text,
        })
    }

    //=====================================================================================
    // Commentary Enrichment
    //=====================================================================================

    /// Fetches text and commentary for one verse from the external provider.
    /// Only this call depends on the provider being reachable.
    pub async fn verse_commentary(
        &self,
        book_id: i32,
        chapter: i32,
        verse_number: i32,
        translation: Option<&str>,
    ) -> PortResult<EnrichedVerse> {
        let (book_name, provider, translation) = self.enrichment_target(book_id, translation)?;
        provider
            .fetch_verse(book_name, chapter, verse_number, translation)
            .await
    }

    /// Whole-chapter variant of `verse_commentary`, ordered by verse number.
    pub async fn chapter_commentary(
        &self,
        book_id: i32,
        chapter: i32,
        translation: Option<&str>,
    ) -> PortResult<Vec<EnrichedVerse>> {
        let (book_name, provider, translation) = self.enrichment_target(book_id, translation)?;
        let mut verses = provider
            .fetch_chapter(book_name, chapter, translation)
            .await?;
        verses.sort_by_key(|v| v.verse_number);
        Ok(verses)
    }

    fn enrichment_target<'a>(
        &self,
        book_id: i32,
        translation: Option<&'a str>,
    ) -> PortResult<(&'static str, &Arc<dyn TextProvider>, &'a str)> {
        let book_name = canon::book_name(book_id)
            .ok_or_else(|| PortError::NotFound(format!("Book {} not found", book_id)))?;
        let provider = self.text_provider.as_ref().ok_or_else(|| {
            PortError::ProviderUnavailable("no text provider configured".to_string())
        })?;
        let translation = translation
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TRANSLATION);
        Ok((book_name, provider, translation))
    }

    //=====================================================================================
    // Prayer Requests
    //=====================================================================================

    pub async fn list_prayer_requests(&self, owner_id: &str) -> PortResult<Vec<PrayerRequest>> {
        self.annotations.list_prayer_requests(owner_id).await
    }

    pub async fn create_prayer_request(
        &self,
        owner_id: &str,
        request: NewPrayerRequest,
    ) -> PortResult<PrayerRequest> {
        if request.title.trim().is_empty() {
            return Err(PortError::Validation("Title is required".to_string()));
        }
        self.annotations.create_prayer_request(owner_id, request).await
    }

    /// Fails with `NotFound` when the request does not exist or belongs to
    /// another owner. Unlike deletes, this never silently succeeds.
    ///
    /// Marking answered stamps `answered_at` once; repeating it keeps the first
    /// stamp. Marking unanswered clears it. An empty update returns the request
    /// unchanged.
    pub async fn update_prayer_request(
        &self,
        owner_id: &str,
        request_id: Uuid,
        update: PrayerRequestUpdate,
    ) -> PortResult<PrayerRequest> {
        let current = self
            .annotations
            .get_prayer_request(owner_id, request_id)
            .await?;

        let Some(is_answered) = update.is_answered else {
            return Ok(current);
        };
        let answered_at = answered_at_after(&current, is_answered, Utc::now());

        self.annotations
            .set_prayer_answered(owner_id, request_id, is_answered, answered_at)
            .await
    }

    //=====================================================================================
    // Users
    //=====================================================================================

    pub async fn get_user(&self, user_id: &str) -> PortResult<User> {
        self.users.get_user(user_id).await
    }

    pub async fn upsert_user(&self, profile: UserProfile) -> PortResult<User> {
        if profile.id.trim().is_empty() {
            return Err(PortError::Validation("User id is required".to_string()));
        }
        self.users.upsert_user(profile).await
    }

    /// Fields left as `None` keep their stored value.
    pub async fn update_user_preferences(
        &self,
        user_id: &str,
        preferences: UserPreferences,
    ) -> PortResult<User> {
        if let Some(size) = preferences.font_size {
            if size <= 0 {
                return Err(PortError::Validation(
                    "Font size must be positive".to_string(),
                ));
            }
        }
        self.users.update_preferences(user_id, preferences).await
    }

    async fn books_by_id(&self) -> PortResult<HashMap<i32, Book>> {
        let books = self.reference.list_books().await?;
        debug!(count = books.len(), "Loaded books for join");
        Ok(books.into_iter().map(|b| (b.id, b)).collect())
    }
}

fn answered_at_after(
    current: &PrayerRequest,
    is_answered: bool,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (is_answered, current.answered_at) {
        (false, _) => None,
        (true, Some(existing)) if current.is_answered => Some(existing),
        (true, _) => Some(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(is_answered: bool, answered_at: Option<DateTime<Utc>>) -> PrayerRequest {
        PrayerRequest {
            id: Uuid::new_v4(),
            owner_id: "owner".to_string(),
            title: "Healing".to_string(),
            description: None,
            is_private: false,
            is_answered,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            answered_at,
        }
    }

    #[test]
    fn answering_stamps_now() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        assert_eq!(answered_at_after(&request(false, None), true, now), Some(now));
    }

    #[test]
    fn answering_again_keeps_first_stamp() {
        let first = Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        assert_eq!(
            answered_at_after(&request(true, Some(first)), true, now),
            Some(first)
        );
    }

    #[test]
    fn unanswering_clears_stamp() {
        let first = Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        assert_eq!(answered_at_after(&request(true, Some(first)), false, now), None);
    }
}
