//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of every store port. Used when no
//! `DATABASE_URL` is configured and by the test suites. All state sits behind
//! one `RwLock`, so check-then-insert operations are atomic.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use scripture_core::canon;
use scripture_core::domain::{
    Book, Bookmark, ChapterFilter, DailyVerse, Highlight, Language, NewBookmark, NewHighlight,
    NewPrayerRequest, PrayerRequest, ReadingProgress, User, UserPreferences, UserProfile, Verse,
    VerseRef, DEFAULT_HIGHLIGHT_COLOR, DEFAULT_TRANSLATION,
};
use scripture_core::ports::{
    AnnotationStore, PortError, PortResult, ReferenceStore, SessionStore, UserStore,
};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    books: BTreeMap<i32, Book>,
    verses: Vec<Verse>,
    daily_verses: HashMap<NaiveDate, DailyVerse>,
    // Annotation vectors keep insertion order; list calls sort on top of it.
    bookmarks: Vec<Bookmark>,
    highlights: Vec<Highlight>,
    progress: Vec<ReadingProgress>,
    prayer_requests: Vec<PrayerRequest>,
    users: HashMap<String, User>,
    sessions: HashMap<String, (String, DateTime<Utc>)>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// An empty store: no books, no verses.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with the 66 canonical books.
    pub fn with_canon() -> Self {
        let inner = Inner {
            books: canon::books().into_iter().map(|b| (b.id, b)).collect(),
            ..Inner::default()
        };
        Self {
            inner: RwLock::new(inner),
        }
    }

    //=====================================================================================
    // Seeding
    //=====================================================================================

    pub async fn insert_book(&self, book: Book) {
        self.inner.write().await.books.insert(book.id, book);
    }

    /// Fails when a verse with the same (book, chapter, verse, translation) exists.
    pub async fn insert_verse(&self, verse: Verse) -> PortResult<()> {
        let mut inner = self.inner.write().await;
        let duplicate = inner.verses.iter().any(|v| {
            v.reference() == verse.reference() && v.translation == verse.translation
        });
        if duplicate {
            return Err(PortError::Unexpected(format!(
                "Verse {}:{}:{} ({}) already seeded",
                verse.book_id, verse.chapter, verse.verse_number, verse.translation
            )));
        }
        inner.verses.push(verse);
        Ok(())
    }

    pub async fn insert_daily_verse(&self, daily_verse: DailyVerse) {
        self.inner
            .write()
            .await
            .daily_verses
            .insert(daily_verse.date, daily_verse);
    }

    /// Records a session the way the external auth provider would.
    pub async fn insert_session(&self, session_id: &str, user_id: &str, expires_at: DateTime<Utc>) {
        self.inner
            .write()
            .await
            .sessions
            .insert(session_id.to_string(), (user_id.to_string(), expires_at));
    }
}

fn text_column(verse: &Verse, language: Language) -> Option<&str> {
    match language {
        Language::English => Some(verse.text.as_str()),
        Language::Tagalog => verse.localized_text.as_deref(),
    }
}

/// Reverses insertion order, then stable-sorts descending by `key`, so ties
/// come out newest-inserted first.
fn newest_first<T: Clone, K: Ord>(items: impl DoubleEndedIterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = items.rev().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

//=========================================================================================
// `ReferenceStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReferenceStore for MemoryStore {
    async fn list_books(&self) -> PortResult<Vec<Book>> {
        Ok(self.inner.read().await.books.values().cloned().collect())
    }

    async fn get_book(&self, book_id: i32) -> PortResult<Book> {
        self.inner
            .read()
            .await
            .books
            .get(&book_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Book {} not found", book_id)))
    }

    async fn list_verses(&self, book_id: i32, chapter: i32) -> PortResult<Vec<Verse>> {
        let inner = self.inner.read().await;
        let mut verses: Vec<Verse> = inner
            .verses
            .iter()
            .filter(|v| v.book_id == book_id && v.chapter == chapter)
            .cloned()
            .collect();
        verses.sort_by(|a, b| {
            (a.verse_number, &a.translation).cmp(&(b.verse_number, &b.translation))
        });
        Ok(verses)
    }

    async fn search_verses(
        &self,
        query: &str,
        language: Language,
        limit: usize,
    ) -> PortResult<Vec<Verse>> {
        let needle = query.to_lowercase();
        let inner = self.inner.read().await;
        let mut matches: Vec<Verse> = inner
            .verses
            .iter()
            .filter(|v| {
                text_column(v, language)
                    .map(|text| text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| (a.reference(), &a.id).cmp(&(b.reference(), &b.id)));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn verse_texts(&self, refs: &[VerseRef]) -> PortResult<HashMap<VerseRef, String>> {
        let inner = self.inner.read().await;
        let mut texts = HashMap::new();
        for r in refs {
            let best = inner
                .verses
                .iter()
                .filter(|v| v.reference() == *r)
                .min_by(|a, b| {
                    let rank = |v: &Verse| (v.translation != DEFAULT_TRANSLATION, v.translation.clone());
                    rank(a).cmp(&rank(b))
                });
            if let Some(verse) = best {
                texts.insert(*r, verse.text.clone());
            }
        }
        Ok(texts)
    }

    async fn daily_verse_for(&self, date: NaiveDate) -> PortResult<Option<DailyVerse>> {
        Ok(self.inner.read().await.daily_verses.get(&date).cloned())
    }
}

//=========================================================================================
// `AnnotationStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnnotationStore for MemoryStore {
    async fn list_bookmarks(&self, owner_id: &str) -> PortResult<Vec<Bookmark>> {
        let inner = self.inner.read().await;
        let owned = inner
            .bookmarks
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .cloned();
        Ok(newest_first(owned, |b| b.created_at))
    }

    async fn create_bookmark(&self, owner_id: &str, bookmark: NewBookmark) -> PortResult<Bookmark> {
        let created = Bookmark {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            book_id: bookmark.book_id,
            chapter: bookmark.chapter,
            verse_number: bookmark.verse_number,
            note: bookmark.note,
            created_at: Utc::now(),
        };
        self.inner.write().await.bookmarks.push(created.clone());
        Ok(created)
    }

    async fn delete_bookmark(&self, owner_id: &str, bookmark_id: Uuid) -> PortResult<()> {
        self.inner
            .write()
            .await
            .bookmarks
            .retain(|b| !(b.id == bookmark_id && b.owner_id == owner_id));
        Ok(())
    }

    async fn list_highlights(
        &self,
        owner_id: &str,
        filter: Option<ChapterFilter>,
    ) -> PortResult<Vec<Highlight>> {
        let inner = self.inner.read().await;
        let mut highlights: Vec<Highlight> = inner
            .highlights
            .iter()
            .filter(|h| h.owner_id == owner_id)
            .filter(|h| match filter {
                Some(f) => h.book_id == f.book_id && h.chapter == f.chapter,
                None => true,
            })
            .cloned()
            .collect();
        highlights.sort_by_key(|h| h.verse_number);
        Ok(highlights)
    }

    async fn create_highlight(
        &self,
        owner_id: &str,
        highlight: NewHighlight,
    ) -> PortResult<Highlight> {
        let created = Highlight {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            book_id: highlight.book_id,
            chapter: highlight.chapter,
            verse_number: highlight.verse_number,
            color: highlight
                .color
                .unwrap_or_else(|| DEFAULT_HIGHLIGHT_COLOR.to_string()),
            created_at: Utc::now(),
        };
        self.inner.write().await.highlights.push(created.clone());
        Ok(created)
    }

    async fn delete_highlight(&self, owner_id: &str, highlight_id: Uuid) -> PortResult<()> {
        self.inner
            .write()
            .await
            .highlights
            .retain(|h| !(h.id == highlight_id && h.owner_id == owner_id));
        Ok(())
    }

    async fn list_reading_progress(&self, owner_id: &str) -> PortResult<Vec<ReadingProgress>> {
        let inner = self.inner.read().await;
        let owned = inner
            .progress
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned();
        Ok(newest_first(owned, |p| p.completed_at))
    }

    async fn mark_chapter_complete(
        &self,
        owner_id: &str,
        book_id: i32,
        chapter: i32,
    ) -> PortResult<ReadingProgress> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner
            .progress
            .iter()
            .find(|p| p.owner_id == owner_id && p.book_id == book_id && p.chapter == chapter)
        {
            return Ok(existing.clone());
        }
        let created = ReadingProgress {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            book_id,
            chapter,
            completed_at: Utc::now(),
        };
        inner.progress.push(created.clone());
        Ok(created)
    }

    async fn list_prayer_requests(&self, owner_id: &str) -> PortResult<Vec<PrayerRequest>> {
        let inner = self.inner.read().await;
        let owned = inner
            .prayer_requests
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned();
        Ok(newest_first(owned, |p| p.created_at))
    }

    async fn create_prayer_request(
        &self,
        owner_id: &str,
        request: NewPrayerRequest,
    ) -> PortResult<PrayerRequest> {
        let created = PrayerRequest {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            title: request.title,
            description: request.description,
            is_private: request.is_private,
            is_answered: false,
            created_at: Utc::now(),
            answered_at: None,
        };
        self.inner.write().await.prayer_requests.push(created.clone());
        Ok(created)
    }

    async fn get_prayer_request(
        &self,
        owner_id: &str,
        request_id: Uuid,
    ) -> PortResult<PrayerRequest> {
        self.inner
            .read()
            .await
            .prayer_requests
            .iter()
            .find(|p| p.id == request_id && p.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Prayer request {} not found", request_id)))
    }

    async fn set_prayer_answered(
        &self,
        owner_id: &str,
        request_id: Uuid,
        is_answered: bool,
        answered_at: Option<DateTime<Utc>>,
    ) -> PortResult<PrayerRequest> {
        let mut inner = self.inner.write().await;
        let request = inner
            .prayer_requests
            .iter_mut()
            .find(|p| p.id == request_id && p.owner_id == owner_id)
            .ok_or_else(|| PortError::NotFound(format!("Prayer request {} not found", request_id)))?;
        request.is_answered = is_answered;
        request.answered_at = answered_at;
        Ok(request.clone())
    }
}

//=========================================================================================
// `UserStore` and `SessionStore` Trait Implementations
//=========================================================================================

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, user_id: &str) -> PortResult<User> {
        self.inner
            .read()
            .await
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn upsert_user(&self, profile: UserProfile) -> PortResult<User> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let user = inner.users.entry(profile.id.clone()).or_insert_with(|| User {
            id: profile.id.clone(),
            email: None,
            first_name: None,
            last_name: None,
            profile_image_url: None,
            language: "en".to_string(),
            theme: "light".to_string(),
            font_size: 18,
            created_at: now,
            updated_at: now,
        });

        if let Some(email) = profile.email {
            user.email = Some(email);
        }
        if let Some(first_name) = profile.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = profile.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(url) = profile.profile_image_url {
            user.profile_image_url = Some(url);
        }
        if let Some(language) = profile.language {
            user.language = language;
        }
        if let Some(theme) = profile.theme {
            user.theme = theme;
        }
        if let Some(font_size) = profile.font_size {
            user.font_size = font_size;
        }
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn update_preferences(
        &self,
        user_id: &str,
        preferences: UserPreferences,
    ) -> PortResult<User> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;

        if let Some(language) = preferences.language {
            user.language = language;
        }
        if let Some(theme) = preferences.theme {
            user.theme = theme;
        }
        if let Some(font_size) = preferences.font_size {
            user.font_size = font_size;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<String> {
        let inner = self.inner.read().await;
        match inner.sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(user_id.clone()),
            _ => Err(PortError::Unauthorized),
        }
    }
}
