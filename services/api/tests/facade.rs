//! Behaviour of `BibleService` over the in-memory store.

use api_lib::adapters::MemoryStore;
use async_trait::async_trait;
use chrono::NaiveDate;
use scripture_core::domain::{
    Book, DailyVerse, EnrichedVerse, Language, NewBookmark, NewHighlight, NewPrayerRequest, PrayerRequestUpdate,
    Testament, UserPreferences, UserProfile, Verse, VerseRef,
};
use scripture_core::ports::{PortError, PortResult, TextProvider};
use scripture_core::service::BibleService;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const OWNER_A: &str = "owner-a";
const OWNER_B: &str = "owner-b";

fn service(store: &Arc<MemoryStore>) -> BibleService {
    BibleService::new(store.clone(), store.clone(), store.clone())
}

fn verse(book_id: i32, chapter: i32, verse_number: i32, text: &str) -> Verse {
    Verse {
        id: format!("{}-{}-{}-ESV", book_id, chapter, verse_number),
        book_id,
        chapter,
        verse_number,
        text: text.to_string(),
        localized_text: None,
        translation: "ESV".to_string(),
        commentary: None,
    }
}

fn bookmark(book_id: i32, chapter: i32, verse_number: i32) -> NewBookmark {
    NewBookmark {
        book_id,
        chapter,
        verse_number,
        note: None,
    }
}

fn highlight(book_id: i32, chapter: i32, verse_number: i32) -> NewHighlight {
    NewHighlight {
        book_id,
        chapter,
        verse_number,
        color: None,
    }
}

async fn genesis_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_book(Book {
            id: 1,
            name: "Genesis".to_string(),
            localized_name: Some("Genesis".to_string()),
            testament: Testament::Old,
            chapter_count: 50,
        })
        .await;
    store
        .insert_verse(verse(1, 1, 1, "In the beginning..."))
        .await
        .unwrap();
    store
}

//=========================================================================================
// Reference Data
//=========================================================================================

#[tokio::test]
async fn genesis_bookmark_is_joined_with_book_and_text() {
    let store = genesis_store().await;
    let bible = service(&store);

    let verses = bible.list_verses(1, 1).await.unwrap();
    assert_eq!(verses.len(), 1);
    assert_eq!(verses[0].text, "In the beginning...");

    bible
        .create_bookmark(OWNER_A, bookmark(1, 1, 1))
        .await
        .unwrap();
    let entries = bible.list_bookmarks(OWNER_A).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].book.name, "Genesis");
    assert_eq!(entries[0].verse_text, "In the beginning...");
}

#[tokio::test]
async fn verses_come_back_in_verse_order() {
    let store = genesis_store().await;
    for n in [5, 3, 2, 4] {
        store
            .insert_verse(verse(1, 1, n, &format!("verse {}", n)))
            .await
            .unwrap();
    }
    let numbers: Vec<i32> = service(&store)
        .list_verses(1, 1)
        .await
        .unwrap()
        .iter()
        .map(|v| v.verse_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let store = Arc::new(MemoryStore::with_canon());
    let err = service(&store).get_book(67).await.unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
    assert_eq!(service(&store).get_book(43).await.unwrap().name, "John");
}

#[tokio::test]
async fn blank_search_is_rejected() {
    let store = genesis_store().await;
    let bible = service(&store);
    for query in ["", "   "] {
        let err = bible
            .search_verses(query, Language::English)
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
    }
}

#[tokio::test]
async fn search_is_capped_at_fifty() {
    let store = genesis_store().await;
    for n in 2..=74 {
        store
            .insert_verse(verse(1, 2, n, "and God saw that it was good"))
            .await
            .unwrap();
    }
    let results = service(&store)
        .search_verses("GOD SAW", Language::English)
        .await
        .unwrap();
    assert_eq!(results.len(), 50);
    assert_eq!(results[0].verse_number, 2);
}

#[tokio::test]
async fn tagalog_search_reads_localized_text() {
    let store = genesis_store().await;
    let mut localized = verse(1, 1, 2, "And the earth was without form");
    localized.localized_text = Some("At ang lupa ay walang anyo".to_string());
    store.insert_verse(localized).await.unwrap();

    let bible = service(&store);
    let tl = bible
        .search_verses("lupa", Language::Tagalog)
        .await
        .unwrap();
    assert_eq!(tl.len(), 1);
    let en = bible
        .search_verses("lupa", Language::English)
        .await
        .unwrap();
    assert!(en.is_empty());
}

//=========================================================================================
// Annotations
//=========================================================================================

#[tokio::test]
async fn bookmark_on_unseeded_verse_is_left_out_of_the_listing() {
    let store = genesis_store().await;
    let bible = service(&store);
    bible
        .create_bookmark(OWNER_A, bookmark(1, 1, 999))
        .await
        .unwrap();
    bible
        .create_bookmark(OWNER_A, bookmark(1, 1, 1))
        .await
        .unwrap();

    let entries = bible.list_bookmarks(OWNER_A).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].bookmark.verse_number, 1);
}

#[tokio::test]
async fn bookmark_on_unknown_book_is_rejected() {
    let store = genesis_store().await;
    let err = service(&store)
        .create_bookmark(OWNER_A, bookmark(2, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
}

#[tokio::test]
async fn same_verse_can_be_bookmarked_twice() {
    let store = genesis_store().await;
    let bible = service(&store);
    let first = bible
        .create_bookmark(OWNER_A, bookmark(1, 1, 1))
        .await
        .unwrap();
    let second = bible
        .create_bookmark(OWNER_A, bookmark(1, 1, 1))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(bible.list_bookmarks(OWNER_A).await.unwrap().len(), 2);
}

#[tokio::test]
async fn owners_never_see_or_delete_each_others_bookmarks() {
    let store = genesis_store().await;
    let bible = service(&store);
    let theirs = bible
        .create_bookmark(OWNER_B, bookmark(1, 1, 1))
        .await
        .unwrap();

    assert!(bible.list_bookmarks(OWNER_A).await.unwrap().is_empty());

    bible.delete_bookmark(OWNER_A, theirs.id).await.unwrap();
    let still_there = bible.list_bookmarks(OWNER_B).await.unwrap();
    assert_eq!(still_there.len(), 1);
    assert_eq!(still_there[0].bookmark.id, theirs.id);

    bible.delete_bookmark(OWNER_B, theirs.id).await.unwrap();
    assert!(bible.list_bookmarks(OWNER_B).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_an_unknown_bookmark_succeeds() {
    let store = genesis_store().await;
    service(&store)
        .delete_bookmark(OWNER_A, Uuid::new_v4())
        .await
        .unwrap();
}

#[tokio::test]
async fn highlight_color_defaults_to_yellow() {
    let store = genesis_store().await;
    let bible = service(&store);
    let plain = bible
        .create_highlight(OWNER_A, highlight(1, 1, 1))
        .await
        .unwrap();
    assert_eq!(plain.color, "yellow");

    let mut blue = highlight(1, 1, 2);
    blue.color = Some("blue".to_string());
    assert_eq!(
        bible.create_highlight(OWNER_A, blue).await.unwrap().color,
        "blue"
    );
}

#[tokio::test]
async fn highlight_filter_needs_both_book_and_chapter() {
    let store = genesis_store().await;
    let bible = service(&store);
    bible
        .create_highlight(OWNER_A, highlight(1, 1, 1))
        .await
        .unwrap();
    bible
        .create_highlight(OWNER_A, highlight(1, 2, 1))
        .await
        .unwrap();
    bible
        .create_highlight(OWNER_B, highlight(1, 1, 1))
        .await
        .unwrap();

    let chapter_one = bible
        .list_highlights(OWNER_A, Some(1), Some(1))
        .await
        .unwrap();
    assert_eq!(chapter_one.len(), 1);
    assert_eq!(chapter_one[0].chapter, 1);

    // A lone bookId or chapter is ignored.
    assert_eq!(
        bible.list_highlights(OWNER_A, Some(1), None).await.unwrap().len(),
        2
    );
    assert_eq!(
        bible.list_highlights(OWNER_A, None, Some(2)).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn deleting_a_foreign_highlight_is_a_no_op() {
    let store = genesis_store().await;
    let bible = service(&store);
    let theirs = bible
        .create_highlight(OWNER_B, highlight(1, 1, 1))
        .await
        .unwrap();
    bible.delete_highlight(OWNER_A, theirs.id).await.unwrap();
    assert_eq!(
        bible.list_highlights(OWNER_B, None, None).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn marking_a_chapter_twice_keeps_one_record() {
    let store = genesis_store().await;
    let bible = service(&store);
    let first = bible.mark_chapter_complete(OWNER_A, 1, 1).await.unwrap();
    let second = bible.mark_chapter_complete(OWNER_A, 1, 1).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.completed_at, second.completed_at);
    assert_eq!(bible.list_reading_progress(OWNER_A).await.unwrap().len(), 1);

    let other = bible.mark_chapter_complete(OWNER_B, 1, 1).await.unwrap();
    assert_ne!(other.id, first.id);
}

#[tokio::test]
async fn concurrent_marks_still_store_one_record() {
    let store = genesis_store().await;
    let bible = service(&store);
    let (a, b) = tokio::join!(
        bible.mark_chapter_complete(OWNER_A, 1, 3),
        bible.mark_chapter_complete(OWNER_A, 1, 3)
    );
    assert_eq!(a.unwrap().id, b.unwrap().id);
    assert_eq!(bible.list_reading_progress(OWNER_A).await.unwrap().len(), 1);
}

//=========================================================================================
// Prayer Requests
//=========================================================================================

fn healing() -> NewPrayerRequest {
    NewPrayerRequest {
        title: "Healing".to_string(),
        description: None,
        is_private: false,
    }
}

fn answered(value: bool) -> PrayerRequestUpdate {
    PrayerRequestUpdate {
        is_answered: Some(value),
    }
}

#[tokio::test]
async fn answering_a_prayer_request_stamps_it() {
    let store = genesis_store().await;
    let bible = service(&store);
    let created = bible.create_prayer_request(OWNER_A, healing()).await.unwrap();
    assert!(!created.is_answered);
    assert!(created.answered_at.is_none());

    let updated = bible
        .update_prayer_request(OWNER_A, created.id, answered(true))
        .await
        .unwrap();
    assert!(updated.is_answered);
    assert!(updated.answered_at.is_some());

    let again = bible
        .update_prayer_request(OWNER_A, created.id, answered(true))
        .await
        .unwrap();
    assert_eq!(again.answered_at, updated.answered_at);

    let reopened = bible
        .update_prayer_request(OWNER_A, created.id, answered(false))
        .await
        .unwrap();
    assert!(!reopened.is_answered);
    assert!(reopened.answered_at.is_none());
}

#[tokio::test]
async fn updating_someone_elses_prayer_request_fails() {
    let store = genesis_store().await;
    let bible = service(&store);
    let created = bible.create_prayer_request(OWNER_A, healing()).await.unwrap();

    let err = bible
        .update_prayer_request(OWNER_B, created.id, answered(true))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));

    let requests = bible.list_prayer_requests(OWNER_A).await.unwrap();
    assert!(!requests[0].is_answered);
    assert!(requests[0].answered_at.is_none());
}

#[tokio::test]
async fn empty_update_returns_the_request_unchanged() {
    let store = genesis_store().await;
    let bible = service(&store);
    let created = bible.create_prayer_request(OWNER_A, healing()).await.unwrap();
    let same = bible
        .update_prayer_request(OWNER_A, created.id, PrayerRequestUpdate::default())
        .await
        .unwrap();
    assert_eq!(same.id, created.id);
    assert!(!same.is_answered);
}

#[tokio::test]
async fn blank_prayer_title_is_rejected() {
    let store = genesis_store().await;
    let mut request = healing();
    request.title = "  ".to_string();
    let err = service(&store)
        .create_prayer_request(OWNER_A, request)
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Validation(_)));
}

//=========================================================================================
// Daily Verse
//=========================================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn daily_verse_is_joined_with_book_and_text() {
    let store = genesis_store().await;
    store
        .insert_daily_verse(DailyVerse {
            id: Uuid::new_v4(),
            date: date(2024, 3, 1),
            book_id: 1,
            chapter: 1,
            verse_number: 1,
            explanation: Some("Creation".to_string()),
        })
        .await;

    let entry = service(&store)
        .get_daily_verse(date(2024, 3, 1))
        .await
        .unwrap();
    assert_eq!(entry.book.name, "Genesis");
    assert_eq!(entry.verse_text, "In the beginning...");
}

#[tokio::test]
async fn daily_verse_is_not_found_without_a_row_or_text() {
    let store = genesis_store().await;
    let bible = service(&store);
    assert!(matches!(
        bible.get_daily_verse(date(2024, 3, 2)).await.unwrap_err(),
        PortError::NotFound(_)
    ));

    store
        .insert_daily_verse(DailyVerse {
            id: Uuid::new_v4(),
            date: date(2024, 3, 2),
            book_id: 1,
            chapter: 9,
            verse_number: 9,
            explanation: None,
        })
        .await;
    assert!(matches!(
        bible.get_daily_verse(date(2024, 3, 2)).await.unwrap_err(),
        PortError::NotFound(_)
    ));
}

#[tokio::test]
async fn fallback_daily_verse_cycles_through_the_pool() {
    let store = Arc::new(MemoryStore::with_canon());
    store
        .insert_verse(verse(43, 3, 16, "For God so loved the world"))
        .await
        .unwrap();
    let pool = vec![VerseRef::new(1, 1, 1), VerseRef::new(43, 3, 16)];
    let bible = service(&store).with_daily_pool(pool);

    // 2024-01-01 is day 1 of the year.
    let pick = bible.daily_verse_fallback(date(2024, 1, 1)).await.unwrap();
    assert_eq!(pick.book.name, "John");
    assert_eq!(pick.verse_text.as_deref(), Some("For God so loved the world"));

    let next = bible.daily_verse_fallback(date(2024, 1, 2)).await.unwrap();
    assert_eq!(next.verse, VerseRef::new(1, 1, 1));
    assert!(next.verse_text.is_none());
}

#[tokio::test]
async fn commentary_without_provider_is_unavailable() {
    let store = genesis_store().await;
    let err = service(&store)
        .verse_commentary(1, 1, 1, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::ProviderUnavailable(_)));
}

/// Hands back a fixed chapter in scrambled order and remembers what was asked.
#[derive(Default)]
struct CannedProvider {
    requests: Mutex<Vec<(String, i32, String)>>,
}

#[async_trait]
impl TextProvider for CannedProvider {
    async fn fetch_verse(
        &self,
        book_name: &str,
        chapter: i32,
        verse_number: i32,
        translation: &str,
    ) -> PortResult<EnrichedVerse> {
        Err(PortError::ProviderUnavailable(format!(
            "{} {}:{} ({}) not canned",
            book_name, chapter, verse_number, translation
        )))
    }

    async fn fetch_chapter(
        &self,
        book_name: &str,
        chapter: i32,
        translation: &str,
    ) -> PortResult<Vec<EnrichedVerse>> {
        self.requests
            .lock()
            .await
            .push((book_name.to_string(), chapter, translation.to_string()));
        Ok([2, 1]
            .into_iter()
            .map(|verse_number| EnrichedVerse {
                book_id: 19,
                chapter,
                verse_number,
                text: format!("verse {}", verse_number),
                translation: translation.to_string(),
                commentary: None,
            })
            .collect())
    }
}

#[tokio::test]
async fn chapter_commentary_asks_the_provider_by_book_name() {
    let store = Arc::new(MemoryStore::with_canon());
    let provider = Arc::new(CannedProvider::default());
    let bible = service(&store).with_text_provider(provider.clone());

    let verses = bible.chapter_commentary(19, 23, None).await.unwrap();
    let numbers: Vec<i32> = verses.iter().map(|v| v.verse_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(
        provider.requests.lock().await.as_slice(),
        &[("Psalms".to_string(), 23, "ESV".to_string())]
    );

    let err = bible.chapter_commentary(70, 1, None).await.unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
}

#[tokio::test]
async fn marking_a_chapter_of_an_unknown_book_is_not_found() {
    let store = Arc::new(MemoryStore::with_canon());
    let bible = service(&store);
    let err = bible
        .mark_chapter_complete(OWNER_A, 999, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
    assert!(bible.list_reading_progress(OWNER_A).await.unwrap().is_empty());
}

//=========================================================================================
// Users
//=========================================================================================

#[tokio::test]
async fn upsert_keeps_fields_that_were_not_sent() {
    let store = genesis_store().await;
    let bible = service(&store);
    bible
        .upsert_user(UserProfile {
            id: "u1".to_string(),
            email: Some("reader@example.com".to_string()),
            first_name: Some("Ana".to_string()),
            ..UserProfile::default()
        })
        .await
        .unwrap();

    let user = bible
        .upsert_user(UserProfile {
            id: "u1".to_string(),
            last_name: Some("Cruz".to_string()),
            ..UserProfile::default()
        })
        .await
        .unwrap();
    assert_eq!(user.email.as_deref(), Some("reader@example.com"));
    assert_eq!(user.first_name.as_deref(), Some("Ana"));
    assert_eq!(user.last_name.as_deref(), Some("Cruz"));
    assert_eq!(bible.get_user("u1").await.unwrap().id, "u1");
}

#[tokio::test]
async fn preferences_update_only_what_is_given() {
    let store = genesis_store().await;
    let bible = service(&store);
    let created = bible
        .upsert_user(UserProfile {
            id: "u1".to_string(),
            ..UserProfile::default()
        })
        .await
        .unwrap();

    let updated = bible
        .update_user_preferences(
            "u1",
            UserPreferences {
                theme: Some("dark".to_string()),
                ..UserPreferences::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.theme, "dark");
    assert_eq!(updated.language, created.language);
    assert_eq!(updated.font_size, created.font_size);

    let err = bible
        .update_user_preferences(
            "u1",
            UserPreferences {
                font_size: Some(0),
                ..UserPreferences::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Validation(_)));
}

#[tokio::test]
async fn preferences_for_an_unknown_user_are_not_found() {
    let store = genesis_store().await;
    let err = service(&store)
        .update_user_preferences("ghost", UserPreferences::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
}
