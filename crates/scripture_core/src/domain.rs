//! crates/scripture_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Translation code assumed when a verse does not name one.
pub const DEFAULT_TRANSLATION: &str = "ESV";

/// Color given to a highlight created without one.
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "yellow";

/// Upper bound on the number of verses a single search returns.
pub const SEARCH_RESULT_LIMIT: usize = 50;

//=========================================================================================
// Reference Data
//=========================================================================================

/// The two testaments a canonical book belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Testament {
    Old,
    New,
}

impl Testament {
    pub fn as_str(&self) -> &'static str {
        match self {
            Testament::Old => "old",
            Testament::New => "new",
        }
    }
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Testament {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "old" => Ok(Testament::Old),
            "new" => Ok(Testament::New),
            other => Err(format!("'{}' is not a testament", other)),
        }
    }
}

/// One of the 66 canonical books.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i32,
    pub name: String,
    pub localized_name: Option<String>,
    pub testament: Testament,
    pub chapter_count: i32,
}

/// A single verse of seeded scripture text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub id: String,
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub text: String,
    pub localized_text: Option<String>,
    pub translation: String,
    pub commentary: Option<String>,
}

impl Verse {
    pub fn reference(&self) -> VerseRef {
        VerseRef::new(self.book_id, self.chapter, self.verse_number)
    }
}

/// A (book, chapter, verse) coordinate without any text attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseRef {
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
}

impl VerseRef {
    pub const fn new(book_id: i32, chapter: i32, verse_number: i32) -> Self {
        Self {
            book_id,
            chapter,
            verse_number,
        }
    }
}

/// Which text column a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Tagalog,
}

impl Language {
    /// Maps a language code to a text column. Anything other than `tl` reads English.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some(c) if c.eq_ignore_ascii_case("tl") => Language::Tagalog,
            _ => Language::English,
        }
    }
}

/// The verse picked for a calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyVerse {
    pub id: Uuid,
    pub date: NaiveDate,
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub explanation: Option<String>,
}

impl DailyVerse {
    pub fn reference(&self) -> VerseRef {
        VerseRef::new(self.book_id, self.chapter, self.verse_number)
    }
}

/// A daily verse joined with its book and verse text.
#[derive(Debug, Clone)]
pub struct DailyVerseEntry {
    pub daily_verse: DailyVerse,
    pub book: Book,
    pub verse_text: String,
}

/// The resolver's pick for a date when no daily verse was seeded for it.
#[derive(Debug, Clone)]
pub struct FallbackDailyVerse {
    pub date: NaiveDate,
    pub verse: VerseRef,
    pub book: Book,
    /// Present only when the picked verse has seeded text.
    pub verse_text: Option<String>,
}

/// Verse text and commentary fetched from the external text provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedVerse {
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub text: String,
    pub translation: String,
    pub commentary: Option<String>,
}

//=========================================================================================
// Owner-Scoped Annotations
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub id: Uuid,
    pub owner_id: String,
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn reference(&self) -> VerseRef {
        VerseRef::new(self.book_id, self.chapter, self.verse_number)
    }
}

/// A bookmark joined with its book and the bookmarked verse's text.
#[derive(Debug, Clone)]
pub struct BookmarkEntry {
    pub bookmark: Bookmark,
    pub book: Book,
    pub verse_text: String,
}

#[derive(Debug, Clone)]
pub struct NewBookmark {
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub id: Uuid,
    pub owner_id: String,
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHighlight {
    pub book_id: i32,
    pub chapter: i32,
    pub verse_number: i32,
    pub color: Option<String>,
}

/// Restricts a highlight listing to a single chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterFilter {
    pub book_id: i32,
    pub chapter: i32,
}

/// Marks one chapter as read. At most one exists per (owner, book, chapter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingProgress {
    pub id: Uuid,
    pub owner_id: String,
    pub book_id: i32,
    pub chapter: i32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerRequest {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub is_answered: bool,
    pub created_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPrayerRequest {
    pub title: String,
    pub description: Option<String>,
    pub is_private: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PrayerRequestUpdate {
    pub is_answered: Option<bool>,
}

//=========================================================================================
// Users
//=========================================================================================

// Represents a reader, as issued by the external auth provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
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

/// Incoming user data for an upsert. `None` fields keep whatever is stored.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub language: Option<String>,
    pub theme: Option<String>,
    pub font_size: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPreferences {
    pub language: Option<String>,
    pub theme: Option<String>,
    pub font_size: Option<i32>,
}
