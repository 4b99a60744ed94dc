pub mod canon;
pub mod daily;
pub mod domain;
pub mod ports;
pub mod service;

pub use daily::resolve_daily_verse;
pub use domain::{
    Book, Bookmark, BookmarkEntry, ChapterFilter, DailyVerse, DailyVerseEntry, EnrichedVerse,
    FallbackDailyVerse, Highlight, Language, NewBookmark, NewHighlight, NewPrayerRequest,
    PrayerRequest, PrayerRequestUpdate, ReadingProgress, Testament, User, UserPreferences,
    UserProfile, Verse, VerseRef,
};
pub use ports::{
    AnnotationStore, PortError, PortResult, ReferenceStore, SessionStore, TextProvider,
    UserStore,
};
pub use service::BibleService;
