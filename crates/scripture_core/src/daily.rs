//! crates/scripture_core/src/daily.rs
//!
//! Offline "verse of the day" selection, used when no daily verse was seeded
//! for a date. Pure: the date is always passed in.

use chrono::{Datelike, NaiveDate};

use crate::domain::VerseRef;

/// Built-in pool the fallback cycles through.
pub const DEFAULT_POOL: [VerseRef; 5] = [
    VerseRef::new(43, 3, 16), // John 3:16
    VerseRef::new(45, 8, 28), // Romans 8:28
    VerseRef::new(50, 4, 13), // Philippians 4:13
    VerseRef::new(19, 23, 1), // Psalms 23:1
    VerseRef::new(20, 3, 5),  // Proverbs 3:5
];

/// Picks `pool[day_of_year % pool.len()]`, with January 1st as day 1.
///
/// Returns `None` for an empty pool.
pub fn resolve_daily_verse(date: NaiveDate, pool: &[VerseRef]) -> Option<VerseRef> {
    if pool.is_empty() {
        return None;
    }
    let day_of_year = date.ordinal() as usize;
    pool.get(day_of_year % pool.len()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_date_same_pick() {
        let d = date(2024, 7, 4);
        assert_eq!(
            resolve_daily_verse(d, &DEFAULT_POOL),
            resolve_daily_verse(d, &DEFAULT_POOL)
        );
    }

    #[test]
    fn january_first_is_day_one() {
        assert_eq!(
            resolve_daily_verse(date(2025, 1, 1), &DEFAULT_POOL),
            Some(DEFAULT_POOL[1])
        );
        assert_eq!(
            resolve_daily_verse(date(2025, 1, 5), &DEFAULT_POOL),
            Some(DEFAULT_POOL[0])
        );
    }

    #[test]
    fn consecutive_days_walk_the_pool() {
        let picks: Vec<_> = (1..=5)
            .map(|d| resolve_daily_verse(date(2025, 3, d), &DEFAULT_POOL).unwrap())
            .collect();
        let mut unique = picks.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), DEFAULT_POOL.len());
    }

    #[test]
    fn cycles_yearly_by_day_of_year() {
        // Same day-of-year in consecutive non-leap years.
        assert_eq!(
            resolve_daily_verse(date(2025, 6, 10), &DEFAULT_POOL),
            resolve_daily_verse(date(2026, 6, 10), &DEFAULT_POOL)
        );
        // Dec 31 of a leap year is day 366; day 1 of the next year differs by 365 = 0 mod 5.
        assert_eq!(
            resolve_daily_verse(date(2024, 12, 31), &DEFAULT_POOL),
            resolve_daily_verse(date(2025, 1, 1), &DEFAULT_POOL)
        );
    }

    #[test]
    fn empty_pool_yields_nothing() {
        assert_eq!(resolve_daily_verse(date(2025, 1, 1), &[]), None);
    }

    #[test]
    fn single_entry_pool_always_wins() {
        let only = VerseRef::new(1, 1, 1);
        assert_eq!(resolve_daily_verse(date(2025, 9, 9), &[only]), Some(only));
    }
}
