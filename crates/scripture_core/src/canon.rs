//! crates/scripture_core/src/canon.rs
//!
//! The fixed table of the 66 canonical books. Ids are the 1-based position in
//! `CANON`. Used to seed reference data and to translate between the text
//! provider's book names and canonical ids.

use crate::domain::{Book, Testament};

/// A static row of the canonical book table.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalBook {
    pub name: &'static str,
    pub localized_name: &'static str,
    pub testament: Testament,
    pub chapter_count: i32,
}

const fn old(name: &'static str, localized_name: &'static str, chapter_count: i32) -> CanonicalBook {
    CanonicalBook {
        name,
        localized_name,
        testament: Testament::Old,
        chapter_count,
    }
}

const fn new(name: &'static str, localized_name: &'static str, chapter_count: i32) -> CanonicalBook {
    CanonicalBook {
        name,
        localized_name,
        testament: Testament::New,
        chapter_count,
    }
}

pub const CANON: [CanonicalBook; 66] = [
    old("Genesis", "Genesis", 50),
    old("Exodus", "Exodo", 40),
    old("Leviticus", "Levitico", 27),
    old("Numbers", "Mga Bilang", 36),
    old("Deuteronomy", "Deuteronomio", 34),
    old("Joshua", "Josue", 24),
    old("Judges", "Mga Hukom", 21),
    old("Ruth", "Ruth", 4),
    old("1 Samuel", "1 Samuel", 31),
    old("2 Samuel", "2 Samuel", 24),
    old("1 Kings", "1 Mga Hari", 22),
    old("2 Kings", "2 Mga Hari", 25),
    old("1 Chronicles", "1 Mga Cronica", 29),
    old("2 Chronicles", "2 Mga Cronica", 36),
    old("Ezra", "Ezra", 10),
    old("Nehemiah", "Nehemias", 13),
    old("Esther", "Ester", 10),
    old("Job", "Job", 42),
    old("Psalms", "Mga Awit", 150),
    old("Proverbs", "Mga Kawikaan", 31),
    old("Ecclesiastes", "Mangangaral", 12),
    old("Song of Solomon", "Awit ni Solomon", 8),
    old("Isaiah", "Isaias", 66),
    old("Jeremiah", "Jeremias", 52),
    old("Lamentations", "Mga Panaghoy", 5),
    old("Ezekiel", "Ezekiel", 48),
    old("Daniel", "Daniel", 12),
    old("Hosea", "Oseas", 14),
    old("Joel", "Joel", 3),
    old("Amos", "Amos", 9),
    old("Obadiah", "Obadias", 1),
    old("Jonah", "Jonas", 4),
    old("Micah", "Miqueas", 7),
    old("Nahum", "Nahum", 3),
    old("Habakkuk", "Habacuc", 3),
    old("Zephaniah", "Sofonias", 3),
    old("Haggai", "Hageo", 2),
    old("Zechariah", "Zacarias", 14),
    old("Malachi", "Malaquias", 4),
    new("Matthew", "Mateo", 28),
    new("Mark", "Marcos", 16),
    new("Luke", "Lucas", 24),
    new("John", "Juan", 21),
    new("Acts", "Mga Gawa", 28),
    new("Romans", "Mga Taga-Roma", 16),
    new("1 Corinthians", "1 Mga Taga-Corinto", 16),
    new("2 Corinthians", "2 Mga Taga-Corinto", 13),
    new("Galatians", "Mga Taga-Galacia", 6),
    new("Ephesians", "Mga Taga-Efeso", 6),
    new("Philippians", "Mga Taga-Filipos", 4),
    new("Colossians", "Mga Taga-Colosas", 4),
    new("1 Thessalonians", "1 Mga Taga-Tesalonica", 5),
    new("2 Thessalonians", "2 Mga Taga-Tesalonica", 3),
    new("1 Timothy", "1 Timoteo", 6),
    new("2 Timothy", "2 Timoteo", 4),
    new("Titus", "Tito", 3),
    new("Philemon", "Filemon", 1),
    new("Hebrews", "Mga Hebreo", 13),
    new("James", "Santiago", 5),
    new("1 Peter", "1 Pedro", 5),
    new("2 Peter", "2 Pedro", 3),
    new("1 John", "1 Juan", 5),
    new("2 John", "2 Juan", 1),
    new("3 John", "3 Juan", 1),
    new("Jude", "Judas", 1),
    new("Revelation", "Pahayag", 22),
];

/// Canonical name for a book id, if the id is in 1..=66.
pub fn book_name(book_id: i32) -> Option<&'static str> {
    entry(book_id).map(|b| b.name)
}

/// Canonical id for a book name. Matching ignores case and surrounding whitespace.
pub fn book_id(name: &str) -> Option<i32> {
    let name = name.trim();
    CANON
        .iter()
        .position(|b| b.name.eq_ignore_ascii_case(name))
        .map(|idx| idx as i32 + 1)
}

pub fn entry(book_id: i32) -> Option<&'static CanonicalBook> {
    usize::try_from(book_id)
        .ok()
        .and_then(|id| id.checked_sub(1))
        .and_then(|idx| CANON.get(idx))
}

/// The full table as domain books, ordered by id.
pub fn books() -> Vec<Book> {
    CANON
        .iter()
        .enumerate()
        .map(|(idx, b)| Book {
            id: idx as i32 + 1,
            name: b.name.to_string(),
            localized_name: Some(b.localized_name.to_string()),
            testament: b.testament,
            chapter_count: b.chapter_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_ids_round_trip_for_every_book() {
        for id in 1..=66 {
            let name = book_name(id).unwrap();
            assert_eq!(book_id(name), Some(id), "{name}");
        }
    }

    #[test]
    fn out_of_range_ids_have_no_name() {
        assert_eq!(book_name(0), None);
        assert_eq!(book_name(67), None);
        assert_eq!(book_name(-3), None);
    }

    #[test]
    fn lookup_by_name_ignores_case() {
        assert_eq!(book_id("song of solomon"), Some(22));
        assert_eq!(book_id(" 1 JOHN "), Some(62));
        assert_eq!(book_id("Maccabees"), None);
    }

    #[test]
    fn testaments_split_at_matthew() {
        let books = books();
        assert_eq!(books.len(), 66);
        assert!(books[..39].iter().all(|b| b.testament == Testament::Old));
        assert!(books[39..].iter().all(|b| b.testament == Testament::New));
        assert_eq!(books[18].name, "Psalms");
        assert_eq!(books[18].chapter_count, 150);
        assert_eq!(books[64].name, "Jude");
    }
}
