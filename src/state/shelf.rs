/// Shelves: named, ordered lists of book IDs
///
/// A shelf never owns books; it refers to them by ID so that the
/// collection store stays the single owner.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use super::data::{Book, BookId};

pub type ShelfId = String;

/// How a shelf came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShelfKind {
    /// One per genre, rebuilt from the catalog
    AutoByGenre,
    /// Created by the user
    Manual,
}

/// Missing fields in saved layouts are tolerated; the collection assigns
/// a fresh ID and a default name when restoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelf {
    #[serde(default)]
    pub id: ShelfId,
    #[serde(default)]
    name: String,
    #[serde(default = "manual")]
    pub kind: ShelfKind,
    /// Left-to-right order on the shelf
    #[serde(default)]
    pub book_ids: Vec<BookId>,
}

fn manual() -> ShelfKind {
    ShelfKind::Manual
}

impl Shelf {
    /// Create a shelf; a blank name is replaced by `fallback_name`
    pub fn new(id: impl Into<ShelfId>, name: &str, fallback_name: &str, kind: ShelfKind) -> Self {
        let name = if name.trim().is_empty() { fallback_name } else { name };
        Self {
            id: id.into(),
            name: name.to_string(),
            kind,
            book_ids: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the shelf. Blank names are rejected and the old name kept.
    pub fn rename(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.name = name.to_string();
        true
    }

    /// Same shelf with no books on it
    pub fn emptied(&self) -> Self {
        Self {
            book_ids: Vec::new(),
            ..self.clone()
        }
    }

    pub fn contains(&self, id: BookId) -> bool {
        self.book_ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.book_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book_ids.is_empty()
    }
}

/// One `AutoByGenre` shelf per distinct genre.
///
/// Shelves appear in the order their genre is first seen, and books keep
/// their input order within a shelf.
pub fn build_genre_shelves<B: Borrow<Book>>(books: &[B]) -> Vec<Shelf> {
    let mut shelves: Vec<Shelf> = Vec::new();

    for book in books {
        let book: &Book = book.borrow();
        match shelves.iter_mut().find(|shelf| shelf.name == book.genre) {
            Some(shelf) => shelf.book_ids.push(book.id),
            None => {
                let mut shelf = Shelf {
                    id: format!("genre-{}", shelves.len() + 1),
                    name: book.genre.clone(),
                    kind: ShelfKind::AutoByGenre,
                    book_ids: Vec::new(),
                };
                shelf.book_ids.push(book.id);
                shelves.push(shelf);
            }
        }
    }

    shelves
}

/// Append an empty `Manual` shelf with a fresh ID and return that ID.
/// Existing shelves are not touched.
pub fn create_manual_shelf(shelves: &mut Vec<Shelf>, name: Option<&str>, default_name: &str) -> ShelfId {
    let id = fresh_id(shelves, "manual");
    shelves.push(Shelf::new(id.clone(), name.unwrap_or(default_name), default_name, ShelfKind::Manual));
    id
}

/// First `{prefix}-{n}` not used by any shelf
pub fn fresh_id(shelves: &[Shelf], prefix: &str) -> ShelfId {
    (1..)
        .map(|n| format!("{prefix}-{n}"))
        .find(|candidate| shelves.iter().all(|shelf| &shelf.id != candidate))
        .unwrap_or_else(|| format!("{prefix}-{}", shelves.len() + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn book(id: i64, genre: &str) -> Book {
        Book::new(id, "T", "A", genre, BTreeSet::new(), 200.0, 20.0, None)
    }

    fn sample() -> Vec<Book> {
        vec![
            book(1, "Dystopia"),
            book(2, "Satire"),
            book(3, "Dystopia"),
            book(4, "Romance"),
            book(5, "Satire"),
        ]
    }

    #[test]
    fn test_genre_shelves_keep_first_seen_order() {
        let shelves = build_genre_shelves(&sample());
        let names: Vec<&str> = shelves.iter().map(Shelf::name).collect();
        assert_eq!(names, vec!["Dystopia", "Satire", "Romance"]);
        assert_eq!(shelves[0].book_ids, vec![1, 3]);
        assert_eq!(shelves[1].book_ids, vec![2, 5]);
        assert_eq!(shelves[2].book_ids, vec![4]);
        assert!(shelves.iter().all(|s| s.kind == ShelfKind::AutoByGenre));
    }

    #[test]
    fn test_genre_shelves_are_stable() {
        let books = sample();
        assert_eq!(build_genre_shelves(&books), build_genre_shelves(&books));
    }

    #[test]
    fn test_genre_match_is_exact() {
        let shelves = build_genre_shelves(&[book(1, "Poetry"), book(2, "poetry")]);
        assert_eq!(shelves.len(), 2);
    }

    #[test]
    fn test_manual_shelves_get_unique_ids() {
        let mut shelves = build_genre_shelves(&sample());
        let before = shelves.clone();

        let a = create_manual_shelf(&mut shelves, None, "New shelf");
        let b = create_manual_shelf(&mut shelves, Some("Favourites"), "New shelf");

        assert_ne!(a, b);
        assert_eq!(&shelves[..before.len()], &before[..]);
        assert_eq!(shelves[3].name(), "New shelf");
        assert_eq!(shelves[4].name(), "Favourites");
        assert!(shelves[4].is_empty());
        assert_eq!(shelves[4].kind, ShelfKind::Manual);
    }

    #[test]
    fn test_fresh_id_skips_taken() {
        let shelves = vec![Shelf::new("manual-1", "x", "x", ShelfKind::Manual)];
        assert_eq!(fresh_id(&shelves, "manual"), "manual-2");
    }

    #[test]
    fn test_rename_rejects_blank() {
        let mut shelf = Shelf::new("s", "Classics", "New shelf", ShelfKind::Manual);
        assert!(!shelf.rename("   "));
        assert_eq!(shelf.name(), "Classics");
        assert!(shelf.rename(" To read "));
        assert_eq!(shelf.name(), "To read");
    }

    #[test]
    fn test_blank_name_on_creation_uses_fallback() {
        let shelf = Shelf::new("s", "", "New shelf", ShelfKind::Manual);
        assert_eq!(shelf.name(), "New shelf");
    }
}
