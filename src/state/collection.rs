/// The book collection and its shelves
///
/// Books live in a single store keyed by ID; shelves only hold IDs.
/// All color and layout changes go through this type, while the
/// ordering and gradient algorithms only ever read from it.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use log::{debug, info, warn};

use super::data::{Book, BookId};
use super::shelf::{self, Shelf, ShelfId, ShelfKind};
use super::snapshot::{BookColorEntry, LayoutEntry, Snapshot};
use crate::color::HexColor;
use crate::config::Config;
use crate::engine::gradient::{compute_shelf_colors, ShelfColors};
use crate::engine::sequencer::{sort, SortMode};
use crate::error::{BookshelfError, Result};

/// What a restore had to leave out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub shelves: usize,
    /// Layout entries naming books that are not in the collection
    pub unknown_book_ids: Vec<BookId>,
    /// Color entries that were skipped (unknown book or unreadable color)
    pub dropped_colors: Vec<BookId>,
}

#[derive(Debug, Clone)]
pub struct Collection {
    books: BTreeMap<BookId, Book>,
    /// Catalog order
    order: Vec<BookId>,
    shelves: Vec<Shelf>,
    config: Config,
}

impl Collection {
    /// Build a collection and spread the books round-robin over
    /// `config.shelf_count` shelves. Duplicate IDs keep the first book.
    pub fn new(books: Vec<Book>, config: Config) -> Self {
        let mut store = BTreeMap::new();
        let mut order = Vec::with_capacity(books.len());

        for book in books {
            if store.contains_key(&book.id) {
                warn!("Duplicate book id {} ({:?}), keeping the first", book.id, book.title);
                continue;
            }
            order.push(book.id);
            store.insert(book.id, book);
        }

        let mut collection = Collection {
            books: store,
            order,
            shelves: Vec::new(),
            config,
        };
        collection.distribute_round_robin();

        info!(
            "Collection ready: {} books on {} shelves",
            collection.books.len(),
            collection.shelves.len()
        );
        collection
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn book(&self, id: BookId) -> Option<&Book> {
        self.books.get(&id)
    }

    /// Books in catalog order
    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.order.iter().filter_map(|id| self.books.get(id))
    }

    /// Shelves top to bottom
    pub fn shelves(&self) -> &[Shelf] {
        &self.shelves
    }

    pub fn shelf(&self, id: &str) -> Option<&Shelf> {
        self.shelves.iter().find(|shelf| shelf.id == id)
    }

    fn shelf_index(&self, id: &str) -> Option<usize> {
        self.shelves.iter().position(|shelf| shelf.id == id)
    }

    // ========== Layout ==========

    /// Initial layout: book i goes to shelf i % shelf_count
    pub fn distribute_round_robin(&mut self) {
        let count = self.config.shelf_count.max(1);
        let mut shelves = self.reusable_shelves(count);
        for (i, id) in self.order.iter().enumerate() {
            shelves[i % count].book_ids.push(*id);
        }
        self.shelves = shelves;
    }

    /// Replace every shelf with one shelf per genre
    pub fn rebuild_genre_shelves(&mut self) {
        let books: Vec<&Book> = self.books().collect();
        self.shelves = shelf::build_genre_shelves(&books);
        debug!("Rebuilt {} genre shelves", self.shelves.len());
    }

    /// All books in the order `mode` gives, without touching the layout
    pub fn sorted(&self, mode: SortMode) -> Vec<&Book> {
        let books: Vec<&Book> = self.books().collect();
        sort(&books, mode)
    }

    /// Sort the whole collection and fill the shelves in order, each
    /// taking ceil(n / shelf_count) books. Shelves keep their IDs and names.
    pub fn apply_sort(&mut self, mode: SortMode) {
        let count = self.config.shelf_count.max(1);
        let sorted: Vec<BookId> = self.sorted(mode).iter().map(|b| b.id).collect();
        let capacity = sorted.len().div_ceil(count).max(1);

        let mut shelves = self.reusable_shelves(count);
        for (i, id) in sorted.into_iter().enumerate() {
            let index = (i / capacity).min(shelves.len() - 1);
            shelves[index].book_ids.push(id);
        }
        self.shelves = shelves;
        info!("Sorted {} books by {} onto {} shelves", self.books.len(), mode, count);
    }

    /// Current shelves emptied, topped up with new manual ones to at least `count`
    fn reusable_shelves(&self, count: usize) -> Vec<Shelf> {
        let mut shelves: Vec<Shelf> = self
            .shelves
            .iter()
            .map(Shelf::emptied)
            .collect();
        while shelves.len() < count {
            let name = format!("Shelf {}", shelves.len() + 1);
            shelf::create_manual_shelf(&mut shelves, Some(&name), &self.config.manual_shelf_name);
        }
        shelves
    }

    /// Append an empty manual shelf
    pub fn create_manual_shelf(&mut self, name: Option<&str>) -> ShelfId {
        let id = shelf::create_manual_shelf(&mut self.shelves, name, &self.config.manual_shelf_name);
        debug!("Created shelf {}", id);
        id
    }

    /// Rename a shelf; blank names are rejected
    pub fn rename_shelf(&mut self, id: &str, name: &str) -> bool {
        match self.shelves.iter_mut().find(|shelf| shelf.id == id) {
            Some(shelf) => shelf.rename(name),
            None => false,
        }
    }

    /// Move the shelf at `from` to position `to` (clamped)
    pub fn reorder_shelves(&mut self, from: usize, to: usize) -> bool {
        if from >= self.shelves.len() {
            return false;
        }
        let shelf = self.shelves.remove(from);
        let to = to.min(self.shelves.len());
        self.shelves.insert(to, shelf);
        true
    }

    /// Replace a shelf's book order as arranged by the caller.
    ///
    /// IDs are stored as given, even ones the collection does not know;
    /// those are skipped when coloring.
    pub fn set_shelf_order(&mut self, id: &str, book_ids: Vec<BookId>) -> bool {
        match self.shelves.iter_mut().find(|shelf| shelf.id == id) {
            Some(shelf) => {
                shelf.book_ids = book_ids;
                true
            }
            None => false,
        }
    }

    /// Move a book to `index` on shelf `to` (clamped to the shelf length),
    /// taking it off whatever shelf held it. `index` counts the target
    /// shelf's books without the one being moved.
    ///
    /// Returns the shelves whose colors need recomputing: the source and
    /// target shelf, or nothing if the move was not possible.
    pub fn move_book(&mut self, book_id: BookId, to: &str, index: usize) -> Vec<ShelfId> {
        if !self.books.contains_key(&book_id) {
            return Vec::new();
        }
        let Some(target) = self.shelf_index(to) else {
            return Vec::new();
        };

        let mut affected = Vec::new();
        if let Some(source) = self.shelves.iter().position(|shelf| shelf.contains(book_id)) {
            let shelf = &mut self.shelves[source];
            if let Some(pos) = shelf.book_ids.iter().position(|id| *id == book_id) {
                shelf.book_ids.remove(pos);
            }
            if source != target {
                affected.push(shelf.id.clone());
            }
        }

        let shelf = &mut self.shelves[target];
        let index = index.min(shelf.book_ids.len());
        shelf.book_ids.insert(index, book_id);
        affected.push(shelf.id.clone());
        affected
    }

    // ========== Colors ==========

    /// Make a book an anchor with the given color string
    pub fn set_user_color(&mut self, id: BookId, color: &str) -> Result<bool> {
        let color = HexColor::parse(color).map_err(|source| BookshelfError::InvalidColor {
            input: color.to_string(),
            source,
        })?;
        Ok(self.set_user_hex(id, color))
    }

    pub fn set_user_hex(&mut self, id: BookId, color: HexColor) -> bool {
        self.update_book(id, |book| book.with_user_color(color))
    }

    /// Remove a book's explicit color
    pub fn clear_user_color(&mut self, id: BookId) -> bool {
        self.update_book(id, Book::without_user_color)
    }

    /// Restore a book's catalog color (or none if it had none)
    pub fn reset_user_color(&mut self, id: BookId) -> bool {
        self.update_book(id, Book::with_base_color)
    }

    fn update_book(&mut self, id: BookId, change: impl FnOnce(Book) -> Book) -> bool {
        match self.books.get_mut(&id) {
            Some(slot) => {
                *slot = change(slot.clone());
                true
            }
            None => {
                warn!("No book with id {}", id);
                false
            }
        }
    }

    /// A shelf's books in order; IDs missing from the store are skipped
    pub fn resolve(&self, shelf: &Shelf) -> Vec<&Book> {
        shelf
            .book_ids
            .iter()
            .filter_map(|id| {
                let book = self.books.get(id);
                if book.is_none() {
                    warn!("Shelf {} lists unknown book {}, skipping", shelf.id, id);
                }
                book
            })
            .collect()
    }

    /// Spine colors for one shelf
    pub fn shelf_colors(&self, id: &str) -> Option<ShelfColors> {
        self.shelf(id).map(|shelf| compute_shelf_colors(&self.resolve(shelf)))
    }

    /// Spine colors for every shelf, top to bottom
    pub fn all_shelf_colors(&self) -> Vec<(ShelfId, ShelfColors)> {
        self.shelves
            .iter()
            .map(|shelf| (shelf.id.clone(), compute_shelf_colors(&self.resolve(shelf))))
            .collect()
    }

    // ========== Save / restore ==========

    /// Current layout and explicit colors
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            layout: Some(self.shelves.iter().cloned().map(LayoutEntry::Shelf).collect()),
            book_colors: self
                .books()
                .map(|book| BookColorEntry {
                    id: book.id,
                    color: book.display_color().map(|c| c.to_hex()),
                })
                .collect(),
            saved_at: Some(Utc::now()),
        }
    }

    /// Parse and apply a saved snapshot. If the JSON cannot be parsed the
    /// collection is left exactly as it was.
    pub fn restore_json(&mut self, json: &str) -> Result<RestoreReport> {
        let snapshot = Snapshot::from_json(json)?;
        Ok(self.restore(&snapshot))
    }

    /// Apply a snapshot. Unknown IDs are dropped, books without a color
    /// entry lose their explicit color, and a snapshot without a layout
    /// keeps the current shelves.
    pub fn restore(&mut self, snapshot: &Snapshot) -> RestoreReport {
        let mut report = RestoreReport::default();

        let shelves = match &snapshot.layout {
            Some(layout) => self.restored_shelves(layout, &mut report),
            None => self.shelves.clone(),
        };

        let mut colors: BTreeMap<BookId, HexColor> = BTreeMap::new();
        for entry in &snapshot.book_colors {
            if !self.books.contains_key(&entry.id) {
                report.dropped_colors.push(entry.id);
                continue;
            }
            let Some(text) = entry.color.as_deref() else {
                continue;
            };
            match HexColor::parse(text) {
                Ok(color) => {
                    colors.insert(entry.id, color);
                }
                Err(e) => {
                    warn!("Book {}: dropping saved color {:?} ({})", entry.id, text, e);
                    report.dropped_colors.push(entry.id);
                }
            }
        }

        // everything validated, now commit
        self.shelves = shelves;
        for book in self.books.values_mut() {
            *book = match colors.get(&book.id) {
                Some(color) => book.clone().with_user_color(*color),
                None => book.clone().without_user_color(),
            };
        }

        report.shelves = self.shelves.len();
        if !report.unknown_book_ids.is_empty() || !report.dropped_colors.is_empty() {
            warn!(
                "Restore dropped {} unknown books and {} colors",
                report.unknown_book_ids.len(),
                report.dropped_colors.len()
            );
        }
        info!("Restored layout with {} shelves", report.shelves);
        report
    }

    fn restored_shelves(&self, layout: &[LayoutEntry], report: &mut RestoreReport) -> Vec<Shelf> {
        let mut shelves: Vec<Shelf> = Vec::with_capacity(layout.len());
        let mut placed: HashSet<BookId> = HashSet::new();

        for (i, entry) in layout.iter().enumerate() {
            let mut shelf = match entry {
                LayoutEntry::Ids(_) => match self.shelves.get(i) {
                    Some(existing) => existing.emptied(),
                    None => Shelf::new(
                        String::new(),
                        &format!("Shelf {}", i + 1),
                        &self.config.manual_shelf_name,
                        ShelfKind::Manual,
                    ),
                },
                LayoutEntry::Shelf(saved) => Shelf::new(
                    saved.id.clone(),
                    saved.name(),
                    &self.config.manual_shelf_name,
                    saved.kind,
                ),
            };

            if shelf.id.is_empty() || shelves.iter().any(|s| s.id == shelf.id) {
                shelf.id = shelf::fresh_id(&shelves, "manual");
            }

            for id in entry.book_ids() {
                if !self.books.contains_key(id) {
                    report.unknown_book_ids.push(*id);
                } else if placed.insert(*id) {
                    shelf.book_ids.push(*id);
                } else {
                    debug!("Book {} listed twice in saved layout, keeping the first", id);
                }
            }
            shelves.push(shelf);
        }

        shelves
    }
}
