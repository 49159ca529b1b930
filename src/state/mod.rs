/// State management module
///
/// This module handles all collection state, including:
/// - Shared data structures (data.rs)
/// - Catalog normalization (normalize.rs)
/// - Shelves and genre grouping (shelf.rs)
/// - The book store and every layout/color mutation (collection.rs)
/// - Saved layouts (snapshot.rs) and their SQLite store (library.rs)

pub mod collection;
pub mod data;
pub mod library;
pub mod normalize;
pub mod shelf;
pub mod snapshot;
