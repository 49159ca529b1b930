//! Book shelf ordering and spine coloring.
//!
//! Normalize a catalog into [`Book`]s, arrange them on [`Shelf`]s inside a
//! [`Collection`], order them with [`sort`] and color each spine with
//! [`compute_shelf_colors`].

pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;

pub use color::{HexColor, Hsl, SpineColor};
pub use config::Config;
pub use engine::{compute_shelf_colors, score, sort, AnchorLayout, ShelfColors, SortMode};
pub use error::{BookshelfError, Result};
pub use state::collection::{Collection, RestoreReport};
pub use state::data::{Book, BookId, ColorStatus, RawBook};
pub use state::library::ShelfLibrary;
pub use state::normalize::{normalize_all, normalize_book};
pub use state::shelf::{build_genre_shelves, Shelf, ShelfId, ShelfKind};
pub use state::snapshot::Snapshot;
