/// Ordering and coloring engine
///
/// Pure functions over books that are already loaded:
/// - `similarity.rs` - closeness score between two books
/// - `sequencer.rs` - orderings of a collection (author, similarity, hybrid)
/// - `gradient.rs` - spine colors interpolated between user-set anchors

pub mod gradient;
pub mod sequencer;
pub mod similarity;

pub use gradient::{compute_shelf_colors, AnchorLayout, ShelfColors};
pub use sequencer::{sort, SortMode};
pub use similarity::score;
