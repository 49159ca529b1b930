use std::collections::BTreeSet;

use crate::state::data::Book;

/// Bonus for two books in the same genre
pub const GENRE_BONUS: f64 = 0.5;
/// Bonus for two books by the same author
pub const AUTHOR_BONUS: f64 = 0.3;

/// Closeness of two books, for ranking only.
///
/// Jaccard index of the tag sets plus fixed bonuses for an exactly
/// matching genre and author. Symmetric and never negative.
pub fn score(a: &Book, b: &Book) -> f64 {
    let mut score = jaccard(&a.tags, &b.tags);
    if a.genre == b.genre {
        score += GENRE_BONUS;
    }
    if a.author == b.author {
        score += AUTHOR_BONUS;
    }
    score
}

/// |a ∩ b| / |a ∪ b|, or 0 when both are empty
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
