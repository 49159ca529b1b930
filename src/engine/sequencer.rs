use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::similarity::score;
use crate::state::data::Book;

/// How a collection gets ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// By author, then title
    Author,
    /// Greedy nearest-neighbor chain on the similarity score
    Similarity,
    /// By author only; books of one author keep their input order
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort mode {0:?} (expected author, similarity or hybrid)")]
pub struct UnknownSortMode(pub String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "author" => Ok(SortMode::Author),
            "similarity" => Ok(SortMode::Similarity),
            "hybrid" => Ok(SortMode::Hybrid),
            _ => Err(UnknownSortMode(s.to_string())),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortMode::Author => "author",
            SortMode::Similarity => "similarity",
            SortMode::Hybrid => "hybrid",
        })
    }
}

/// Return a new ordering of `books`; the input is left alone.
///
/// Works on owned books as well as references.
pub fn sort<B>(books: &[B], mode: SortMode) -> Vec<B>
where
    B: Borrow<Book> + Clone,
{
    if books.len() < 2 {
        return books.to_vec();
    }

    debug!("Sorting {} books by {}", books.len(), mode);

    let mut sorted = books.to_vec();
    match mode {
        SortMode::Author => sorted.sort_by(|a, b| {
            let (a, b) = (as_book(a), as_book(b));
            collate(&a.author, &b.author).then_with(|| collate(&a.title, &b.title))
        }),
        SortMode::Hybrid => sorted.sort_by(|a, b| collate(&as_book(a).author, &as_book(b).author)),
        SortMode::Similarity => sorted = chain_by_similarity(sorted),
    }
    sorted
}

/// Start from the first book and keep appending the remaining book that
/// scores highest against the last one placed. Ties go to the earliest
/// book in input order. O(n²).
fn chain_by_similarity<B: Borrow<Book>>(books: Vec<B>) -> Vec<B> {
    let mut pool = books;
    let mut result = Vec::with_capacity(pool.len());
    if pool.is_empty() {
        return result;
    }
    result.push(pool.remove(0));

    while !pool.is_empty() {
        let current = as_book(&result[result.len() - 1]);

        let mut best_idx = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, candidate) in pool.iter().enumerate() {
            let s = score(current, as_book(candidate));
            if s > best_score {
                best_score = s;
                best_idx = i;
            }
        }

        result.push(pool.remove(best_idx));
    }

    result
}

fn as_book<B: Borrow<Book>>(b: &B) -> &Book {
    b.borrow()
}

/// Case-insensitive comparison with a byte-wise tiebreak, so that
/// "de Balzac" sorts next to "Dickens" but the order stays total.
pub fn collate(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<char>>();
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}
