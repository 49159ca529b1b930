/// Anchor-based spine gradients
///
/// Books whose color was picked by the user are *anchors*. Every other book
/// on the shelf gets a color derived from the anchors around it:
/// - no anchors: nothing is colored
/// - one anchor: only the anchor is colored
/// - two or more: books between two anchors are interpolated in HSL,
///   books outside the outermost anchors copy the nearest one
///
/// The engine only reads books. It never writes their color fields and
/// keeps no state between calls.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use log::debug;

use crate::color::{HexColor, SpineColor};
use crate::state::data::{Book, BookId};

/// Where the anchors sit on a shelf, computed once per shelf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorLayout {
    NoAnchors,
    SingleAnchor(usize),
    /// Positions in ascending order, at least two
    MultipleAnchors(Vec<usize>),
}

impl AnchorLayout {
    pub fn detect<B: Borrow<Book>>(books: &[B]) -> Self {
        let positions: Vec<usize> = books
            .iter()
            .enumerate()
            .filter(|(_, book)| <B as Borrow<Book>>::borrow(book).anchor_color().is_some())
            .map(|(i, _)| i)
            .collect();

        match positions.as_slice() {
            [] => AnchorLayout::NoAnchors,
            [only] => AnchorLayout::SingleAnchor(*only),
            _ => AnchorLayout::MultipleAnchors(positions),
        }
    }

    pub fn anchor_count(&self) -> usize {
        match self {
            AnchorLayout::NoAnchors => 0,
            AnchorLayout::SingleAnchor(_) => 1,
            AnchorLayout::MultipleAnchors(positions) => positions.len(),
        }
    }
}

/// The engine's output for one shelf, in shelf order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShelfColors {
    entries: Vec<(BookId, Option<SpineColor>)>,
}

impl ShelfColors {
    /// Color at a shelf position; `None` means "no explicit color"
    pub fn at(&self, position: usize) -> Option<SpineColor> {
        self.entries.get(position).and_then(|(_, color)| *color)
    }

    /// Color of a book on this shelf
    pub fn get(&self, id: BookId) -> Option<SpineColor> {
        self.entries
            .iter()
            .find(|(book_id, _)| *book_id == id)
            .and_then(|(_, color)| *color)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(BookId, Option<SpineColor>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_map(&self) -> BTreeMap<BookId, Option<SpineColor>> {
        self.entries.iter().copied().collect()
    }
}

/// Compute the display color of every book on a shelf.
///
/// `books` is the shelf in left-to-right order, already resolved
/// against the collection.
pub fn compute_shelf_colors<B: Borrow<Book>>(books: &[B]) -> ShelfColors {
    let books: Vec<&Book> = books.iter().map(<B as Borrow<Book>>::borrow).collect();
    let layout = AnchorLayout::detect(&books);
    debug!("Coloring shelf of {} books with {} anchors", books.len(), layout.anchor_count());

    let colors: Vec<Option<SpineColor>> = match &layout {
        AnchorLayout::NoAnchors => vec![None; books.len()],
        AnchorLayout::SingleAnchor(at) => (0..books.len())
            .map(|i| if i == *at { anchor(books[i]) } else { None })
            .collect(),
        AnchorLayout::MultipleAnchors(positions) => {
            let anchors: Vec<(usize, HexColor)> = positions
                .iter()
                .filter_map(|&pos| books[pos].anchor_color().map(|color| (pos, color)))
                .collect();
            (0..books.len())
                .map(|i| anchor(books[i]).or_else(|| between_anchors(&anchors, i)))
                .collect()
        }
    };

    ShelfColors {
        entries: books.iter().map(|b| b.id).zip(colors).collect(),
    }
}

fn anchor(book: &Book) -> Option<SpineColor> {
    book.anchor_color().map(SpineColor::Anchor)
}

/// Color for a non-anchor position `i`, given the anchors in shelf order
fn between_anchors(anchors: &[(usize, HexColor)], i: usize) -> Option<SpineColor> {
    // first anchor to the right of i; the one before it is the left anchor
    let k = anchors.partition_point(|&(pos, _)| pos < i);
    let left = k.checked_sub(1).map(|j| anchors[j]);
    let right = anchors.get(k).copied();

    match (left, right) {
        (Some((l, start)), Some((r, end))) => {
            let t = (i - l) as f64 / (r - l) as f64;
            Some(SpineColor::Blend(start.to_hsl().lerp(end.to_hsl(), t)))
        }
        (Some((_, edge)), None) | (None, Some((_, edge))) => Some(SpineColor::Anchor(edge)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Hsl;
    use std::collections::BTreeSet;

    const RED: HexColor = HexColor::new(255, 0, 0);
    const BLUE: HexColor = HexColor::new(0, 0, 255);
    const WHITE: HexColor = HexColor::new(255, 255, 255);

    fn shelf(colors: &[Option<HexColor>]) -> Vec<Book> {
        colors
            .iter()
            .enumerate()
            .map(|(i, color)| {
                Book::new(i as i64 + 1, "T", "A", "G", BTreeSet::new(), 200.0, 20.0, *color)
            })
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_layout_detection() {
        assert_eq!(AnchorLayout::detect(&shelf(&[None, None])), AnchorLayout::NoAnchors);
        assert_eq!(AnchorLayout::detect(&shelf(&[None, Some(RED)])), AnchorLayout::SingleAnchor(1));
        assert_eq!(
            AnchorLayout::detect(&shelf(&[Some(RED), None, Some(BLUE)])),
            AnchorLayout::MultipleAnchors(vec![0, 2])
        );
    }

    #[test]
    fn test_no_anchors() {
        let colors = compute_shelf_colors(&shelf(&[None, None, None]));
        assert_eq!(colors.len(), 3);
        assert!(colors.iter().all(|(_, c)| c.is_none()));
    }

    #[test]
    fn test_single_anchor_does_not_spread() {
        let colors = compute_shelf_colors(&shelf(&[None, None, Some(RED), None]));
        assert_eq!(colors.at(2), Some(SpineColor::Anchor(RED)));
        for i in [0, 1, 3] {
            assert_eq!(colors.at(i), None);
        }
    }

    #[test]
    fn test_red_to_blue_midpoint() {
        let colors = compute_shelf_colors(&shelf(&[Some(RED), None, None, None, Some(BLUE)]));

        assert_eq!(colors.at(0), Some(SpineColor::Anchor(RED)));
        assert_eq!(colors.at(4), Some(SpineColor::Anchor(BLUE)));

        match colors.at(2) {
            Some(SpineColor::Blend(hsl)) => {
                // hue 0 -> 240 blended linearly, not across 0°
                assert!(approx(hsl.h, 120.0));
                assert!(approx(hsl.s, 100.0));
                assert!(approx(hsl.l, 50.0));
                assert_eq!(hsl.to_rgb(), HexColor::new(0, 255, 0));
            }
            other => panic!("expected a blend, got {other:?}"),
        }

        match colors.at(1) {
            Some(SpineColor::Blend(hsl)) => assert!(approx(hsl.h, 60.0)),
            other => panic!("expected a blend, got {other:?}"),
        }
    }

    #[test]
    fn test_flat_extrapolation_outside_anchors() {
        let colors = compute_shelf_colors(&shelf(&[None, Some(RED), None, Some(BLUE), None, None]));
        assert_eq!(colors.at(0), Some(SpineColor::Anchor(RED)));
        assert_eq!(colors.at(4), Some(SpineColor::Anchor(BLUE)));
        assert_eq!(colors.at(5), Some(SpineColor::Anchor(BLUE)));
    }

    #[test]
    fn test_nearest_anchors_are_used() {
        let colors = compute_shelf_colors(&shelf(&[Some(RED), None, Some(WHITE), None, Some(BLUE)]));
        let white = WHITE.to_hsl();
        let blue = BLUE.to_hsl();
        match colors.at(3) {
            Some(SpineColor::Blend(hsl)) => assert_eq!(hsl, white.lerp(blue, 0.5)),
            other => panic!("expected a blend, got {other:?}"),
        }
    }

    #[test]
    fn test_hue_is_not_wrapped() {
        let near_red = Hsl { h: 10.0, s: 100.0, l: 50.0 }.to_rgb();
        let other_red = Hsl { h: 350.0, s: 100.0, l: 50.0 }.to_rgb();
        let colors = compute_shelf_colors(&shelf(&[Some(near_red), None, Some(other_red)]));
        match colors.at(1) {
            Some(SpineColor::Blend(hsl)) => {
                let expected = (near_red.to_hsl().h + other_red.to_hsl().h) / 2.0;
                assert!(approx(hsl.h, expected));
                assert!(hsl.h > 170.0 && hsl.h < 190.0);
            }
            other => panic!("expected a blend, got {other:?}"),
        }
    }

    #[test]
    fn test_idempotent_and_read_only() {
        let books = shelf(&[Some(RED), None, None, Some(BLUE)]);
        let before = books.clone();
        let first = compute_shelf_colors(&books);
        let second = compute_shelf_colors(&books);
        assert_eq!(first, second);
        assert_eq!(books, before);
    }

    #[test]
    fn test_lookup_by_id() {
        let colors = compute_shelf_colors(&shelf(&[Some(RED), None, Some(BLUE)]));
        assert_eq!(colors.get(1), Some(SpineColor::Anchor(RED)));
        assert!(colors.get(2).is_some());
        assert_eq!(colors.get(99), None);
        assert_eq!(colors.to_map().len(), 3);
    }

    #[test]
    fn test_empty_shelf() {
        let empty: Vec<Book> = Vec::new();
        assert!(compute_shelf_colors(&empty).is_empty());
    }
}
