/// Saved layouts
///
/// A snapshot records the shelf arrangement and every book's explicit
/// color so a session can be restored later. It is plain JSON so older
/// saves (bare ID arrays, `bookColors`) still load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::data::BookId;
use super::shelf::Shelf;

/// One shelf in a saved layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutEntry {
    /// Just the book order; shelf identity comes from its position
    Ids(Vec<BookId>),
    Shelf(Shelf),
}

impl LayoutEntry {
    pub fn book_ids(&self) -> &[BookId] {
        match self {
            LayoutEntry::Ids(ids) => ids,
            LayoutEntry::Shelf(shelf) => &shelf.book_ids,
        }
    }
}

/// A book's explicit color; `None` means no user color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookColorEntry {
    pub id: BookId,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Shelves top to bottom; absent means "keep the current layout"
    #[serde(default, alias = "shelves", skip_serializing_if = "Option::is_none")]
    pub layout: Option<Vec<LayoutEntry>>,
    #[serde(default, alias = "bookColors")]
    pub book_colors: Vec<BookColorEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::shelf::ShelfKind;

    #[test]
    fn test_legacy_format() {
        let snapshot = Snapshot::from_json(
            r##"{"layout": [[1, 2], [], [3]], "bookColors": [{"id": 1, "color": "#ff0000"}, {"id": 2, "color": null}]}"##,
        )
        .unwrap();

        let layout = snapshot.layout.unwrap();
        assert_eq!(layout.len(), 3);
        assert_eq!(layout[0], LayoutEntry::Ids(vec![1, 2]));
        assert_eq!(snapshot.book_colors[0].color.as_deref(), Some("#ff0000"));
        assert_eq!(snapshot.book_colors[1].color, None);
    }

    #[test]
    fn test_shelf_objects() {
        let snapshot = Snapshot::from_json(
            r#"{"layout": [{"id": "genre-1", "name": "Dystopia", "kind": "auto_by_genre", "book_ids": [4, 5]}, {"book_ids": [6]}]}"#,
        )
        .unwrap();

        let layout = snapshot.layout.unwrap();
        match &layout[0] {
            LayoutEntry::Shelf(shelf) => {
                assert_eq!(shelf.id, "genre-1");
                assert_eq!(shelf.name(), "Dystopia");
                assert_eq!(shelf.kind, ShelfKind::AutoByGenre);
            }
            other => panic!("expected a shelf object, got {other:?}"),
        }
        match &layout[1] {
            LayoutEntry::Shelf(shelf) => {
                assert!(shelf.id.is_empty());
                assert_eq!(shelf.kind, ShelfKind::Manual);
            }
            other => panic!("expected a shelf object, got {other:?}"),
        }
        assert_eq!(layout[1].book_ids(), &[6]);
        assert!(snapshot.book_colors.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot = Snapshot::from_json("{}").unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        assert!(Snapshot::from_json(r#"{"layout": "nope"}"#).is_err());
        assert!(Snapshot::from_json("[1, 2, 3]").is_err());
        assert!(Snapshot::from_json("not json").is_err());
    }
}
