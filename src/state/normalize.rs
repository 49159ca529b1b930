/// Catalog normalization
///
/// Turns loosely-typed catalog rows into render-ready `Book`s.
/// Nothing here fails: anything unusable is replaced by a configured default.

use std::collections::BTreeSet;

use log::{debug, warn};
use serde_json::Value;

use super::data::{Book, BookId, RawBook};
use crate::color::HexColor;
use crate::config::Config;

/// Normalize one catalog row.
///
/// `position` is the row's index in its source and `offset` the number of
/// books already loaded before this source; together they give the fallback
/// id for rows without a usable one.
pub fn normalize_book(raw: &RawBook, position: usize, offset: usize, config: &Config) -> Book {
    let id = raw
        .id
        .as_ref()
        .and_then(as_id)
        .unwrap_or((offset + position + 1) as BookId);

    let title = raw.title.as_ref().and_then(as_text).unwrap_or_else(|| config.untitled_title.clone());
    let author = raw.author.as_ref().and_then(as_text).unwrap_or_else(|| config.unknown_author.clone());
    let genre = raw.genre.as_ref().and_then(as_text).unwrap_or_else(|| config.unknown_genre.clone());

    let height_mm = raw.height.as_ref().and_then(as_dimension).unwrap_or(config.default_height_mm);
    let width_mm = raw.width.as_ref().and_then(as_dimension).unwrap_or(config.default_width_mm);

    let color = raw.color.as_ref().and_then(as_text).and_then(|text| match HexColor::parse(&text) {
        Ok(color) => Some(color),
        Err(e) => {
            warn!("Book {}: ignoring color {:?} ({})", id, text, e);
            None
        }
    });

    Book::new(
        id,
        title,
        author,
        genre,
        raw.tags.as_ref().map(as_tags).unwrap_or_default(),
        height_mm,
        width_mm,
        color,
    )
}

/// Normalize a fixed local list followed by rows from an external catalog.
///
/// Remote rows without a title (spreadsheet filler) are skipped and do
/// not take a fallback id.
pub fn normalize_all(local: &[RawBook], remote: &[RawBook], config: &Config) -> Vec<Book> {
    let mut books: Vec<Book> = local
        .iter()
        .enumerate()
        .map(|(i, raw)| normalize_book(raw, i, 0, config))
        .collect();

    let rows: Vec<&RawBook> = remote.iter().filter(|raw| has_title(raw)).collect();
    let skipped = remote.len() - rows.len();
    if skipped > 0 {
        debug!("Skipped {} untitled catalog rows", skipped);
    }

    let offset = books.len();
    books.extend(
        rows.into_iter()
            .enumerate()
            .map(|(i, raw)| normalize_book(raw, i, offset, config)),
    );
    books
}

fn has_title(raw: &RawBook) -> bool {
    raw.title.as_ref().and_then(as_text).is_some()
}

/// Non-blank text; numbers are accepted as their decimal form
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// A non-zero integral id
fn as_id(value: &Value) -> Option<BookId> {
    let n = as_number(value)?;
    (n.is_finite() && n.fract() == 0.0 && n != 0.0).then_some(n as BookId)
}

/// A positive finite size
fn as_dimension(value: &Value) -> Option<f64> {
    as_number(value).filter(|n| n.is_finite() && *n > 0.0)
}

/// Tags as a set; entries may themselves be comma-separated lists and a
/// lone "-" means "none"
fn as_tags(value: &Value) -> BTreeSet<String> {
    let entries: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        other => as_text(other).into_iter().collect(),
    };

    entries
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "-")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::ColorStatus;
    use serde_json::json;

    fn raw(value: Value) -> RawBook {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_record() {
        let config = Config::default();
        let book = normalize_book(
            &raw(json!({
                "id": 1, "title": "1984", "author": "George Orwell", "genre": "Dystopia",
                "tags": ["Politics", "Surveillance", "Politics"],
                "height": 190, "width": 18, "color": "#333333"
            })),
            0,
            0,
            &config,
        );

        assert_eq!(book.id, 1);
        assert_eq!(book.title, "1984");
        assert_eq!(book.tags.len(), 2);
        assert_eq!(book.height_mm, 190.0);
        assert_eq!(book.width_mm, 18.0);
        assert_eq!(book.color_status(), ColorStatus::UserSet);
        assert_eq!(book.base_color(), book.display_color());
    }

    #[test]
    fn test_empty_record_gets_defaults() {
        let config = Config::default();
        let book = normalize_book(&RawBook::default(), 4, 2, &config);

        assert_eq!(book.id, 7);
        assert_eq!(book.title, config.untitled_title);
        assert_eq!(book.author, config.unknown_author);
        assert_eq!(book.genre, config.unknown_genre);
        assert!(book.tags.is_empty());
        assert_eq!(book.height_mm, config.default_height_mm);
        assert_eq!(book.width_mm, config.default_width_mm);
        assert_eq!(book.color_status(), ColorStatus::Unset);
        assert_eq!(book.base_color(), None);
    }

    #[test]
    fn test_bad_values_degrade() {
        let config = Config::default();
        let book = normalize_book(
            &raw(json!({
                "id": 0, "title": "   ", "height": -5, "width": "abc",
                "color": "not-a-color", "tags": null
            })),
            0,
            0,
            &config,
        );

        assert_eq!(book.id, 1);
        assert_eq!(book.title, config.untitled_title);
        assert_eq!(book.height_mm, config.default_height_mm);
        assert_eq!(book.width_mm, config.default_width_mm);
        assert_eq!(book.color_status(), ColorStatus::Unset);
    }

    #[test]
    fn test_tag_strings_are_split() {
        let config = Config::default();
        let book = normalize_book(
            &raw(json!({ "tags": ["Politics, History", "-", "", " Satire "] })),
            0,
            0,
            &config,
        );
        let tags: Vec<&str> = book.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["History", "Politics", "Satire"]);

        let book = normalize_book(&raw(json!({ "tags": "a,b, ,c" })), 0, 0, &config);
        assert_eq!(book.tags.len(), 3);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let config = Config::default();
        let book = normalize_book(&raw(json!({ "id": "12", "height": "200.5" })), 0, 0, &config);
        assert_eq!(book.id, 12);
        assert_eq!(book.height_mm, 200.5);
    }

    #[test]
    fn test_merge_local_and_remote() {
        let config = Config::default();
        let local = vec![raw(json!({ "id": 1, "title": "1984" })), raw(json!({ "id": 2, "title": "Animal Farm" }))];
        let remote = vec![
            raw(json!({ "title": "Dune" })),
            raw(json!({ "title": "", "author": "" })),
            raw(json!({ "author": "Somebody", "genre": "-" })),
            raw(json!({ "id": 40, "title": "Emma" })),
        ];

        let books = normalize_all(&local, &remote, &config);
        let ids: Vec<BookId> = books.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 40]);
    }

    #[test]
    fn test_untitled_remote_rows_are_dropped() {
        let config = Config::default();
        let remote = vec![
            raw(json!({ "author": "Somebody", "genre": "-" })),
            raw(json!({ "title": "   ", "height": 200 })),
            raw(json!({ "title": "Dune" })),
        ];

        let books = normalize_all(&[], &remote, &config);
        let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Dune"]);
        assert_eq!(books[0].id, 1);

        // local rows are never dropped
        let books = normalize_all(&[raw(json!({ "author": "Somebody" }))], &[], &config);
        assert_eq!(books[0].title, config.untitled_title);
    }
}
