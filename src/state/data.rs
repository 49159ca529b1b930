/// Shared data structures for the collection
///
/// These structs represent the data model that flows between
/// the catalog loader, the ordering/color engine and the renderer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::color::HexColor;
use crate::config::Config;

/// Stable book identifier (survives across sessions)
pub type BookId = i64;

/// A catalog row exactly as it arrived.
///
/// Every field is optional and loosely typed; the normalizer decides
/// what is usable and substitutes defaults for the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBook {
    pub id: Option<Value>,
    pub title: Option<Value>,
    pub author: Option<Value>,
    pub genre: Option<Value>,
    /// Either an array of strings or a comma-separated string
    pub tags: Option<Value>,
    /// Millimeters
    pub height: Option<Value>,
    /// Millimeters
    pub width: Option<Value>,
    pub color: Option<Value>,
}

impl RawBook {
    /// Parse a JSON array of catalog rows
    pub fn list_from_json(json: &str) -> Result<Vec<RawBook>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Whether a book's color is an anchor for the gradient engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorStatus {
    /// No explicit color; the rendered color is computed or left to the default
    #[default]
    Unset,
    /// `display_color` was chosen by the user
    UserSet,
}

/// A render-ready book.
///
/// The color fields are only changed through the `with_*` transitions,
/// which keep `color_status == UserSet` exactly when a display color is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub tags: BTreeSet<String>,
    pub height_mm: f64,
    pub width_mm: f64,
    base_color: Option<HexColor>,
    display_color: Option<HexColor>,
    color_status: ColorStatus,
}

impl Book {
    /// Create a book with the given catalog color (if any).
    /// A catalog color counts as a user choice and starts out as an anchor.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        tags: BTreeSet<String>,
        height_mm: f64,
        width_mm: f64,
        color: Option<HexColor>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            tags,
            height_mm,
            width_mm,
            base_color: color,
            display_color: color,
            color_status: if color.is_some() { ColorStatus::UserSet } else { ColorStatus::Unset },
        }
    }

    /// Original catalog color, kept for resets
    pub fn base_color(&self) -> Option<HexColor> {
        self.base_color
    }

    pub fn display_color(&self) -> Option<HexColor> {
        self.display_color
    }

    pub fn color_status(&self) -> ColorStatus {
        self.color_status
    }

    /// The anchor color, if this book is an anchor
    pub fn anchor_color(&self) -> Option<HexColor> {
        match self.color_status {
            ColorStatus::UserSet => self.display_color,
            ColorStatus::Unset => None,
        }
    }

    /// Explicit user pick: the book becomes an anchor
    pub fn with_user_color(mut self, color: HexColor) -> Self {
        self.display_color = Some(color);
        self.color_status = ColorStatus::UserSet;
        self
    }

    /// Drop the explicit color: the book is no longer an anchor
    pub fn without_user_color(mut self) -> Self {
        self.display_color = None;
        self.color_status = ColorStatus::Unset;
        self
    }

    /// Go back to whatever the catalog said
    pub fn with_base_color(self) -> Self {
        match self.base_color {
            Some(color) => self.with_user_color(color),
            None => self.without_user_color(),
        }
    }

    /// Pixel size (height, width) for rendering
    pub fn render_size(&self, config: &Config) -> (f64, f64) {
        (self.height_mm * config.px_per_mm, self.width_mm * config.px_per_mm)
    }
}
