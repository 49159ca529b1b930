use std::path::PathBuf;

use thiserror::Error;

use crate::color::ColorParseError;

/// Errors surfaced by the collection store and the layout library.
///
/// The ordering and color algorithms themselves never fail; only user
/// input (colors), saved layouts and the database can.
#[derive(Debug, Error)]
pub enum BookshelfError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid color {input:?}: {source}")]
    InvalidColor {
        input: String,
        #[source]
        source: ColorParseError,
    },

    #[error("could not determine a data directory")]
    NoDataDir,

    /// Holds the requested layout name (or "latest")
    #[error("no saved layout found ({0})")]
    NoSavedLayout(String),

    #[error("could not read catalog {path}: {reason}")]
    Catalog { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, BookshelfError>;
