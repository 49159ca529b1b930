use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};

use super::snapshot::Snapshot;
use crate::error::{BookshelfError, Result};

/// The ShelfLibrary manages the SQLite database of saved layouts.
/// Each row is one named snapshot (shelf order + book colors) stored as JSON.
pub struct ShelfLibrary {
    conn: Connection,
    db_path: PathBuf,
}

/// A saved layout as listed by the library
#[derive(Debug, Clone, PartialEq)]
pub struct SavedLayout {
    pub name: String,
    pub saved_at: DateTime<Utc>,
}

impl ShelfLibrary {
    /// Open the library in the user's data directory, creating it if needed.
    ///
    /// - Linux: ~/.local/share/bookshelf/bookshelf.db
    /// - macOS: ~/Library/Application Support/bookshelf/bookshelf.db
    /// - Windows: %APPDATA%\bookshelf\bookshelf.db
    pub fn new() -> Result<Self> {
        let db_path = Self::default_db_path()?;
        Self::open(&db_path)
    }

    /// Open (or create) the library at an explicit path
    pub fn open(db_path: &Path) -> Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        info!("Layout library opened at {}", db_path.display());

        let library = ShelfLibrary {
            conn,
            db_path: db_path.to_path_buf(),
        };
        library.init_schema()?;
        Ok(library)
    }

    fn default_db_path() -> Result<PathBuf> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(BookshelfError::NoDataDir)?;

        path.push("bookshelf");
        path.push("bookshelf.db");
        Ok(path)
    }

    /// Create the tables and indexes if they don't exist
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS layouts (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL UNIQUE,
                saved_at        INTEGER NOT NULL,
                snapshot_json   TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_layouts_saved_at
             ON layouts(saved_at DESC)",
            [],
        )?;

        debug!("Layout schema initialized");
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Store a snapshot under `name`, replacing any earlier save of that name
    pub fn save_layout(&self, name: &str, snapshot: &Snapshot) -> Result<()> {
        let saved_at = snapshot.saved_at.unwrap_or_else(Utc::now);
        let json = snapshot.to_json()?;

        self.conn.execute(
            "INSERT INTO layouts (name, saved_at, snapshot_json) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                saved_at = excluded.saved_at,
                snapshot_json = excluded.snapshot_json",
            params![name, saved_at.timestamp_millis(), json],
        )?;

        info!("Saved layout {:?}", name);
        Ok(())
    }

    /// Load the snapshot saved under `name`
    pub fn load_layout(&self, name: &str) -> Result<Snapshot> {
        let json = self.load_layout_json(name)?;
        Ok(Snapshot::from_json(&json)?)
    }

    /// Raw JSON of a saved layout, so a caller can restore it with
    /// `Collection::restore_json`
    pub fn load_layout_json(&self, name: &str) -> Result<String> {
        self.conn
            .query_row(
                "SELECT snapshot_json FROM layouts WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| BookshelfError::NoSavedLayout(name.to_string()))
    }

    /// The most recently saved snapshot
    pub fn latest_layout(&self) -> Result<Snapshot> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT snapshot_json FROM layouts ORDER BY saved_at DESC, id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Snapshot::from_json(&json)?),
            None => Err(BookshelfError::NoSavedLayout("latest".to_string())),
        }
    }

    /// All saved layouts, newest first
    pub fn layouts(&self) -> Result<Vec<SavedLayout>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, saved_at FROM layouts ORDER BY saved_at DESC, id DESC")?;

        let rows = stmt.query_map([], |row| {
            let name: String = row.get(0)?;
            let millis: i64 = row.get(1)?;
            Ok((name, millis))
        })?;

        let mut layouts = Vec::new();
        for row in rows {
            let (name, millis) = row?;
            layouts.push(SavedLayout {
                name,
                saved_at: DateTime::from_timestamp_millis(millis).unwrap_or_default(),
            });
        }
        Ok(layouts)
    }

    /// Get a count of saved layouts
    pub fn layout_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM layouts", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete one saved layout; returns whether it existed
    pub fn delete_layout(&self, name: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM layouts WHERE name = ?1", params![name])?;
        Ok(deleted > 0)
    }

    /// Forget every saved layout
    pub fn clear(&self) -> Result<usize> {
        let deleted = self.conn.execute("DELETE FROM layouts", [])?;
        if deleted > 0 {
            info!("Cleared {} saved layouts", deleted);
        }
        Ok(deleted)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for ShelfLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShelfLibrary")
            .field("db_path", &self.db_path)
            .finish()
    }
}
