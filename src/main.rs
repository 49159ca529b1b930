use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::warn;

use bookshelf::{
    normalize_all, BookshelfError, Collection, Config, RawBook, Result, ShelfKind, ShelfLibrary,
    SortMode,
};

/// Arrange a book catalog on shelves and print each spine's color
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Args {
    /// JSON array of catalog rows (id, title, author, genre, tags, height, width, color)
    catalog: PathBuf,

    /// Sort the whole collection: author, similarity or hybrid
    /// (hybrid unless --genre is given)
    #[arg(long)]
    sort: Option<SortMode>,

    /// One shelf per genre instead of the default layout
    #[arg(long)]
    genre: bool,

    /// Set a book's color, e.g. --color 12=#ff8800 (repeatable)
    #[arg(long = "color", value_name = "ID=HEX")]
    colors: Vec<String>,

    /// Layout database (defaults to the user data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Restore a saved layout by name
    #[arg(long)]
    load: Option<String>,

    /// Save the resulting layout under a name
    #[arg(long)]
    save: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    let rows = read_catalog(&args.catalog)?;
    let books = normalize_all(&[], &rows, &config);
    let default_color = config.default_color;
    let mut collection = Collection::new(books, config);

    if args.genre {
        collection.rebuild_genre_shelves();
    }
    if let Some(mode) = layout_sort(args.sort, args.genre) {
        collection.apply_sort(mode);
    }

    let library = if args.db.is_some() || args.load.is_some() || args.save.is_some() {
        Some(match &args.db {
            Some(path) => ShelfLibrary::open(path)?,
            None => ShelfLibrary::new()?,
        })
    } else {
        None
    };

    if let (Some(library), Some(name)) = (&library, &args.load) {
        // a bad save is reported but never stops the run
        match library
            .load_layout_json(name)
            .and_then(|json| collection.restore_json(&json))
        {
            Ok(report) => {
                println!("📂 Restored layout {:?} ({} shelves)", name, report.shelves);
                if !report.unknown_book_ids.is_empty() {
                    println!("   Dropped unknown books: {:?}", report.unknown_book_ids);
                }
            }
            Err(e) => eprintln!("⚠️  Could not restore layout {:?}: {}", name, e),
        }
    }

    for arg in &args.colors {
        match parse_color_arg(arg) {
            Some((id, hex)) => match collection.set_user_color(id, hex) {
                Ok(true) => {}
                Ok(false) => eprintln!("⚠️  No book with id {}", id),
                Err(e) => eprintln!("⚠️  {}", e),
            },
            None => warn!("Ignoring malformed --color {:?} (expected ID=HEX)", arg),
        }
    }

    print_shelves(&collection, default_color.to_hex());

    if let (Some(library), Some(name)) = (&library, &args.save) {
        library.save_layout(name, &collection.snapshot())?;
        println!("💾 Saved layout {:?} to {}", name, library.path().display());
    }

    Ok(())
}

/// A fresh catalog is laid out in hybrid order; genre shelves are only
/// re-sorted on request.
fn layout_sort(requested: Option<SortMode>, genre: bool) -> Option<SortMode> {
    match (requested, genre) {
        (Some(mode), _) => Some(mode),
        (None, false) => Some(SortMode::Hybrid),
        (None, true) => None,
    }
}

fn read_catalog(path: &Path) -> Result<Vec<RawBook>> {
    let text = fs::read_to_string(path).map_err(|e| BookshelfError::Catalog {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    RawBook::list_from_json(&text).map_err(|e| BookshelfError::Catalog {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn parse_color_arg(arg: &str) -> Option<(i64, &str)> {
    let (id, hex) = arg.split_once('=')?;
    Some((id.trim().parse().ok()?, hex.trim()))
}

fn print_shelves(collection: &Collection, default_css: String) {
    println!("📚 {} books", collection.len());

    for shelf in collection.shelves() {
        let kind = match shelf.kind {
            ShelfKind::AutoByGenre => "genre",
            ShelfKind::Manual => "manual",
        };
        println!("\n== {} [{}] ({} books)", shelf.name(), kind, shelf.len());

        let Some(colors) = collection.shelf_colors(&shelf.id) else {
            continue;
        };
        for (id, color) in colors.iter() {
            let Some(book) = collection.book(*id) else {
                continue;
            };
            let (height, width) = book.render_size(collection.config());
            let css = color.map(|c| c.to_css()).unwrap_or_else(|| default_css.clone());
            let marker = if book.anchor_color().is_some() { "●" } else { " " };
            println!(
                "  {} {:<40} {:<24} {:>6.1}x{:<5.1}px  {}",
                marker, book.title, book.author, width, height, css
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_hybrid() {
        assert_eq!(layout_sort(None, false), Some(SortMode::Hybrid));
        assert_eq!(layout_sort(None, true), None);
        assert_eq!(layout_sort(Some(SortMode::Similarity), true), Some(SortMode::Similarity));
    }

    #[test]
    fn test_parse_color_arg() {
        assert_eq!(parse_color_arg("12=#ff8800"), Some((12, "#ff8800")));
        assert_eq!(parse_color_arg(" 3 = abc "), Some((3, "abc")));
        assert_eq!(parse_color_arg("#ff8800"), None);
        assert_eq!(parse_color_arg("x=#ff8800"), None);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["bookshelf", "books.json", "--sort", "author", "--color", "1=#fff"]).unwrap();
        assert_eq!(args.sort, Some(SortMode::Author));
        assert_eq!(args.colors, vec!["1=#fff".to_string()]);
        assert!(Args::try_parse_from(["bookshelf", "books.json", "--sort", "random"]).is_err());
    }
}
