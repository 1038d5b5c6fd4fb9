//! Clippings Explorer - Parse, deduplicate and export Kindle "My Clippings.txt" files
//!
//! This library turns the single append-only clippings file a Kindle keeps into per-book
//! records. It supports:
//!
//! - Splitting the file into sections and parsing highlights, notes and bookmarks across
//!   the declaration formats Kindle firmware has used
//! - Grouping records by book, sorting them by location and removing near-duplicates left
//!   behind when a highlight is re-made or extended
//! - Exporting books as JSON, CSV (notes paired with the highlights they annotate) and
//!   Markdown with optional chapter headings
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use clippings_explorer::{finalize_books, parse_clippings_file};
//!
//! let mut outcome = parse_clippings_file(Path::new("My Clippings.txt"))?;
//! finalize_books(&mut outcome.books, true);
//! for book in &outcome.books {
//!     println!("{}: {} highlights", book.display_name(), book.highlights.len());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod dedup;
pub mod export;
pub mod library;
pub mod models;
pub mod parsers;
pub mod settings;
pub mod utils;

// Re-export commonly used types
pub use export::{export_collection, read_json, write_json};
pub use library::{ParseOutcome, finalize_books, parse_clippings_file, parse_clippings_str};
pub use models::{Book, Bookmark, Clipping, Highlight, LocType, Note};
pub use parsers::{ClippingsParser, GrammarSet, ParseError, SectionFailure};
pub use settings::{ExportSettings, load_settings};
