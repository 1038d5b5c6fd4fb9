//! Export of finalized books: JSON, CSV and chapter-aware Markdown
//!
//! Renderers are pure (`&Book -> String`); [`export_collection`] handles the file layout:
//!
//! - `collection.json` with every book
//! - per settings group, one `<slug>.md` and/or `<slug>.csv` per listed book, plus the
//!   optional combined Markdown/CSV files (relative paths resolve against the output dir)
//! - without settings, a Markdown and a CSV file for every book
//!
//! All files are written atomically.

pub mod chapters;
pub mod csv;
pub mod json;
pub mod markdown;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

pub use chapters::{Chapter, ChapterCursor};
pub use csv::{CSV_HEADER, CsvRow, associate_notes, build_rows, to_combined_csv, to_csv};
pub use json::{BookRecord, ItemRecord, books_from_json, books_to_json, read_json, write_json};
pub use markdown::{render_combined_markdown, render_markdown};

use crate::models::Book;
use crate::settings::{ExportSettings, GroupSettings};
use crate::utils::{slugify_file_stem, write_atomically};

pub const COLLECTION_FILENAME: &str = "collection.json";

/// Files written by one [`export_collection`] run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub json_path: PathBuf,
    pub markdown_files: Vec<PathBuf>,
    pub csv_files: Vec<PathBuf>,
    /// Settings entries that matched no parsed book
    pub missing_books: Vec<String>,
}

impl ExportSummary {
    pub fn file_count(&self) -> usize {
        1 + self.markdown_files.len() + self.csv_files.len()
    }
}

/// Hands out one file stem per book, suffixing `-2`, `-3`... until the stem is unused.
/// A book listed by several groups keeps the stem it was first given.
#[derive(Debug, Default)]
struct StemAllocator {
    by_book: HashMap<usize, String>,
    taken: HashSet<String>,
}

impl StemAllocator {
    /// `book` is the book's index in the exported slice
    fn allocate(&mut self, book: usize, title: &str) -> String {
        if let Some(stem) = self.by_book.get(&book) {
            return stem.clone();
        }

        let slug = slugify_file_stem(title);
        let mut stem = slug.clone();
        let mut n = 1;
        while self.taken.contains(&stem) {
            n += 1;
            stem = format!("{}-{}", slug, n);
        }

        self.taken.insert(stem.clone());
        self.by_book.insert(book, stem.clone());
        stem
    }
}

/// Write the whole collection under `out_dir` (created if missing)
///
/// # Errors
///
/// Returns an error if the directory cannot be created or any file fails to write.
pub fn export_collection(
    books: &[Book],
    out_dir: &Path,
    settings: Option<&ExportSettings>,
) -> Result<ExportSummary> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let json_path = out_dir.join(COLLECTION_FILENAME);
    write_json(&json_path, books)?;

    let mut summary = ExportSummary { json_path, ..Default::default() };
    let mut stems = StemAllocator::default();

    match settings {
        None => {
            for (idx, book) in books.iter().enumerate() {
                let stem = stems.allocate(idx, &book.title);
                let markdown = render_markdown(book, &[]);
                summary.markdown_files.push(write_file(out_dir, &stem, "md", markdown)?);
                summary.csv_files.push(write_file(out_dir, &stem, "csv", to_csv(book))?);
            }
        }
        Some(settings) => {
            for group in &settings.groups {
                export_group(books, out_dir, group, &mut stems, &mut summary)?;
            }
        }
    }

    info!(
        "Exported {} files to {} ({} books)",
        summary.file_count(),
        out_dir.display(),
        books.len()
    );
    Ok(summary)
}

fn export_group(
    books: &[Book],
    out_dir: &Path,
    group: &GroupSettings,
    stems: &mut StemAllocator,
    summary: &mut ExportSummary,
) -> Result<()> {
    let mut members: Vec<(usize, &Book, &[Chapter])> = Vec::with_capacity(group.books.len());
    for entry in &group.books {
        let before = members.len();
        members.extend(
            books
                .iter()
                .enumerate()
                .filter(|(_, book)| entry.matches(book))
                .map(|(idx, book)| (idx, book, entry.chapters.as_slice())),
        );
        if members.len() == before {
            warn!("Export group '{}': no parsed book titled '{}'", group.name, entry.name);
            summary.missing_books.push(entry.name.clone());
        }
    }

    for &(idx, book, chapters) in &members {
        let stem = stems.allocate(idx, &book.title);
        if group.emit_markdown {
            let markdown = render_markdown(book, chapters);
            summary.markdown_files.push(write_file(out_dir, &stem, "md", markdown)?);
        }
        if group.emit_csv {
            summary.csv_files.push(write_file(out_dir, &stem, "csv", to_csv(book))?);
        }
    }

    if let Some(path) = &group.combined_markdown_path {
        let markdown =
            render_combined_markdown(members.iter().map(|&(_, book, chapters)| (book, chapters)));
        summary.markdown_files.push(write_combined(out_dir, path, markdown)?);
    }
    if let Some(path) = &group.combined_csv_path {
        let csv = to_combined_csv(members.iter().map(|&(_, book, _)| book));
        summary.csv_files.push(write_combined(out_dir, path, csv)?);
    }

    Ok(())
}

fn write_file(out_dir: &Path, stem: &str, extension: &str, contents: String) -> Result<PathBuf> {
    let path = out_dir.join(format!("{}.{}", stem, extension));
    write_atomically(&path, contents)?;
    Ok(path)
}

/// Combined files may name a subdirectory of `out_dir`; settings validation keeps
/// `relative` inside it
fn write_combined(out_dir: &Path, relative: &Path, contents: String) -> Result<PathBuf> {
    let path = out_dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    write_atomically(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::models::{Highlight, LocType};

    fn book(title: &str, content: &str) -> Book {
        let mut book = Book::new(title, Some("Someone".to_string()));
        book.highlights.push(Highlight {
            loc_start: 40,
            loc_end: 42,
            loc_type: LocType::Location,
            added_at: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap(),
            content: content.to_string(),
        });
        book
    }

    #[test]
    fn test_export_without_settings_writes_everything() {
        let dir = TempDir::new().unwrap();
        let books = vec![book("Dune", "spice"), book("Emma", "match")];

        let summary = export_collection(&books, dir.path(), None).unwrap();

        assert_eq!(summary.file_count(), 5);
        for name in ["collection.json", "dune.md", "dune.csv", "emma.md", "emma.csv"] {
            assert!(dir.path().join(name).exists(), "missing {}", name);
        }
        assert_eq!(read_json(&summary.json_path).unwrap(), books);
    }

    #[test]
    fn test_export_with_group_settings() {
        let dir = TempDir::new().unwrap();
        let books = vec![book("Dune", "spice"), book("Emma", "match"), book("Ignored", "x")];
        let settings = ExportSettings::from_json(
            r#"{"groups":[{"name":"Fiction","emitMarkdown":true,"emitCsv":false,
                "combinedCsvPath":"fiction.csv",
                "books":[{"name":"Dune","chapters":[{"name":"Book One","loc":1}]},
                         {"name":"Emma"},{"name":"Nowhere"}]}]}"#,
        )
        .unwrap();

        let summary = export_collection(&books, dir.path(), Some(&settings)).unwrap();

        assert!(dir.path().join("dune.md").exists());
        assert!(!dir.path().join("dune.csv").exists());
        assert!(!dir.path().join("ignored.md").exists());
        assert_eq!(summary.missing_books, vec!["Nowhere".to_string()]);

        let dune = fs::read_to_string(dir.path().join("dune.md")).unwrap();
        assert!(dune.contains("## Book One"));

        let combined = fs::read_to_string(dir.path().join("fiction.csv")).unwrap();
        assert!(combined.contains("spice"));
        assert!(combined.contains("match"));
        assert!(!combined.lines().any(|line| line.starts_with("x,")));
    }

    #[test]
    fn test_colliding_titles_get_distinct_files() {
        let dir = TempDir::new().unwrap();
        let books = vec![book("Dune!", "one"), book("Dune?", "two")];

        let summary = export_collection(&books, dir.path(), None).unwrap();

        assert_eq!(summary.markdown_files[0], dir.path().join("dune.md"));
        assert_eq!(summary.markdown_files[1], dir.path().join("dune-2.md"));
    }

    #[test]
    fn test_same_title_books_are_both_exported() {
        let dir = TempDir::new().unwrap();
        let mut second = book("Dune", "second edition text");
        second.author = Some("Herbert, Frank".to_string());
        let books = vec![book("Dune", "first edition text"), second];
        let settings = ExportSettings::from_json(
            r#"{"groups":[{"name":"G","emitMarkdown":true,"emitCsv":true,
                "books":[{"name":"Dune"}]}]}"#,
        )
        .unwrap();

        for settings in [None, Some(&settings)] {
            let out = dir.path().join(if settings.is_some() { "grouped" } else { "plain" });
            let summary = export_collection(&books, &out, settings).unwrap();

            assert_eq!(summary.markdown_files, vec![out.join("dune.md"), out.join("dune-2.md")]);
            assert_eq!(summary.csv_files, vec![out.join("dune.csv"), out.join("dune-2.csv")]);
            assert!(summary.missing_books.is_empty());
            let first = fs::read_to_string(out.join("dune.md")).unwrap();
            let second = fs::read_to_string(out.join("dune-2.md")).unwrap();
            assert!(first.contains("> first edition text"));
            assert!(second.contains("> second edition text"));
        }
    }

    #[test]
    fn test_suffix_never_reuses_a_real_slug() {
        let dir = TempDir::new().unwrap();
        let books = vec![book("A", "from A"), book("a-2", "from a-2"), book("A!", "from A!")];

        let summary = export_collection(&books, dir.path(), None).unwrap();

        let names: Vec<_> =
            summary.markdown_files.iter().map(|p| p.strip_prefix(dir.path()).unwrap()).collect();
        assert_eq!(names, [Path::new("a.md"), Path::new("a-2.md"), Path::new("a-3.md")]);
        assert!(fs::read_to_string(dir.path().join("a-2.md")).unwrap().contains("from a-2"));
        assert!(fs::read_to_string(dir.path().join("a-3.md")).unwrap().contains("from A!"));
    }

    #[test]
    fn test_stem_allocator_is_stable_per_book() {
        let mut stems = StemAllocator::default();
        assert_eq!(stems.allocate(0, "A"), "a");
        assert_eq!(stems.allocate(1, "B"), "b");
        assert_eq!(stems.allocate(2, "a"), "a-2");
        assert_eq!(stems.allocate(3, "A!"), "a-3");
        assert_eq!(stems.allocate(2, "a"), "a-2");
        assert_eq!(stems.allocate(4, "A"), "a-4");
    }
}
