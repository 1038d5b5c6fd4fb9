//! Builds the book collection from a clippings file.
//!
//! # Error Handling Strategy
//!
//! - **Section-level errors**: Sections that fail to parse are logged with `warn!`, kept
//!   as [`SectionFailure`]s in the outcome, and skipped. The rest of the file is still
//!   extracted.
//! - **Truncated files**: Content after the final delimiter is reported once as a
//!   [`ParseError::TruncatedFile`] failure; every closed section is kept.
//! - **File-level errors**: A missing, unreadable, non-UTF-8 or oversized file is the only
//!   fatal condition and propagates as `anyhow::Error`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

use super::registry::BookRegistry;
use crate::models::Book;
use crate::parsers::{
    ClippingsParser, ParseError, Section, SectionFailure, SplitError, split_sections,
};
use crate::utils::validate_file_size;

/// Everything recovered from one clippings file
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Books in the order their identifier lines first appeared
    pub books: Vec<Book>,
    pub failures: Vec<SectionFailure>,
}

impl ParseOutcome {
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// First book with exactly this title
    pub fn find_book(&self, title: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.title == title)
    }

    /// Whether the input ended without a closing delimiter
    pub fn truncated(&self) -> bool {
        self.failures.iter().any(|f| matches!(f.error, ParseError::TruncatedFile { .. }))
    }
}

/// Parse a "My Clippings.txt" file with the built-in Kindle grammars.
///
/// Books come back unsorted; see [`finalize_books`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read, is not UTF-8, or exceeds the
/// size limit. Malformed sections are not errors; they are listed in
/// [`ParseOutcome::failures`].
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use clippings_explorer::parse_clippings_file;
///
/// let outcome = parse_clippings_file(Path::new("My Clippings.txt"))?;
/// println!("{} books, {} failed sections", outcome.books.len(), outcome.failure_count());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn parse_clippings_file(path: &Path) -> Result<ParseOutcome> {
    parse_clippings_file_with(&ClippingsParser::new(), path)
}

/// [`parse_clippings_file`] with a caller-supplied parser
pub fn parse_clippings_file_with(parser: &ClippingsParser, path: &Path) -> Result<ParseOutcome> {
    // Open file and validate size on the same handle to avoid TOCTOU races
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open clippings file: {}", path.display()))?;
    validate_file_size(&file, path)?;

    let mut text = String::new();
    file.read_to_string(&mut text)
        .with_context(|| format!("Failed to read clippings file: {}", path.display()))?;

    let outcome = parse_lines(parser, text.lines());
    info!(
        path = %path.display(),
        books = outcome.books.len(),
        failures = outcome.failure_count(),
        "parsed clippings file"
    );
    Ok(outcome)
}

/// Parse clippings already held in memory
pub fn parse_clippings_str(text: &str) -> ParseOutcome {
    parse_lines(&ClippingsParser::new(), text.lines())
}

/// Drive the splitter and section parser over raw lines, collecting books and failures
pub fn parse_lines<I, S>(parser: &ClippingsParser, lines: I) -> ParseOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut registry = BookRegistry::new();
    let mut failures = Vec::new();

    for item in split_sections(lines) {
        match item {
            Ok(section) => match parser.parse_section(&section) {
                Ok(parsed) => registry.get_or_create(&parsed.book_id).push(parsed.clipping),
                Err(error) => failures.push(record_failure(error, section)),
            },
            Err(SplitError::Truncated(section)) => {
                let error = ParseError::TruncatedFile { lines: section.lines.len() };
                failures.push(record_failure(error, section));
            }
        }
    }

    ParseOutcome { books: registry.into_books(), failures }
}

fn record_failure(error: ParseError, section: Section) -> SectionFailure {
    let end_line = section.end_line();
    warn!(start_line = section.start_line, end_line, %error, "skipping clippings section");
    SectionFailure { error, start_line: section.start_line, end_line, lines: section.lines }
}

/// Sort every book, dropping near-duplicates when `remove_dups` is set.
///
/// Books are independent once parsing is done, so they are processed in parallel.
pub fn finalize_books(books: &mut [Book], remove_dups: bool) {
    books.par_iter_mut().for_each(|book| book.sort(remove_dups));
}
