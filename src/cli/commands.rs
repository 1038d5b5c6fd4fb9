use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};

use crate::export::{export_collection, write_json};
use crate::library::{ParseOutcome, finalize_books, parse_clippings_file};
use crate::models::Book;
use crate::settings::load_settings;

#[derive(Parser)]
#[command(name = "clippings-explorer")]
#[command(version = "0.1.0")]
#[command(
    about = "Parse, deduplicate and export Kindle \"My Clippings.txt\" files",
    long_about = None
)]
pub struct Cli {
    /// Exit with an error if any clippings section failed to parse
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show statistics about a clippings file
    Stats {
        /// Path to "My Clippings.txt"
        file: PathBuf,
        /// Count near-duplicate highlights and notes instead of removing them
        #[arg(long)]
        keep_duplicates: bool,
    },
    /// Write every book to a single JSON file
    Json {
        file: PathBuf,
        /// Output JSON path
        out: PathBuf,
        #[arg(long)]
        keep_duplicates: bool,
    },
    /// Write JSON, Markdown and CSV files into a directory
    Export {
        file: PathBuf,
        /// Output directory (created if missing)
        out_dir: PathBuf,
        /// JSON settings describing export groups and chapter outlines
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Keep items added on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,
        /// Keep items added on or before this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        until: Option<NaiveDate>,
        #[arg(long)]
        keep_duplicates: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let outcome = match &cli.command {
        Some(Commands::Stats { file, keep_duplicates }) => show_stats(file, !keep_duplicates)?,
        Some(Commands::Json { file, out, keep_duplicates }) => {
            write_collection_json(file, out, !keep_duplicates)?
        }
        Some(Commands::Export { file, out_dir, settings, since, until, keep_duplicates }) => {
            let range = DateRange::new(*since, *until)?;
            export(file, out_dir, settings.as_deref(), range, !keep_duplicates)?
        }
        None => {
            println!("Use --help for usage information");
            return Ok(());
        }
    };

    if cli.strict && outcome.has_failures() {
        bail!("{} clippings section(s) failed to parse", outcome.failure_count());
    }

    Ok(())
}

/// Inclusive calendar-day bounds from `--since` / `--until`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DateRange {
    since: Option<NaiveDateTime>,
    until: Option<NaiveDateTime>,
}

impl DateRange {
    fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Result<Self> {
        if let (Some(since), Some(until)) = (since, until) {
            if since > until {
                bail!("--since ({}) is after --until ({})", since, until);
            }
        }

        Ok(Self {
            since: since.map(|date| date.and_time(NaiveTime::MIN)),
            until: until.and_then(|date| date.and_hms_opt(23, 59, 59)),
        })
    }

    fn is_unbounded(&self) -> bool {
        self.since.is_none() && self.until.is_none()
    }
}

/// Parse a strict YYYY-MM-DD date
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Enforce strict YYYY-MM-DD format (10 chars)
    if s.len() != 10 {
        return Err(format!("Invalid date format: '{}' (expected YYYY-MM-DD)", s));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format: '{}' (expected YYYY-MM-DD)", s))
}

/// Parse and finalize, listing failed sections on stderr
fn load_books(file: &Path, remove_dups: bool) -> Result<ParseOutcome> {
    let mut outcome = parse_clippings_file(file)?;
    finalize_books(&mut outcome.books, remove_dups);
    report_failures(&outcome);
    Ok(outcome)
}

fn report_failures(outcome: &ParseOutcome) {
    for failure in &outcome.failures {
        eprintln!("Skipped {}", failure.describe());
    }
    if outcome.has_failures() {
        eprintln!();
    }
    eprintln!(
        "Parsed {} books ({} sections failed)",
        outcome.books.len(),
        outcome.failure_count()
    );
}

fn show_stats(file: &Path, remove_dups: bool) -> Result<ParseOutcome> {
    let outcome = load_books(file, remove_dups)?;
    let books = &outcome.books;

    let highlights: usize = books.iter().map(|b| b.highlights.len()).sum();
    let notes: usize = books.iter().map(|b| b.notes.len()).sum();
    let bookmarks: usize = books.iter().map(|b| b.bookmarks.len()).sum();

    println!("Kindle Clippings Statistics");
    println!("===========================");
    println!("Books: {}", books.len());
    println!("  Highlights: {}", highlights);
    println!("  Notes: {}", notes);
    println!("  Bookmarks: {}", bookmarks);
    println!("Failed sections: {}", outcome.failure_count());

    let dates = books.iter().filter_map(Book::date_range);
    if let Some(oldest) = dates.clone().map(|(start, _)| start).min() {
        println!("Oldest clipping: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(newest) = dates.map(|(_, end)| end).max() {
        println!("Newest clipping: {}", newest.format("%Y-%m-%d %H:%M:%S"));
    }

    Ok(outcome)
}

fn write_collection_json(file: &Path, out: &Path, remove_dups: bool) -> Result<ParseOutcome> {
    let outcome = load_books(file, remove_dups)?;
    write_json(out, &outcome.books)?;
    eprintln!("Wrote {} books to {}", outcome.books.len(), out.display());
    Ok(outcome)
}

fn export(
    file: &Path,
    out_dir: &Path,
    settings_path: Option<&Path>,
    range: DateRange,
    remove_dups: bool,
) -> Result<ParseOutcome> {
    let settings = settings_path.map(load_settings).transpose()?;

    let mut outcome = load_books(file, remove_dups)?;
    if !range.is_unbounded() {
        for book in &mut outcome.books {
            book.cut(range.since, range.until);
        }
    }

    let summary = export_collection(&outcome.books, out_dir, settings.as_ref())?;
    for missing in &summary.missing_books {
        eprintln!("Warning: no book titled '{}' in {}", missing, file.display());
    }
    eprintln!("Wrote {} files to {}", summary.file_count(), out_dir.display());

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_strict_format() {
        assert_eq!(parse_date("2024-02-29"), Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(parse_date("2024-2-29").is_err());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("2024/02/29").is_err());
    }

    #[test]
    fn test_date_range_covers_whole_days() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let range = DateRange::new(Some(day), Some(day)).unwrap();

        assert_eq!(range.since, Some(day.and_hms_opt(0, 0, 0).unwrap()));
        assert_eq!(range.until, Some(day.and_hms_opt(23, 59, 59).unwrap()));
        assert!(!range.is_unbounded());
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        let since = NaiveDate::from_ymd_opt(2024, 2, 1);
        let until = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(DateRange::new(since, until).is_err());
        assert!(DateRange::new(None, None).unwrap().is_unbounded());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
