//! Export settings
//!
//! A JSON file describing how parsed books are grouped for export:
//!
//! ```json
//! { "groups": [ { "name": "Fiction", "emitMarkdown": true, "emitCsv": false,
//!                 "combinedMarkdownPath": "fiction.md",
//!                 "books": [ { "name": "Dune",
//!                              "chapters": [ { "name": "Book One", "loc": 10 } ] } ] } ] }
//! ```
//!
//! # Error Handling Strategy
//!
//! Unlike clippings sections, settings are all-or-nothing: unknown fields, missing fields,
//! blank names and combined paths leaving the output directory are rejected at load time
//! with the file path in the error context.

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::export::Chapter;
use crate::models::Book;
use crate::utils::validate_file_size;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportSettings {
    pub groups: Vec<GroupSettings>,
}

/// One export group: which formats to write for its books, and where combined files go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupSettings {
    pub name: String,
    pub emit_markdown: bool,
    pub emit_csv: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_markdown_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_csv_path: Option<PathBuf>,
    pub books: Vec<BookSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookSettings {
    /// Exact title of a parsed book
    pub name: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl ExportSettings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: ExportSettings =
            serde_json::from_str(json).context("Malformed export settings")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        for (i, group) in self.groups.iter().enumerate() {
            if group.name.trim().is_empty() {
                bail!("Export group #{} has an empty name", i + 1);
            }
            if let Some(book) = group.books.iter().find(|book| book.name.trim().is_empty()) {
                bail!(
                    "Export group '{}' lists a book with an empty name ({:?})",
                    group.name,
                    book.name
                );
            }
            let combined = [&group.combined_markdown_path, &group.combined_csv_path];
            if let Some(path) = combined.into_iter().flatten().find(|path| !is_confined(path)) {
                bail!(
                    "Export group '{}': combined path {} must stay inside the output directory",
                    group.name,
                    path.display()
                );
            }
        }
        Ok(())
    }
}

impl BookSettings {
    /// Names match titles exactly, so one entry covers every parsed book sharing the title
    pub fn matches(&self, book: &Book) -> bool {
        self.name == book.title
    }
}

/// Relative, non-empty, and free of `..` components
fn is_confined(path: &Path) -> bool {
    path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Load export settings from a JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read, exceeds the size limit, or
/// does not describe valid settings.
pub fn load_settings(path: &Path) -> Result<ExportSettings> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open settings file: {}", path.display()))?;
    validate_file_size(&file, path)?;

    let mut json = String::new();
    file.read_to_string(&mut json)
        .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

    ExportSettings::from_json(&json)
        .with_context(|| format!("Invalid settings file: {}", path.display()))
}
