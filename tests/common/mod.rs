//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const DEFAULT_DATE: &str = "Wednesday, January 1, 2020 10:00:00 AM";
const DELIMITER: &str = "==========";

/// Builder for "My Clippings.txt" content
pub struct ClippingsFileBuilder {
    sections: Vec<Vec<String>>,
    tail: Vec<String>,
    line_ending: &'static str,
    bom: bool,
}

impl ClippingsFileBuilder {
    pub fn new() -> Self {
        Self { sections: Vec::new(), tail: Vec::new(), line_ending: "\n", bom: false }
    }

    /// Add a highlight over `start..=end` (a single location when equal)
    pub fn highlight(self, book: &str, start: u32, end: u32, date: &str, content: &str) -> Self {
        let range = if start == end { start.to_string() } else { format!("{}-{}", start, end) };
        self.section(&[
            book,
            &format!("- Your Highlight on Location {} | Added on {}", range, date),
            "",
            content,
        ])
    }

    /// Add a highlight on a fixed-layout (page-numbered) document
    pub fn page_highlight(self, book: &str, page: u32, date: &str, content: &str) -> Self {
        self.section(&[
            book,
            &format!("- Your Highlight on page {} | Added on {}", page, date),
            "",
            content,
        ])
    }

    /// Add a note; `content` may span several lines
    pub fn note(self, book: &str, loc: u32, date: &str, content: &str) -> Self {
        let declaration = format!("- Your Note on Location {} | Added on {}", loc, date);
        let mut lines = vec![book, declaration.as_str(), ""];
        lines.extend(content.split('\n'));
        self.section(&lines)
    }

    pub fn bookmark(self, book: &str, page: u32, date: &str) -> Self {
        let declaration = format!("- Your Bookmark on page {} | Added on {}", page, date);
        self.section(&[book, &declaration, "", ""])
    }

    /// Add a section verbatim (without the closing delimiter)
    pub fn section(mut self, lines: &[&str]) -> Self {
        self.sections.push(lines.iter().map(|line| line.to_string()).collect());
        self
    }

    /// Lines written after the last delimiter, as if the file had been cut off
    pub fn truncated_tail(mut self, lines: &[&str]) -> Self {
        self.tail = lines.iter().map(|line| line.to_string()).collect();
        self
    }

    /// Use Windows line endings
    pub fn crlf(mut self) -> Self {
        self.line_ending = "\r\n";
        self
    }

    /// Prefix every title line with a byte-order mark, as Kindle does
    pub fn with_bom(mut self) -> Self {
        self.bom = true;
        self
    }

    /// Render the file contents
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            for (i, line) in section.iter().enumerate() {
                if i == 0 && self.bom {
                    out.push('\u{feff}');
                }
                out.push_str(line);
                out.push_str(self.line_ending);
            }
            out.push_str(DELIMITER);
            out.push_str(self.line_ending);
        }
        for line in &self.tail {
            out.push_str(line);
            out.push_str(self.line_ending);
        }
        out
    }

    /// Write the file into a fresh temp directory
    pub fn build(self) -> TestClippings {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("My Clippings.txt");
        fs::write(&path, self.render()).expect("Failed to write clippings file");
        TestClippings { temp_dir, path }
    }
}

impl Default for ClippingsFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A clippings file on disk; the directory is removed on drop
pub struct TestClippings {
    temp_dir: TempDir,
    path: PathBuf,
}

impl TestClippings {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path for an output file or directory next to the clippings file
    pub fn output(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// Write an export settings file next to the clippings and return its path
pub fn write_settings(clippings: &TestClippings, json: &str) -> PathBuf {
    let path = clippings.output("settings.json");
    fs::write(&path, json).expect("Failed to write settings file");
    path
}
