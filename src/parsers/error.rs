use thiserror::Error;

use crate::models::ClippingKind;

/// Why a single clippings section could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("section has {found} non-blank line(s), expected at least 2")]
    MalformedSection { found: usize },

    #[error("unrecognized section: '{declaration}' with {content_lines} non-blank line(s)")]
    UnrecognizedSection { declaration: String, content_lines: usize },

    #[error("no {kind} format matched declaration '{declaration}'")]
    UnparseableDeclaration { kind: ClippingKind, declaration: String },

    #[error("unable to parse date '{0}'")]
    UnparseableDate(String),

    #[error("input ended with {lines} line(s) after the last '==========' delimiter")]
    TruncatedFile { lines: usize },
}

/// A failed section together with enough context for a human to inspect it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFailure {
    pub error: ParseError,
    /// 1-based line number of the first line in the section
    pub start_line: usize,
    /// 1-based line number of the last line in the section
    pub end_line: usize,
    pub lines: Vec<String>,
}

impl SectionFailure {
    /// Multi-line report: the error, its line range, then each raw line quoted
    pub fn describe(&self) -> String {
        let mut report = format!("lines {}-{}: {}", self.start_line, self.end_line, self.error);
        for line in &self.lines {
            report.push_str(&format!("\n  '{}'", line));
        }
        report
    }
}
