use super::dates::parse_kindle_date;
use super::error::ParseError;
use super::grammar::{Declaration, GrammarSet};
use super::splitter::Section;
use crate::models::{Bookmark, Clipping, ClippingKind, Highlight, Note};

const HIGHLIGHT_START: &str = "- Your Highlight";
const BOOKMARK_START: &str = "- Your Bookmark";
const NOTE_START: &str = "- Your Note";

/// A successfully parsed section, not yet attached to a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSection {
    /// Raw identifier line; the registry key for the owning book
    pub book_id: String,
    pub clipping: Clipping,
}

/// Turns sections into typed clippings using an injected [`GrammarSet`]
#[derive(Debug, Clone)]
pub struct ClippingsParser {
    grammars: GrammarSet,
}

impl Default for ClippingsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ClippingsParser {
    /// Parser using the built-in Kindle grammars
    pub fn new() -> Self {
        Self { grammars: GrammarSet::kindle() }
    }

    pub fn with_grammars(grammars: GrammarSet) -> Self {
        Self { grammars }
    }

    /// Classify one section and extract its record.
    ///
    /// Blank lines are ignored for classification; a note's body keeps its interior
    /// blank lines.
    pub fn parse_section(&self, section: &Section) -> Result<ParsedSection, ParseError> {
        let content_lines: Vec<&str> =
            section.lines.iter().map(String::as_str).filter(|line| !is_blank(line)).collect();

        if content_lines.len() < 2 {
            return Err(ParseError::MalformedSection { found: content_lines.len() });
        }

        let book_id = content_lines[0].to_string();
        let declaration = content_lines[1];
        let kind = classify(declaration, content_lines.len()).ok_or_else(|| {
            ParseError::UnrecognizedSection {
                declaration: declaration.to_string(),
                content_lines: content_lines.len(),
            }
        })?;

        let Declaration { loc_type, loc_start, loc_end, date } =
            self.grammars.match_declaration(kind, declaration).ok_or_else(|| {
                ParseError::UnparseableDeclaration { kind, declaration: declaration.to_string() }
            })?;

        let added_at = parse_kindle_date(&date).ok_or(ParseError::UnparseableDate(date))?;

        let clipping = match kind {
            ClippingKind::Highlight => Clipping::Highlight(Highlight {
                loc_start,
                loc_end: loc_end.unwrap_or(loc_start).max(loc_start),
                loc_type,
                added_at,
                content: content_lines[2].trim().to_string(),
            }),
            ClippingKind::Note => Clipping::Note(Note {
                loc: loc_start,
                loc_type,
                added_at,
                content: note_body(section, declaration),
            }),
            ClippingKind::Bookmark => {
                Clipping::Bookmark(Bookmark { loc: loc_start, loc_type, added_at })
            }
        };

        Ok(ParsedSection { book_id, clipping })
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Declaration prefix plus the content-line count that prefix requires
fn classify(declaration: &str, content_lines: usize) -> Option<ClippingKind> {
    if declaration.starts_with(HIGHLIGHT_START) && content_lines == 3 {
        Some(ClippingKind::Highlight)
    } else if declaration.starts_with(BOOKMARK_START) && content_lines == 2 {
        Some(ClippingKind::Bookmark)
    } else if declaration.starts_with(NOTE_START) && content_lines >= 3 {
        Some(ClippingKind::Note)
    } else {
        None
    }
}

/// Raw lines after the declaration, minus one leading blank line and all trailing
/// blank lines (never fewer than one line), joined with `\n`
fn note_body(section: &Section, declaration: &str) -> String {
    let body_start = section
        .lines
        .iter()
        .position(|line| line.as_str() == declaration)
        .map_or(section.lines.len(), |idx| idx + 1);
    let mut body: &[String] = &section.lines[body_start..];

    if body.len() > 1 && body.first().is_some_and(|line| is_blank(line)) {
        body = &body[1..];
    }
    while body.len() > 1 && body.last().is_some_and(|line| is_blank(line)) {
        body = &body[..body.len() - 1];
    }

    body.join("\n")
}
