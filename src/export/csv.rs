//! CSV rendering of a single book.
//!
//! Each row draws positionally from the highlight, note and bookmark lists, so the table
//! is as long as the longest list. The `associated_note` column additionally pairs each
//! highlight with a note whose location falls inside the highlight's range.

use crate::models::{Book, Highlight, Note};

pub const CSV_HEADER: [&str; 6] =
    ["highlight", "associated_note", "highlight_loc", "note", "note_loc", "bookmark_loc"];

/// One table row; empty strings where a list has run out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    pub highlight: String,
    pub associated_note: String,
    pub highlight_loc: String,
    pub note: String,
    pub note_loc: String,
    pub bookmark_loc: String,
}

impl CsvRow {
    fn fields(&self) -> [&str; 6] {
        [
            &self.highlight,
            &self.associated_note,
            &self.highlight_loc,
            &self.note,
            &self.note_loc,
            &self.bookmark_loc,
        ]
    }
}

/// For each highlight, the index of the note it claims, if any.
///
/// Walks both (sorted) lists once with a note cursor that only moves forward. For each
/// highlight the cursor skips notes before its start, then the notes at the cursor and
/// just behind it are tried in that order. A note is claimed by at most one highlight.
pub fn associate_notes(highlights: &[Highlight], notes: &[Note]) -> Vec<Option<usize>> {
    let mut claimed = vec![false; notes.len()];
    let mut n_idx = 0;

    highlights
        .iter()
        .map(|highlight| {
            while n_idx < notes.len() && notes[n_idx].loc < highlight.loc_start {
                n_idx += 1;
            }

            let candidates = [Some(n_idx), n_idx.checked_sub(1)];
            let found = candidates.into_iter().flatten().find(|&idx| {
                idx < notes.len() && !claimed[idx] && highlight.spans(notes[idx].loc)
            });

            if let Some(idx) = found {
                claimed[idx] = true;
            }
            found
        })
        .collect()
}

/// Build the data rows (header excluded) for a book
pub fn build_rows(book: &Book) -> Vec<CsvRow> {
    let associations = associate_notes(&book.highlights, &book.notes);
    let row_count = book.highlights.len().max(book.notes.len()).max(book.bookmarks.len());

    (0..row_count)
        .map(|i| {
            let mut row = CsvRow::default();

            if let Some(highlight) = book.highlights.get(i) {
                row.highlight = highlight.content.clone();
                row.highlight_loc = format_range(highlight.loc_start, highlight.loc_end);
                if let Some(note_idx) = associations[i] {
                    row.associated_note = book.notes[note_idx].content.clone();
                }
            }
            if let Some(note) = book.notes.get(i) {
                row.note = note.content.clone();
                row.note_loc = note.loc.to_string();
            }
            if let Some(bookmark) = book.bookmarks.get(i) {
                row.bookmark_loc = bookmark.loc.to_string();
            }

            row
        })
        .collect()
}

/// Full CSV document: the header, then one record per [`build_rows`] entry
pub fn to_csv(book: &Book) -> String {
    let mut out = String::new();
    push_record(&mut out, &CSV_HEADER);
    for row in build_rows(book) {
        push_record(&mut out, &row.fields());
    }
    out
}

/// Concatenate the rows of several books under a single header
pub fn to_combined_csv<'a>(books: impl IntoIterator<Item = &'a Book>) -> String {
    let mut out = String::new();
    push_record(&mut out, &CSV_HEADER);
    for book in books {
        for row in build_rows(book) {
            push_record(&mut out, &row.fields());
        }
    }
    out
}

fn format_range(start: u32, end: u32) -> String {
    if start == end { start.to_string() } else { format!("{}-{}", start, end) }
}

fn push_record(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
    out.push('\n');
}

/// Quote a field when it contains a delimiter, quote or line break (RFC 4180)
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
