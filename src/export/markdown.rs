//! Markdown rendering of a single book.
//!
//! Layout:
//!
//! ```text
//! # Title by Author
//!
//! ---
//!
//! ## Chapter heading
//!
//! > highlighted text
//!
//! * a note
//!   spanning two lines
//! ```
//!
//! Bookmarks carry no text and are left out. Chapter headings come from an optional
//! outline and are interleaved by location with [`ChapterCursor::advance_to`].

use super::chapters::{Chapter, ChapterCursor};
use crate::models::{Book, Item, Located};

/// Render `book` with chapter headings from `chapters` (may be empty).
///
/// A heading is emitted right before the first rendered item located at or after it, so
/// chapters that start after the last highlight or note never appear.
pub fn render_markdown(book: &Book, chapters: &[Chapter]) -> String {
    let mut blocks = vec![header(book), "---".to_string()];
    let mut cursor = ChapterCursor::new(chapters);

    for item in book.items() {
        let Some(body) = render_item(&item) else {
            continue;
        };
        for (depth, chapter) in cursor.advance_to(item.loc()) {
            blocks.push(heading(depth, &chapter.name));
        }
        blocks.push(body);
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

/// Render several books into one document, each with its own outline
pub fn render_combined_markdown<'a>(
    books: impl IntoIterator<Item = (&'a Book, &'a [Chapter])>,
) -> String {
    books
        .into_iter()
        .map(|(book, chapters)| render_markdown(book, chapters))
        .collect::<Vec<_>>()
        .join("\n")
}

fn header(book: &Book) -> String {
    match &book.author {
        Some(author) => format!("# {} by {}", book.title, author),
        None => format!("# {}", book.title),
    }
}

/// Top-level chapters are `##`, one more `#` per nesting level
fn heading(depth: usize, name: &str) -> String {
    format!("{} {}", "#".repeat(depth + 2), name)
}

fn render_item(item: &Item<'_>) -> Option<String> {
    match item {
        Item::Highlight(h) => Some(prefix_lines(&h.content, "> ", "> ")),
        Item::Note(n) => Some(prefix_lines(&n.content, "* ", "  ")),
        Item::Bookmark(_) => None,
    }
}

fn prefix_lines(content: &str, first: &str, rest: &str) -> String {
    let mut out = String::with_capacity(content.len() + first.len());
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let prefix = if i == 0 { first } else { rest };
        if line.is_empty() {
            out.push_str(prefix.trim_end());
        } else {
            out.push_str(prefix);
            out.push_str(line);
        }
    }
    out
}
