use std::collections::HashMap;

use tracing::debug;

use crate::models::Book;

/// Maps raw identifier lines to books, preserving first-seen order.
///
/// The key is the identifier exactly as written, so two spellings of the same
/// title/author become two books.
#[derive(Debug, Default)]
pub struct BookRegistry {
    index: HashMap<String, usize>,
    books: Vec<Book>,
}

impl BookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book registered under `raw_id`, created on first sight
    pub fn get_or_create(&mut self, raw_id: &str) -> &mut Book {
        let idx = match self.index.get(raw_id) {
            Some(&idx) => idx,
            None => {
                let (title, author) = split_identifier(raw_id);
                debug!(title = %title, author = ?author, "found new book");
                self.books.push(Book::new(title, author));
                let idx = self.books.len() - 1;
                self.index.insert(raw_id.to_string(), idx);
                idx
            }
        };
        &mut self.books[idx]
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Books in the order their identifiers first appeared
    pub fn into_books(self) -> Vec<Book> {
        self.books
    }
}

/// Split `Title (Author)` into its parts.
///
/// Only applies when the line ends with `)` and contains `" ("`; the author is the text
/// after the last `" ("`. Anything else is all title.
pub fn split_identifier(raw_id: &str) -> (String, Option<String>) {
    if raw_id.ends_with(')') {
        if let Some(open) = raw_id.rfind(" (") {
            let title = raw_id[..open].trim().to_string();
            let author = raw_id[open + 2..raw_id.len() - 1].trim();
            let author = (!author.is_empty()).then(|| author.to_string());
            return (title, author);
        }
    }

    (raw_id.trim().to_string(), None)
}
