//! JSON representation of a book collection.
//!
//! Shape per book: `{title, author, dateStart, dateEnd, items: [...]}` where `items` is the
//! merged, location-sorted union of highlights, notes and bookmarks. Each item carries a
//! `type` tag plus `loc`, `locEnd` (highlights), `locType`, `dateStr` and `content`
//! (highlights and notes).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{Book, Bookmark, Highlight, Item, LocType, Note};
use crate::utils::write_atomically;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    pub author: Option<String>,
    #[serde(
        default,
        serialize_with = "crate::parsers::deserializers::serialize_optional_date_str",
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_date_str"
    )]
    pub date_start: Option<NaiveDateTime>,
    #[serde(
        default,
        serialize_with = "crate::parsers::deserializers::serialize_optional_date_str",
        deserialize_with = "crate::parsers::deserializers::deserialize_optional_date_str"
    )]
    pub date_end: Option<NaiveDateTime>,
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemRecord {
    #[serde(rename_all = "camelCase")]
    Highlight {
        loc: u32,
        loc_end: u32,
        loc_type: LocType,
        #[serde(
            serialize_with = "crate::parsers::deserializers::serialize_date_str",
            deserialize_with = "crate::parsers::deserializers::deserialize_date_str"
        )]
        date_str: NaiveDateTime,
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    Note {
        loc: u32,
        loc_type: LocType,
        #[serde(
            serialize_with = "crate::parsers::deserializers::serialize_date_str",
            deserialize_with = "crate::parsers::deserializers::deserialize_date_str"
        )]
        date_str: NaiveDateTime,
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    Bookmark {
        loc: u32,
        loc_type: LocType,
        #[serde(
            serialize_with = "crate::parsers::deserializers::serialize_date_str",
            deserialize_with = "crate::parsers::deserializers::deserialize_date_str"
        )]
        date_str: NaiveDateTime,
    },
}

impl From<Item<'_>> for ItemRecord {
    fn from(item: Item<'_>) -> Self {
        match item {
            Item::Highlight(h) => ItemRecord::Highlight {
                loc: h.loc_start,
                loc_end: h.loc_end,
                loc_type: h.loc_type,
                date_str: h.added_at,
                content: h.content.clone(),
            },
            Item::Note(n) => ItemRecord::Note {
                loc: n.loc,
                loc_type: n.loc_type,
                date_str: n.added_at,
                content: n.content.clone(),
            },
            Item::Bookmark(b) => {
                ItemRecord::Bookmark { loc: b.loc, loc_type: b.loc_type, date_str: b.added_at }
            }
        }
    }
}

impl From<&Book> for BookRecord {
    fn from(book: &Book) -> Self {
        let range = book.date_range();
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            date_start: range.map(|(start, _)| start),
            date_end: range.map(|(_, end)| end),
            items: book.items().into_iter().map(ItemRecord::from).collect(),
        }
    }
}

impl TryFrom<BookRecord> for Book {
    type Error = anyhow::Error;

    /// Rebuild a book, restoring each item to its typed list in record order
    fn try_from(record: BookRecord) -> Result<Self> {
        let mut book = Book::new(record.title, record.author);

        for item in record.items {
            match item {
                ItemRecord::Highlight { loc, loc_end, loc_type, date_str, content } => {
                    anyhow::ensure!(
                        loc_end >= loc,
                        "highlight in '{}' ends ({}) before it starts ({})",
                        book.title,
                        loc_end,
                        loc
                    );
                    book.highlights.push(Highlight {
                        loc_start: loc,
                        loc_end,
                        loc_type,
                        added_at: date_str,
                        content,
                    });
                }
                ItemRecord::Note { loc, loc_type, date_str, content } => {
                    book.notes.push(Note { loc, loc_type, added_at: date_str, content });
                }
                ItemRecord::Bookmark { loc, loc_type, date_str } => {
                    book.bookmarks.push(Bookmark { loc, loc_type, added_at: date_str });
                }
            }
        }

        Ok(book)
    }
}

/// Serialize books as a pretty-printed JSON array
pub fn books_to_json(books: &[Book]) -> Result<String> {
    let records: Vec<BookRecord> = books.iter().map(BookRecord::from).collect();
    serde_json::to_string_pretty(&records).context("Failed to serialize books to JSON")
}

/// Parse a JSON array previously produced by [`books_to_json`]
pub fn books_from_json(json: &str) -> Result<Vec<Book>> {
    let records: Vec<BookRecord> =
        serde_json::from_str(json).context("Failed to parse books JSON")?;
    records.into_iter().map(Book::try_from).collect()
}

/// Write books to `path` as JSON (atomically)
pub fn write_json(path: &Path, books: &[Book]) -> Result<()> {
    write_atomically(path, books_to_json(books)?)
}

pub fn read_json(path: &Path) -> Result<Vec<Book>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {}", path.display()))?;
    books_from_json(&json)
}
