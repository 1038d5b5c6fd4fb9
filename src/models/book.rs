use chrono::NaiveDateTime;

use super::clipping::{Bookmark, Clipping, Highlight, Located, Note};
use crate::dedup::dedup_adjacent;

/// All clippings recorded for one book.
///
/// The three lists are only mutated by [`Book::push`] while parsing, and afterwards by
/// [`Book::sort`], [`Book::dedup`] and [`Book::cut`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub author: Option<String>,
    pub highlights: Vec<Highlight>,
    pub notes: Vec<Note>,
    pub bookmarks: Vec<Bookmark>,
}

/// Borrowed view of one clipping in a book's merged item stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<'a> {
    Highlight(&'a Highlight),
    Note(&'a Note),
    Bookmark(&'a Bookmark),
}

impl Located for Item<'_> {
    fn loc(&self) -> u32 {
        match self {
            Item::Highlight(h) => h.loc(),
            Item::Note(n) => n.loc(),
            Item::Bookmark(b) => b.loc(),
        }
    }

    fn added_at(&self) -> NaiveDateTime {
        match self {
            Item::Highlight(h) => h.added_at,
            Item::Note(n) => n.added_at,
            Item::Bookmark(b) => b.added_at,
        }
    }
}

impl Book {
    pub fn new(title: impl Into<String>, author: Option<String>) -> Self {
        Self {
            title: title.into(),
            author,
            highlights: Vec::new(),
            notes: Vec::new(),
            bookmarks: Vec::new(),
        }
    }

    /// Append a clipping to the list matching its type
    pub fn push(&mut self, clipping: Clipping) {
        match clipping {
            Clipping::Highlight(h) => self.highlights.push(h),
            Clipping::Note(n) => self.notes.push(n),
            Clipping::Bookmark(b) => self.bookmarks.push(b),
        }
    }

    /// Total number of clippings across all three lists
    pub fn len(&self) -> usize {
        self.highlights.len() + self.notes.len() + self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `Title by Author`, or just the title when the author is unknown
    pub fn display_name(&self) -> String {
        match &self.author {
            Some(author) => format!("{} by {}", self.title, author),
            None => self.title.clone(),
        }
    }

    /// Stable-sort each list by `(loc, added_at)`, then optionally drop near-duplicates.
    ///
    /// Equal keys keep their insertion order, which dedup relies on since it only
    /// ever compares neighbours.
    pub fn sort(&mut self, remove_dups: bool) {
        self.highlights.sort_by_key(Located::sort_key);
        self.notes.sort_by_key(Located::sort_key);
        self.bookmarks.sort_by_key(Located::sort_key);

        if remove_dups {
            self.dedup();
        }
    }

    /// Remove adjacent near-duplicates from each list, keeping the later element.
    ///
    /// Expects the lists to already be sorted.
    pub fn dedup(&mut self) {
        dedup_adjacent(&mut self.highlights);
        dedup_adjacent(&mut self.notes);
        dedup_adjacent(&mut self.bookmarks);
    }

    /// Earliest and latest `added_at` over every clipping, `None` for an empty book
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let dates = self
            .highlights
            .iter()
            .map(|h| h.added_at)
            .chain(self.notes.iter().map(|n| n.added_at))
            .chain(self.bookmarks.iter().map(|b| b.added_at));

        dates.fold(None, |range, date| match range {
            None => Some((date, date)),
            Some((start, end)) => Some((start.min(date), end.max(date))),
        })
    }

    /// Keep only clippings added within the inclusive `[since, until]` bounds.
    ///
    /// A missing bound leaves that side open.
    pub fn cut(&mut self, since: Option<NaiveDateTime>, until: Option<NaiveDateTime>) {
        let in_range = |date: NaiveDateTime| {
            since.is_none_or(|since| date >= since) && until.is_none_or(|until| date <= until)
        };

        self.highlights.retain(|h| in_range(h.added_at));
        self.notes.retain(|n| in_range(n.added_at));
        self.bookmarks.retain(|b| in_range(b.added_at));
    }

    /// Non-destructive [`Book::cut`]
    pub fn cut_copy(&self, since: Option<NaiveDateTime>, until: Option<NaiveDateTime>) -> Book {
        let mut copy = self.clone();
        copy.cut(since, until);
        copy
    }

    /// Union of all three lists, stably sorted by `(loc, added_at)`.
    ///
    /// At equal keys highlights come before notes, and notes before bookmarks.
    pub fn items(&self) -> Vec<Item<'_>> {
        let mut items: Vec<Item<'_>> = Vec::with_capacity(self.len());
        items.extend(self.highlights.iter().map(Item::Highlight));
        items.extend(self.notes.iter().map(Item::Note));
        items.extend(self.bookmarks.iter().map(Item::Bookmark));
        items.sort_by_key(Located::sort_key);
        items
    }
}
