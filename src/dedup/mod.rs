//! Near-duplicate detection for sorted clipping lists.
//!
//! Kindle never rewrites "My Clippings.txt": editing a note or extending a highlight
//! appends a fresh record next to the stale one. After sorting, those versions sit
//! next to each other, so a single pass over adjacent pairs removes them.
//!
//! Only neighbours are compared. Two versions separated by an unrelated clipping at the
//! same location both survive.

pub mod similarity;

use similarity::{contains_either, mostly_overlaps, word_count};

use crate::models::{Bookmark, Highlight, Note};

/// Minimum word count before a highlight is compared by overlap instead of containment
const HIGHLIGHT_OVERLAP_MIN_WORDS: usize = 5;
/// Minimum word count (for both notes) before notes are compared by overlap
const NOTE_OVERLAP_MIN_WORDS: usize = 6;

/// Decides whether a clipping is a stale version of the one that follows it
pub trait Deduplicate {
    fn is_duplicate(&self, next: &Self) -> bool;
}

impl Deduplicate for Bookmark {
    fn is_duplicate(&self, next: &Self) -> bool {
        self.loc == next.loc
    }
}

impl Deduplicate for Note {
    fn is_duplicate(&self, next: &Self) -> bool {
        if self.loc != next.loc {
            return false;
        }
        if contains_either(&self.content, &next.content) {
            return true;
        }

        word_count(&self.content) >= NOTE_OVERLAP_MIN_WORDS
            && word_count(&next.content) >= NOTE_OVERLAP_MIN_WORDS
            && mostly_overlaps(&self.content, &next.content)
    }
}

impl Deduplicate for Highlight {
    fn is_duplicate(&self, next: &Self) -> bool {
        if self.loc_start.abs_diff(next.loc_start) > self.loc_type.dedup_window() {
            return false;
        }
        if contains_either(&self.content, &next.content) {
            return true;
        }

        word_count(&self.content) >= HIGHLIGHT_OVERLAP_MIN_WORDS
            && mostly_overlaps(&self.content, &next.content)
    }
}

/// Drop every element that is a duplicate of its successor, keeping the later one.
///
/// Walks from the back, comparing each element with the nearest later element that
/// survived. Every remaining adjacent pair has therefore been checked and found distinct,
/// so a second pass removes nothing.
pub fn dedup_adjacent<T: Deduplicate>(items: &mut Vec<T>) {
    if items.len() < 2 {
        return;
    }

    let mut keep = vec![true; items.len()];
    let mut successor = items.len() - 1;
    for i in (0..items.len() - 1).rev() {
        if items[i].is_duplicate(&items[successor]) {
            keep[i] = false;
        } else {
            successor = i;
        }
    }

    let mut flags = keep.into_iter();
    items.retain(|_| flags.next().unwrap_or(true));
}
