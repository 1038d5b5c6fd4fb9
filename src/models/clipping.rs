use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Unit a Kindle declaration line counts positions in.
///
/// Reflowable books use locations, fixed-layout documents (PDFs) use pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocType {
    Page,
    Location,
}

impl LocType {
    /// Largest start-location distance at which two highlights may still be duplicates
    pub fn dedup_window(self) -> u32 {
        match self {
            LocType::Page => 1,
            LocType::Location => 10,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LocType::Page => "page",
            LocType::Location => "location",
        }
    }
}

impl fmt::Display for LocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocType {
    type Err = String;

    /// Accepts the tokens Kindle has used over time (`page`, `Location`, `Loc.`), ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "page" => Ok(LocType::Page),
            "location" | "loc." | "loc" => Ok(LocType::Location),
            other => Err(format!("unknown location type '{}'", other)),
        }
    }
}

/// The three record shapes a clippings section can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClippingKind {
    Highlight,
    Note,
    Bookmark,
}

impl fmt::Display for ClippingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClippingKind::Highlight => "highlight",
            ClippingKind::Note => "note",
            ClippingKind::Bookmark => "bookmark",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub loc_start: u32,
    pub loc_end: u32,
    pub loc_type: LocType,
    pub added_at: NaiveDateTime,
    pub content: String,
}

impl Highlight {
    pub fn spans(&self, loc: u32) -> bool {
        self.loc_start <= loc && loc <= self.loc_end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub loc: u32,
    pub loc_type: LocType,
    pub added_at: NaiveDateTime,
    /// May span several lines, including blank ones
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub loc: u32,
    pub loc_type: LocType,
    pub added_at: NaiveDateTime,
}

/// A single parsed clipping, before it is attached to its book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clipping {
    Highlight(Highlight),
    Note(Note),
    Bookmark(Bookmark),
}

/// Ordering key shared by every clipping type: `(loc, added_at)`.
///
/// For highlights `loc` is the start location.
pub trait Located {
    fn loc(&self) -> u32;
    fn added_at(&self) -> NaiveDateTime;

    fn sort_key(&self) -> (u32, NaiveDateTime) {
        (self.loc(), self.added_at())
    }
}

impl Located for Highlight {
    fn loc(&self) -> u32 {
        self.loc_start
    }

    fn added_at(&self) -> NaiveDateTime {
        self.added_at
    }
}

impl Located for Note {
    fn loc(&self) -> u32 {
        self.loc
    }

    fn added_at(&self) -> NaiveDateTime {
        self.added_at
    }
}

impl Located for Bookmark {
    fn loc(&self) -> u32 {
        self.loc
    }

    fn added_at(&self) -> NaiveDateTime {
        self.added_at
    }
}
