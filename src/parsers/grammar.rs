//! Declaration-line grammars.
//!
//! Kindle firmware has punctuated the second line of a clipping in several ways over the
//! years. Each [`Grammar`] recognizes one of them for one clipping type; a
//! [`GrammarSet`] holds them in priority order and the first match wins.
//!
//! Every pattern must expose the named groups `loctype`, `start` and `date`, and may
//! expose `end` for ranged highlights.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ClippingKind, LocType};

/// Built-in patterns, in the order they are tried for each kind
const KINDLE_PATTERNS: &[(ClippingKind, &str)] = &[
    // - Your Highlight on Location 10-12 | Added on Monday, January 1, 2020 10:00:00 AM
    (
        ClippingKind::Highlight,
        r"(?i)^- Your Highlight on (?P<loctype>page|location) (?P<start>\d+)(?:-(?P<end>\d+))? \| Added on (?P<date>.+)$",
    ),
    // - Your Highlight on page 12 | Location 180-181 | Added on ...
    (
        ClippingKind::Highlight,
        r"(?i)^- Your Highlight on page \S+ \| (?P<loctype>location) (?P<start>\d+)(?:-(?P<end>\d+))? \| Added on (?P<date>.+)$",
    ),
    // - Your Highlight Loc. 10-12  | Added on ...
    (
        ClippingKind::Highlight,
        r"(?i)^- Your Highlight (?:on )?(?P<loctype>loc\.|location|page) (?P<start>\d+)(?:-(?P<end>\d+))?\s*\|\s*Added on (?P<date>.+)$",
    ),
    (
        ClippingKind::Note,
        r"(?i)^- Your Note on (?P<loctype>page|location) (?P<start>\d+) \| Added on (?P<date>.+)$",
    ),
    (
        ClippingKind::Note,
        r"(?i)^- Your Note on page \S+ \| (?P<loctype>location) (?P<start>\d+) \| Added on (?P<date>.+)$",
    ),
    (
        ClippingKind::Note,
        r"(?i)^- Your Note (?:on )?(?P<loctype>loc\.|location|page) (?P<start>\d+)\s*\|\s*Added on (?P<date>.+)$",
    ),
    (
        ClippingKind::Bookmark,
        r"(?i)^- Your Bookmark on (?P<loctype>page|location) (?P<start>\d+) \| Added on (?P<date>.+)$",
    ),
    (
        ClippingKind::Bookmark,
        r"(?i)^- Your Bookmark on page \S+ \| (?P<loctype>location) (?P<start>\d+) \| Added on (?P<date>.+)$",
    ),
    (
        ClippingKind::Bookmark,
        r"(?i)^- Your Bookmark (?:on )?(?P<loctype>loc\.|location|page) (?P<start>\d+)\s*\|\s*Added on (?P<date>.+)$",
    ),
];

static KINDLE_GRAMMARS: LazyLock<GrammarSet> = LazyLock::new(|| {
    GrammarSet::from_patterns(KINDLE_PATTERNS).expect("built-in declaration patterns are valid")
});

/// Fields pulled out of a declaration line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub loc_type: LocType,
    pub loc_start: u32,
    /// Only present when the line gave a range
    pub loc_end: Option<u32>,
    /// Raw date text, parsed separately
    pub date: String,
}

/// One declaration layout for one clipping type
#[derive(Debug, Clone)]
pub struct Grammar {
    kind: ClippingKind,
    pattern: Regex,
}

impl Grammar {
    pub fn new(kind: ClippingKind, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self { kind, pattern: Regex::new(pattern)? })
    }

    /// Extract the declaration fields, or `None` if the line does not fit this layout
    pub fn extract(&self, line: &str) -> Option<Declaration> {
        let caps = self.pattern.captures(line)?;

        let loc_type = caps.name("loctype")?.as_str().parse::<LocType>().ok()?;
        let loc_start = caps.name("start")?.as_str().parse::<u32>().ok()?;
        let loc_end = match caps.name("end") {
            Some(end) => Some(resolve_loc_end(loc_start, end.as_str())?),
            None => None,
        };
        let date = caps.name("date")?.as_str().trim().to_string();

        Some(Declaration { loc_type, loc_start, loc_end, date })
    }
}

/// Older firmware abbreviates range ends (`1290-92`), keeping only the changed
/// trailing digits. Rebuild the full value from the start, carrying when needed.
fn resolve_loc_end(start: u32, end: &str) -> Option<u32> {
    let value = end.parse::<u32>().ok()?;
    if value >= start {
        return Some(value);
    }

    let modulus = 10u32.checked_pow(u32::try_from(end.len()).ok()?)?;
    let resolved = (start - start % modulus).checked_add(value)?;
    if resolved >= start { Some(resolved) } else { resolved.checked_add(modulus) }
}

/// Ordered collection of grammars, consulted per clipping type
#[derive(Debug, Clone, Default)]
pub struct GrammarSet {
    grammars: Vec<Grammar>,
}

impl GrammarSet {
    pub fn new(grammars: Vec<Grammar>) -> Self {
        Self { grammars }
    }

    /// Compile `(kind, pattern)` pairs, keeping their order
    pub fn from_patterns(patterns: &[(ClippingKind, &str)]) -> Result<Self, regex::Error> {
        let grammars = patterns
            .iter()
            .map(|(kind, pattern)| Grammar::new(*kind, pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { grammars })
    }

    /// Every declaration layout known to appear in Kindle exports
    pub fn kindle() -> Self {
        KINDLE_GRAMMARS.clone()
    }

    /// Append a lower-priority grammar
    pub fn push(&mut self, grammar: Grammar) {
        self.grammars.push(grammar);
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    /// First successful extraction among the grammars registered for `kind`
    pub fn match_declaration(&self, kind: ClippingKind, line: &str) -> Option<Declaration> {
        self.grammars.iter().filter(|g| g.kind == kind).find_map(|g| g.extract(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kindle(kind: ClippingKind, line: &str) -> Option<Declaration> {
        GrammarSet::kindle().match_declaration(kind, line)
    }

    #[test]
    fn test_highlight_with_location_range() {
        let decl = kindle(
            ClippingKind::Highlight,
            "- Your Highlight on Location 10-12 | Added on Monday, January 1, 2020 10:00:00 AM",
        )
        .unwrap();
        assert_eq!(decl.loc_type, LocType::Location);
        assert_eq!(decl.loc_start, 10);
        assert_eq!(decl.loc_end, Some(12));
        assert_eq!(decl.date, "Monday, January 1, 2020 10:00:00 AM");
    }

    #[test]
    fn test_highlight_with_single_page() {
        let line = "- Your Highlight on page 7 | Added on Sunday, 5 January 2020 18:02:11";
        let decl = kindle(ClippingKind::Highlight, line).unwrap();
        assert_eq!(decl.loc_type, LocType::Page);
        assert_eq!(decl.loc_start, 7);
        assert_eq!(decl.loc_end, None);
    }

    #[test]
    fn test_page_and_location_prefers_location() {
        let decl = kindle(
            ClippingKind::Highlight,
            "- Your Highlight on page 12 | Location 180-181 | Added on May 1, 2020 8:00:00 AM",
        )
        .unwrap();
        assert_eq!(decl.loc_type, LocType::Location);
        assert_eq!((decl.loc_start, decl.loc_end), (180, Some(181)));
    }

    #[test]
    fn test_legacy_loc_abbreviation() {
        let line = "- Your Highlight Loc. 1290-92  | Added on Thursday, April 21, 2011 07:30:00 PM";
        let decl = kindle(ClippingKind::Highlight, line).unwrap();
        assert_eq!(decl.loc_type, LocType::Location);
        assert_eq!(decl.loc_start, 1290);
        assert_eq!(decl.loc_end, Some(1292));
    }

    #[test]
    fn test_abbreviated_range_end_carries() {
        assert_eq!(resolve_loc_end(1299, "05"), Some(1305));
        assert_eq!(resolve_loc_end(10, "12"), Some(12));
        assert_eq!(resolve_loc_end(10, "10"), Some(10));
    }

    #[test]
    fn test_abbreviated_range_end_overflow_is_rejected() {
        assert_eq!(resolve_loc_end(u32::MAX, "999999999"), None);
        assert_eq!(resolve_loc_end(u32::MAX, "3"), None);
        let line = "- Your Highlight on Location 4294967295-999999999 | Added on January 1, 2020";
        assert!(kindle(ClippingKind::Highlight, line).is_none());
    }

    #[test]
    fn test_note_and_bookmark_declarations() {
        let line = "- Your Note on Location 55 | Added on Monday, January 1, 2020 10:00:00 AM";
        let note = kindle(ClippingKind::Note, line).unwrap();
        assert_eq!((note.loc_type, note.loc_start), (LocType::Location, 55));

        let line = "- Your Bookmark on page 5 | Added on Monday, January 1, 2020 10:00:00 AM";
        let bookmark = kindle(ClippingKind::Bookmark, line).unwrap();
        assert_eq!((bookmark.loc_type, bookmark.loc_start), (LocType::Page, 5));
    }

    #[test]
    fn test_grammars_are_scoped_by_kind() {
        let line = "- Your Bookmark on page 5 | Added on Monday, January 1, 2020 10:00:00 AM";
        assert!(kindle(ClippingKind::Highlight, line).is_none());
        assert!(kindle(ClippingKind::Note, line).is_none());
    }

    #[test]
    fn test_roman_numeral_pages_do_not_match() {
        let line = "- Your Bookmark on page xiv | Added on Monday, January 1, 2020";
        assert!(kindle(ClippingKind::Bookmark, line).is_none());
    }

    #[test]
    fn test_injected_grammar_set_is_used_in_order() {
        let set = GrammarSet::from_patterns(&[
            (
                ClippingKind::Note,
                r"^- Your Note at (?P<loctype>page) (?P<start>\d+) on (?P<date>.+)$",
            ),
            (
                ClippingKind::Note,
                r"^- Your Note .*(?P<loctype>location) (?P<start>\d+) on (?P<date>.+)$",
            ),
        ])
        .unwrap();
        assert_eq!(set.len(), 2);

        let line = "- Your Note at page 3 on 2020";
        let decl = set.match_declaration(ClippingKind::Note, line).unwrap();
        assert_eq!((decl.loc_type, decl.loc_start), (LocType::Page, 3));
        let empty = GrammarSet::default();
        assert!(empty.match_declaration(ClippingKind::Note, line).is_none());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        assert!(Grammar::new(ClippingKind::Note, "(unclosed").is_err());
    }
}
