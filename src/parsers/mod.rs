//! Parsers for Kindle "My Clippings.txt" exports
//!
//! # Pipeline
//!
//! 1. [`splitter`] cuts the raw lines into delimiter-bounded [`Section`]s.
//! 2. [`section`] classifies each section as a highlight, note or bookmark and extracts
//!    its fields using the ordered [`GrammarSet`] from [`grammar`].
//! 3. [`dates`] turns the free-form "Added on ..." text into a timestamp.
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach suitable for CLI tools:
//!
//! - **Individual section failures**: A section that cannot be parsed produces a typed
//!   [`ParseError`] and is skipped. One bad section never prevents extraction of the rest
//!   of the file.
//!
//! - **Context for humans**: Failures are wrapped in [`SectionFailure`] with the line
//!   range and raw lines, so the grammar list can be extended when Kindle invents a new
//!   layout.
//!
//! - **Fatal errors**: Only an unreadable or oversized input file aborts the run; those
//!   propagate as `anyhow::Error` from [`crate::library`].

pub mod dates;
pub mod deserializers;
pub mod error;
pub mod grammar;
pub mod section;
pub mod splitter;

pub use dates::{DATE_STR_FORMAT, format_date_str, parse_kindle_date};
pub use error::{ParseError, SectionFailure};
pub use grammar::{Declaration, Grammar, GrammarSet};
pub use section::{ClippingsParser, ParsedSection};
pub use splitter::{DELIMITER, Section, Sections, SplitError, split_sections};
