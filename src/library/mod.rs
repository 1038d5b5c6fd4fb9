//! Book collection building
//!
//! Combines the section parser with a [`BookRegistry`] to turn a whole clippings file into
//! per-book records, then finalizes (sorts and dedups) them.
//!
//! - **Graceful degradation**: failed sections are collected in [`ParseOutcome::failures`]
//!   instead of aborting, so callers can decide whether partial data is good enough.
//! - **Parallel finalize**: each book is sorted independently with rayon.

pub mod builder;
pub mod registry;

pub use builder::{
    ParseOutcome, finalize_books, parse_clippings_file, parse_clippings_file_with,
    parse_clippings_str, parse_lines,
};
pub use registry::{BookRegistry, split_identifier};
