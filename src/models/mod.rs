//! Data models for parsed Kindle clippings.
//!
//! - [`Highlight`], [`Note`], [`Bookmark`] - one record per clippings section
//! - [`Book`] - per-book aggregate owning the three ordered lists
//! - [`Located`] - the `(loc, added_at)` ordering key shared by every record
//!
//! The serialized JSON shape lives in [`crate::export::json`]. Only the small tag enums
//! ([`LocType`], [`ClippingKind`]) derive serde here; the record structs do not.

pub mod book;
pub mod clipping;

pub use book::{Book, Item};
pub use clipping::{Bookmark, Clipping, ClippingKind, Highlight, LocType, Located, Note};
