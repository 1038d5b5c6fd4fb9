pub mod paths;

pub use paths::{slugify_file_stem, validate_file_size, write_atomically};
