use std::ffi::OsString;
use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result, bail};

// Maximum size of a clippings file: 64MB
const MAX_FILE_SIZE_BYTES: u64 = 64 * 1024 * 1024;

// Keeps generated file names portable across filesystems
const MAX_FILE_STEM_CHARS: usize = 100;

/// Validates that a file's size is within acceptable limits (64MB)
///
/// Takes an open file handle to avoid TOCTOU (time-of-check-time-of-use)
/// race conditions where the file could be modified between the size check
/// and subsequent file operations.
///
/// # Errors
///
/// Returns an error if:
/// - The file metadata cannot be read
/// - The file is larger than 64MB
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(())
}

/// Turns a book title into a file stem safe on every common filesystem
///
/// Keeps letters and digits (any script), maps runs of anything else to a single `-`,
/// and lowercases the result. Falls back to `untitled` when nothing is left.
///
/// # Examples
///
/// ```
/// use clippings_explorer::utils::slugify_file_stem;
///
/// assert_eq!(slugify_file_stem("Fahrenheit 451: A Novel"), "fahrenheit-451-a-novel");
/// assert_eq!(slugify_file_stem("???"), "untitled");
/// ```
pub fn slugify_file_stem(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    let slug: String = slug.chars().take(MAX_FILE_STEM_CHARS).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() { "untitled".to_string() } else { slug.to_string() }
}

/// Write `contents` to `path` atomically (temp file + rename)
///
/// # Errors
///
/// Returns an error if the temp file cannot be written or renamed into place.
pub fn write_atomically(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    let mut temp_name = path.file_name().map(OsString::from).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move temp file into place: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::{NamedTempFile, TempDir};

    use super::*;

    #[test]
    fn test_validate_file_size_small_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"small clippings file").unwrap();
        file.flush().unwrap();

        let handle = File::open(file.path()).unwrap();
        assert!(validate_file_size(&handle, file.path()).is_ok());
    }

    #[test]
    fn test_validate_file_size_too_large() {
        let file = NamedTempFile::new().unwrap();
        // sparse file: sets the length without writing the bytes
        file.as_file().set_len(MAX_FILE_SIZE_BYTES + 1).unwrap();

        let handle = File::open(file.path()).unwrap();
        let err = validate_file_size(&handle, file.path()).unwrap_err();
        assert!(err.to_string().contains("File too large"));
    }

    #[test]
    fn test_slugify_basic_titles() {
        assert_eq!(slugify_file_stem("Dune"), "dune");
        assert_eq!(slugify_file_stem("  The Left Hand of Darkness "), "the-left-hand-of-darkness");
        assert_eq!(slugify_file_stem("Fahrenheit 451: A Novel"), "fahrenheit-451-a-novel");
    }

    #[test]
    fn test_slugify_keeps_non_ascii_letters() {
        assert_eq!(slugify_file_stem("Cien años de soledad"), "cien-años-de-soledad");
    }

    #[test]
    fn test_slugify_strips_path_separators() {
        assert_eq!(slugify_file_stem("../../etc/passwd"), "etc-passwd");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify_file_stem(""), "untitled");
        assert_eq!(slugify_file_stem("!!!"), "untitled");
    }

    #[test]
    fn test_slugify_truncates_long_titles() {
        let title = "word ".repeat(100);
        let slug = slugify_file_stem(&title);
        assert!(slug.chars().count() <= MAX_FILE_STEM_CHARS);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_write_atomically_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.md");

        write_atomically(&path, "first").unwrap();
        write_atomically(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join("out.md.tmp").exists());
    }
}
