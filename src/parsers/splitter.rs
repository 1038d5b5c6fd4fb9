use thiserror::Error;

/// Line separating consecutive clippings
pub const DELIMITER: &str = "==========";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Raw lines between two delimiters, blank lines included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// 1-based line number of `lines[0]`
    pub start_line: usize,
    pub lines: Vec<String>,
}

impl Section {
    /// 1-based line number of the last line (equal to `start_line` for an empty section)
    pub fn end_line(&self) -> usize {
        self.start_line + self.lines.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// Non-blank lines were left over after the final delimiter
    #[error("{} line(s) after the last delimiter were never closed", .0.lines.len())]
    Truncated(Section),
}

/// Lazy iterator over the delimiter-bounded sections of a clippings file.
///
/// Yields at most one [`SplitError::Truncated`], as its final item, then stays exhausted.
pub struct Sections<I> {
    lines: I,
    line_num: usize,
    pending: Vec<String>,
    pending_start: usize,
    finished: bool,
}

/// Split raw lines into sections on [`DELIMITER`] lines
pub fn split_sections<I, S>(lines: I) -> Sections<I::IntoIter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Sections {
        lines: lines.into_iter(),
        line_num: 0,
        pending: Vec::new(),
        pending_start: 1,
        finished: false,
    }
}

impl<I, S> Iterator for Sections<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Result<Section, SplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        for raw in self.lines.by_ref() {
            self.line_num += 1;
            // Kindle prefixes many title lines with a BOM
            let line = raw.as_ref().trim_start_matches(BYTE_ORDER_MARK).trim_end_matches('\r');

            if line.trim_end() == DELIMITER {
                let section = Section {
                    start_line: self.pending_start,
                    lines: std::mem::take(&mut self.pending),
                };
                self.pending_start = self.line_num + 1;
                return Some(Ok(section));
            }

            self.pending.push(line.to_string());
        }

        self.finished = true;
        if self.pending.iter().any(|line| !line.trim().is_empty()) {
            let section = Section {
                start_line: self.pending_start,
                lines: std::mem::take(&mut self.pending),
            };
            return Some(Err(SplitError::Truncated(section)));
        }

        None
    }
}
