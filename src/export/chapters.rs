use serde::{Deserialize, Serialize};

/// One entry of a book's (possibly nested) chapter outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Chapter {
    pub name: String,
    /// Location (or page) where the chapter starts
    pub loc: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Chapter>,
}

impl Chapter {
    pub fn new(name: impl Into<String>, loc: u32) -> Self {
        Self { name: name.into(), loc, children: Vec::new() }
    }

    pub fn with_children(mut self, children: Vec<Chapter>) -> Self {
        self.children = children;
        self
    }
}

/// Depth-first, pre-order walk over a chapter forest.
///
/// Holds a stack of `(siblings, next index)` frames instead of recursing, so arbitrarily
/// deep outlines are fine. Yields each chapter with its depth (0 for top level).
#[derive(Debug, Clone)]
pub struct ChapterCursor<'a> {
    stack: Vec<(&'a [Chapter], usize)>,
}

impl<'a> ChapterCursor<'a> {
    pub fn new(chapters: &'a [Chapter]) -> Self {
        Self { stack: vec![(chapters, 0)] }
    }

    /// The chapter [`next`](Iterator::next) would return, without advancing
    pub fn peek(&self) -> Option<(usize, &'a Chapter)> {
        let mut cursor = self.clone();
        cursor.next()
    }

    /// Yield every not-yet-visited chapter starting at or before `loc`, in pre-order.
    ///
    /// Stops at the first chapter past `loc`; later siblings and descendants wait for a
    /// later call even if they start earlier.
    pub fn advance_to(&mut self, loc: u32) -> Vec<(usize, &'a Chapter)> {
        let mut reached = Vec::new();
        while let Some((_, chapter)) = self.peek() {
            if chapter.loc > loc {
                break;
            }
            if let Some(entry) = self.next() {
                reached.push(entry);
            }
        }
        reached
    }
}

impl<'a> Iterator for ChapterCursor<'a> {
    type Item = (usize, &'a Chapter);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            let frame = self.stack.last_mut()?;
            let siblings: &'a [Chapter] = frame.0;

            let Some(chapter) = siblings.get(frame.1) else {
                // this level is exhausted, resume the parent
                self.stack.pop();
                continue;
            };
            frame.1 += 1;

            if !chapter.children.is_empty() {
                self.stack.push((&chapter.children, 0));
            }
            return Some((depth, chapter));
        }
    }
}
