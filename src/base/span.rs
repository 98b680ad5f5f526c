//! Source text positions and incremental line bookkeeping.

// Re-export from text-size for compatibility
pub use text_size::TextRange;
pub use text_size::TextSize;

/// A running 1-based line counter that only ever moves forward.
///
/// Each call to [`LineCounter::advance_to`] counts the newlines between the
/// previously reached offset and the new one, so a whole scan reads every
/// byte of the source at most once no matter how many tokens it reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineCounter {
    /// Current 1-indexed line
    line: u32,
    /// Byte offset the line count is valid for
    pos: TextSize,
}

impl LineCounter {
    /// Create a counter positioned at the start of line 1.
    pub fn new() -> Self {
        Self {
            line: 1,
            pos: TextSize::from(0),
        }
    }

    /// Current 1-indexed line number.
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Byte offset the counter was last advanced to.
    #[inline]
    pub fn offset(&self) -> TextSize {
        self.pos
    }

    /// Move the counter to `offset` and return the line it lies on.
    ///
    /// Offsets behind the current position leave the counter untouched.
    pub fn advance_to(&mut self, text: &str, offset: TextSize) -> u32 {
        if offset > self.pos {
            let start = usize::from(self.pos);
            let end = usize::from(offset).min(text.len());
            let newlines = text
                .as_bytes()
                .get(start..end)
                .map_or(0, |bytes| bytes.iter().filter(|&&b| b == b'\n').count());
            let newlines = u32::try_from(newlines).unwrap_or(u32::MAX);
            self.line = self.line.saturating_add(newlines);
            self.pos = offset;
        }
        self.line
    }
}

impl Default for LineCounter {
    fn default() -> Self {
        Self::new()
    }
}
