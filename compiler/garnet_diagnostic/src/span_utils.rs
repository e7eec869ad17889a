//! Line and column lookup for spans.
//!
//! Spans are byte offsets; [`LineOffsetTable`] turns them into 1-based
//! line and column pairs with a binary search over line starts.

use garnet_ir::Span;

/// Pre-computed line start offsets.
///
/// The scanner extends the table incrementally as it pulls lines from the
/// line source, so it never needs the whole buffer up front.
///
/// # Example
///
/// ```
/// use garnet_diagnostic::span_utils::LineOffsetTable;
///
/// let source = b"line1\nline2\nline3";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 6), (2, 1));
/// assert_eq!(table.offset_to_line_col(source, 14), (3, 3));
/// ```
#[derive(Clone, Debug)]
pub struct LineOffsetTable {
    /// `offsets[i]` is the byte offset where line `i + 1` starts.
    offsets: Vec<u32>,
}

impl Default for LineOffsetTable {
    fn default() -> Self {
        LineOffsetTable { offsets: vec![0] }
    }
}

impl LineOffsetTable {
    pub fn build(source: &[u8]) -> Self {
        let mut table = LineOffsetTable::default();
        table.extend(source, 0);
        table
    }

    /// Record line starts for `chunk`, which begins at offset `base`.
    pub fn extend(&mut self, chunk: &[u8], base: usize) {
        for pos in newline_positions(chunk) {
            let start = u32::try_from(base + pos + 1).unwrap_or(u32::MAX);
            if self.offsets.last().is_some_and(|&last| last >= start) {
                continue;
            }
            self.offsets.push(start);
        }
    }

    /// 1-based line containing `offset`.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// 1-based (line, column); the column counts characters, not bytes.
    pub fn offset_to_line_col(&self, source: &[u8], offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.line_start_offset(line).unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());
        let chars = source
            .get(line_start..end)
            .map_or(0, |bytes| bytes.iter().filter(|&&b| (b & 0xC0) != 0x80).count());
        let col = u32::try_from(chars).unwrap_or(u32::MAX - 1) + 1;
        (line, col)
    }

    /// Start offset of a 1-based line.
    pub fn line_start_offset(&self, line: u32) -> Option<u32> {
        if line == 0 {
            return None;
        }
        self.offsets.get((line - 1) as usize).copied()
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }

    /// Start and end line of a span.
    pub fn span_lines(&self, span: Span) -> (u32, u32) {
        (
            self.line_from_offset(span.start),
            self.line_from_offset(span.end.saturating_sub(1).max(span.start)),
        )
    }
}

fn newline_positions(chunk: &[u8]) -> impl Iterator<Item = usize> + '_ {
    chunk
        .iter()
        .enumerate()
        .filter_map(|(i, &b)| (b == b'\n').then_some(i))
}

#[cfg(test)]
mod tests;
