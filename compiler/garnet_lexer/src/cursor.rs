//! Byte cursor over a buffer filled lazily from a [`LineSource`].
//!
//! All positions are absolute offsets into the growing buffer, so spans
//! stay valid for the whole session. A line is pulled only when the cursor
//! (or a lookahead) reaches past the bytes already buffered; because lines
//! arrive whole, any loaded byte implies its entire line is loaded.
//!
//! # Heredoc resumption
//!
//! Heredoc bodies are consumed as soon as their opener is scanned. The
//! position just past the body is parked in `heredoc_end`; the next time
//! [`Cursor::bump`] steps over a newline the cursor jumps there.

use garnet_diagnostic::span_utils::LineOffsetTable;
use garnet_ir::Span;

use crate::source::{LineSource, SourceError};

pub struct Cursor<'src> {
    source: Box<dyn LineSource + 'src>,
    buf: Vec<u8>,
    pos: usize,
    lines: LineOffsetTable,
    exhausted: bool,
    heredoc_end: Option<usize>,
    error: Option<SourceError>,
}

impl<'src> Cursor<'src> {
    pub fn new(source: impl LineSource + 'src) -> Self {
        Cursor {
            source: Box::new(source),
            buf: Vec::with_capacity(4096),
            pos: 0,
            lines: LineOffsetTable::default(),
            exhausted: false,
            heredoc_end: None,
            error: None,
        }
    }

    /// Pull lines until `index` is buffered or the source runs dry.
    fn fill_to(&mut self, index: usize) -> bool {
        while index >= self.buf.len() {
            if self.exhausted {
                return false;
            }
            match self.source.next_line() {
                Ok(Some(line)) if !line.is_empty() => {
                    let base = self.buf.len();
                    self.lines.extend(&line, base);
                    self.buf.extend_from_slice(&line);
                }
                Ok(Some(_)) => {}
                Ok(None) => self.exhausted = true,
                Err(err) => {
                    tracing::debug!(%err, "line source failed");
                    self.error = Some(err);
                    self.exhausted = true;
                }
            }
        }
        true
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Reposition the cursor; `pos` must be at most one past buffered data.
    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    #[inline]
    pub fn peek(&mut self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    #[inline]
    pub fn peek_at(&mut self, offset: usize) -> Option<u8> {
        self.byte_at(self.pos + offset)
    }

    pub fn byte_at(&mut self, index: usize) -> Option<u8> {
        if index < self.buf.len() || self.fill_to(index) {
            self.buf.get(index).copied()
        } else {
            None
        }
    }

    #[inline]
    pub fn is_eof(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Consume one byte, jumping over a pending heredoc body after `\n`.
    pub fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            if let Some(end) = self.heredoc_end.take() {
                self.pos = end;
            }
        }
        Some(byte)
    }

    /// Consume `byte` if it is next.
    #[inline]
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub fn eat_while(&mut self, mut pred: impl FnMut(u8) -> bool) {
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.bump();
        }
    }

    /// True when the bytes at the cursor spell `text`.
    pub fn looking_at(&mut self, text: &[u8]) -> bool {
        text.iter()
            .enumerate()
            .all(|(i, &b)| self.peek_at(i) == Some(b))
    }

    /// Offset of the `\n` ending the line containing `from`, or the end of
    /// the buffer for a final line without one.
    pub fn line_end(&mut self, from: usize) -> usize {
        self.fill_to(from);
        let tail = self.buf.get(from..).unwrap_or_default();
        memchr::memchr(b'\n', tail).map_or(self.buf.len(), |i| from + i)
    }

    /// Offset where the line containing `at` starts.
    pub fn line_start(&self, at: usize) -> usize {
        let head = self.buf.get(..at.min(self.buf.len())).unwrap_or_default();
        memchr::memrchr(b'\n', head).map_or(0, |i| i + 1)
    }

    /// Move to the end of the current line without crossing the newline.
    pub fn skip_to_line_end(&mut self) {
        self.pos = self.line_end(self.pos);
    }

    /// Borrow already-buffered bytes; out-of-range parts are clipped.
    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        let end = end.min(self.buf.len());
        self.buf.get(start.min(end)..end).unwrap_or_default()
    }

    #[inline]
    pub fn span_from(&self, start: usize) -> Span {
        Span::from_offsets(start, self.pos)
    }

    pub fn set_heredoc_end(&mut self, end: Option<usize>) {
        self.heredoc_end = end;
    }

    pub fn take_heredoc_end(&mut self) -> Option<usize> {
        self.heredoc_end.take()
    }

    /// I/O failure reported by the line source, if any.
    pub fn take_error(&mut self) -> Option<SourceError> {
        self.error.take()
    }

    /// 1-based line of `offset`.
    pub fn line_of(&self, offset: usize) -> u32 {
        self.lines
            .line_from_offset(u32::try_from(offset).unwrap_or(u32::MAX))
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_parts(self) -> (Vec<u8>, LineOffsetTable) {
        (self.buf, self.lines)
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &self.pos)
            .field("buffered", &self.buf.len())
            .field("exhausted", &self.exhausted)
            .field("heredoc_end", &self.heredoc_end)
            .finish_non_exhaustive()
    }
}
