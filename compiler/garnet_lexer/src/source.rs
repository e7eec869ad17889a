//! Line suppliers.
//!
//! The scanner pulls source text one line at a time through
//! [`LineSource`]. Each line includes its trailing `\n` when present;
//! `None` signals end of input.

use std::io::BufRead;

/// Failure while pulling a line from a backing stream.
#[derive(Debug, thiserror::Error)]
#[error("failed to read source line: {0}")]
pub struct SourceError(#[from] pub std::io::Error);

/// Pull-based supply of source lines.
pub trait LineSource {
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, SourceError>;
}

/// In-memory source split into lines on demand.
#[derive(Clone, Debug)]
pub struct StrLines<'a> {
    rest: &'a [u8],
}

impl<'a> StrLines<'a> {
    pub fn new(source: &'a str) -> Self {
        StrLines {
            rest: source.as_bytes(),
        }
    }

    pub fn from_bytes(source: &'a [u8]) -> Self {
        StrLines { rest: source }
    }
}

impl LineSource for StrLines<'_> {
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        if self.rest.is_empty() {
            return Ok(None);
        }
        let end = memchr::memchr(b'\n', self.rest).map_or(self.rest.len(), |i| i + 1);
        let (line, rest) = self.rest.split_at(end);
        self.rest = rest;
        Ok(Some(line.to_vec()))
    }
}

/// Stream source backed by any [`BufRead`].
#[derive(Debug)]
pub struct ReaderLines<R> {
    reader: R,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        ReaderLines { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        let mut line = Vec::new();
        let read = self.reader.read_until(b'\n', &mut line)?;
        Ok((read > 0).then_some(line))
    }
}

/// Any closure with a pull method shape is a line source.
impl<F> LineSource for F
where
    F: FnMut() -> Option<Vec<u8>>,
{
    fn next_line(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        Ok(self())
    }
}

#[cfg(test)]
mod tests;
