//! Forward-only character cursor with one character of lookahead.

use std::io::{self, BufRead};

use super::error::{ParseError, ParseErrorKind, ParseResult};

/// A source of characters consumed strictly in order.
pub trait CharSource {
    /// Returns the next character, or `None` at end of stream.
    ///
    /// ## Errors
    /// Returns an error if the underlying input cannot be read or decoded.
    fn next_char(&mut self) -> io::Result<Option<char>>;
}

/// Characters of an in-memory string.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    chars: std::str::Chars<'a>,
}

impl<'a> StrSource<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.chars.next())
    }
}

/// Characters decoded incrementally from a UTF-8 byte reader.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = match self.reader.fill_buf() {
            Ok(buf) => buf.first().copied(),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => return self.next_byte(),
            Err(e) => return Err(e),
        };
        if byte.is_some() {
            self.reader.consume(1);
        }
        Ok(byte)
    }
}

/// Length of the UTF-8 sequence introduced by `lead`.
const fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

impl<R: BufRead> CharSource for ReaderSource<R> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        let Some(lead) = self.next_byte()? else {
            return Ok(None);
        };
        let width = utf8_width(lead)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "invalid UTF-8 lead byte"))?;

        let mut bytes = [lead, 0, 0, 0];
        for slot in &mut bytes[1..width] {
            *slot = self.next_byte()?.ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "truncated UTF-8 sequence")
            })?;
        }

        let decoded = std::str::from_utf8(&bytes[..width])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(decoded.chars().next())
    }
}

/// Character cursor over a [`CharSource`].
///
/// Exposes `read` and `peek`, with `None` as the end-of-stream sentinel,
/// and carries the logical line number used for diagnostics. The line
/// number only moves when a reader calls [`Cursor::advance_line`].
#[derive(Debug)]
pub struct Cursor<S> {
    source: S,
    peeked: Option<Option<char>>,
    line: usize,
}

impl<S: CharSource> Cursor<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            peeked: None,
            line: 1,
        }
    }

    /// Consumes and returns the next character.
    ///
    /// ## Errors
    /// Returns an error if the source fails.
    pub fn read(&mut self) -> ParseResult<Option<char>> {
        match self.peeked.take() {
            Some(c) => Ok(c),
            None => self.pull(),
        }
    }

    /// Returns the next character without consuming it.
    ///
    /// ## Errors
    /// Returns an error if the source fails.
    pub fn peek(&mut self) -> ParseResult<Option<char>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.pull()?);
        }
        Ok(self.peeked.flatten())
    }

    /// Consumes the next character if it is a space or tab.
    ///
    /// ## Errors
    /// Returns an error if the source fails.
    pub fn skip_fold_whitespace(&mut self) -> ParseResult<bool> {
        if matches!(self.peek()?, Some(' ' | '\t')) {
            self.read()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Returns whether the stream is exhausted.
    ///
    /// ## Errors
    /// Returns an error if the source fails.
    pub fn is_at_end(&mut self) -> ParseResult<bool> {
        Ok(self.peek()?.is_none())
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn advance_line(&mut self) {
        self.line += 1;
    }

    fn pull(&mut self) -> ParseResult<Option<char>> {
        self.source.next_char().map_err(|e| {
            let kind = if e.kind() == io::ErrorKind::InvalidData {
                ParseErrorKind::InvalidUtf8
            } else {
                ParseErrorKind::Io
            };
            ParseError::new(kind, self.line).with_context(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut cursor = Cursor::new(StrSource::new("ab"));
        assert_eq!(cursor.peek().unwrap(), Some('a'));
        assert_eq!(cursor.peek().unwrap(), Some('a'));
        assert_eq!(cursor.read().unwrap(), Some('a'));
        assert_eq!(cursor.read().unwrap(), Some('b'));
        assert_eq!(cursor.peek().unwrap(), None);
        assert_eq!(cursor.read().unwrap(), None);
        assert!(cursor.is_at_end().unwrap());
    }

    #[test]
    fn skip_fold_whitespace_only_skips_space_or_tab() {
        let mut cursor = Cursor::new(StrSource::new("\tx"));
        assert!(cursor.skip_fold_whitespace().unwrap());
        assert!(!cursor.skip_fold_whitespace().unwrap());
        assert_eq!(cursor.read().unwrap(), Some('x'));
    }

    #[test]
    fn reader_source_decodes_multibyte() {
        let input = "Zürich ☃ 𝄞".as_bytes();
        let mut cursor = Cursor::new(ReaderSource::new(input));
        let mut out = String::new();
        while let Some(c) = cursor.read().unwrap() {
            out.push(c);
        }
        assert_eq!(out, "Zürich ☃ 𝄞");
    }

    #[test]
    fn reader_source_rejects_invalid_utf8() {
        let input: &[u8] = &[b'A', 0xFF, b'B'];
        let mut cursor = Cursor::new(ReaderSource::new(input));
        assert_eq!(cursor.read().unwrap(), Some('A'));
        let err = cursor.read().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidUtf8);
    }

    #[test]
    fn reader_source_rejects_truncated_sequence() {
        let input: &[u8] = &[0xE2, 0x98];
        let mut cursor = Cursor::new(ReaderSource::new(input));
        assert_eq!(cursor.read().unwrap_err().kind, ParseErrorKind::InvalidUtf8);
    }
}
