//! Byte sources for the decoder.
//!
//! The decoder needs one byte of lookahead and the ability to pull a run of
//! bytes for a string payload. [`Cursor`] captures exactly that and is enough
//! for copy-mode decoding. Zero-copy decoding additionally needs to hand out
//! slices of the original input, which only [`BufferCursor`] can do.

use bytes::Bytes;
use std::io::{BufRead, Read};

use crate::error::BencodeError;

/// A forward-only byte source.
pub trait Cursor {
    /// Returns the next byte without consuming it, or `None` at end of input.
    fn peek(&mut self) -> Result<Option<u8>, BencodeError>;

    /// Consumes one byte. Only valid after `peek` returned `Some`.
    fn advance(&mut self);

    /// Number of bytes consumed so far.
    fn position(&self) -> usize;

    /// Consumes exactly `len` bytes into an owned buffer.
    ///
    /// Fails with [`BencodeError::UnexpectedEof`] if fewer bytes remain.
    fn read_bytes(&mut self, len: usize) -> Result<Bytes, BencodeError>;
}

/// A cursor over a fully materialized buffer.
///
/// Supports both copy-mode and zero-copy decoding. Several values stored
/// back to back can be decoded by reusing the same cursor.
///
/// # Examples
///
/// ```
/// use rbencode::{decode_from, BufferCursor, Cursor};
///
/// let mut cursor = BufferCursor::new(b"i1e4:spam");
/// let first = decode_from(&mut cursor).unwrap().unwrap();
/// assert_eq!(first.as_integer(), Some(1));
/// assert_eq!(cursor.position(), 3);
///
/// let second = decode_from(&mut cursor).unwrap().unwrap();
/// assert_eq!(second.as_str(), Some("spam"));
/// assert!(decode_from(&mut cursor).unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct BufferCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BufferCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left between the current position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unconsumed tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Consumes `len` bytes and returns them as a slice of the original buffer.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], BencodeError> {
        if self.remaining() < len {
            return Err(BencodeError::UnexpectedEof);
        }

        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}

impl Cursor for BufferCursor<'_> {
    fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        Ok(self.data.get(self.pos).copied())
    }

    fn advance(&mut self) {
        self.pos = (self.pos + 1).min(self.data.len());
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes, BencodeError> {
        self.take(len).map(Bytes::copy_from_slice)
    }
}

/// A cursor over a single-pass reader.
///
/// Lookahead comes from [`BufRead::fill_buf`], so bytes after the decoded
/// value stay in the reader and can be recovered with
/// [`into_inner`](StreamCursor::into_inner). Only copy-mode decoding is
/// available.
///
/// # Examples
///
/// ```
/// use rbencode::{decode_from, StreamCursor};
///
/// let mut cursor = StreamCursor::new(&b"l4:spami42ee"[..]);
/// let value = decode_from(&mut cursor).unwrap().unwrap();
/// assert_eq!(value.as_list().map(|l| l.len()), Some(2));
/// assert!(cursor.is_exhausted().unwrap());
/// ```
#[derive(Debug)]
pub struct StreamCursor<R> {
    reader: R,
    pos: usize,
}

impl<R: BufRead> StreamCursor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, pos: 0 }
    }

    /// Returns `true` once the reader has no more bytes.
    pub fn is_exhausted(&mut self) -> Result<bool, BencodeError> {
        Ok(self.peek()?.is_none())
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> Cursor for StreamCursor<R> {
    fn peek(&mut self) -> Result<Option<u8>, BencodeError> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn advance(&mut self) {
        self.reader.consume(1);
        self.pos += 1;
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes, BencodeError> {
        // Grow with the data actually read; `len` comes from untrusted input.
        let mut buf = Vec::new();
        let read = (&mut self.reader).take(len as u64).read_to_end(&mut buf)?;
        self.pos += read;

        if read < len {
            return Err(BencodeError::UnexpectedEof);
        }

        Ok(Bytes::from(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_cursor_take() {
        let mut cursor = BufferCursor::new(b"spam");
        assert_eq!(cursor.take(2).unwrap(), b"sp");
        assert_eq!(cursor.remaining(), 2);
        assert!(matches!(cursor.take(3), Err(BencodeError::UnexpectedEof)));
        assert_eq!(cursor.rest(), b"am");
    }

    #[test]
    fn test_buffer_cursor_peek_advance() {
        let mut cursor = BufferCursor::new(b"ab");
        assert_eq!(cursor.peek().unwrap(), Some(b'a'));
        cursor.advance();
        assert_eq!(cursor.peek().unwrap(), Some(b'b'));
        cursor.advance();
        assert_eq!(cursor.peek().unwrap(), None);
        assert!(cursor.is_empty());
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_buffer_cursor_advance_stops_at_end() {
        let mut cursor = BufferCursor::new(b"a");
        cursor.advance();
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.remaining(), 0);
        assert_eq!(cursor.rest(), b"");
        assert_eq!(cursor.peek().unwrap(), None);
    }

    #[test]
    fn test_stream_cursor_read_bytes() {
        let mut cursor = StreamCursor::new(&b"hello world"[..]);
        assert_eq!(cursor.read_bytes(5).unwrap(), Bytes::from_static(b"hello"));
        assert_eq!(cursor.position(), 5);
        assert_eq!(cursor.peek().unwrap(), Some(b' '));
    }

    #[test]
    fn test_stream_cursor_short_read() {
        let mut cursor = StreamCursor::new(&b"abc"[..]);
        assert!(matches!(
            cursor.read_bytes(10),
            Err(BencodeError::UnexpectedEof)
        ));
        assert!(cursor.is_exhausted().unwrap());
    }

    #[test]
    fn test_stream_cursor_small_buffer() {
        // Force lookahead across many refills of the internal buffer.
        let reader = std::io::BufReader::with_capacity(2, &b"abcdefg"[..]);
        let mut cursor = StreamCursor::new(reader);
        assert_eq!(cursor.peek().unwrap(), Some(b'a'));
        cursor.advance();
        assert_eq!(cursor.read_bytes(5).unwrap(), Bytes::from_static(b"bcdef"));
        assert_eq!(cursor.peek().unwrap(), Some(b'g'));
    }
}
