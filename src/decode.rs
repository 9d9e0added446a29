use bytes::Bytes;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::{BufReader, Read};
use std::marker::PhantomData;

use crate::constants::{
    DEFAULT_MAX_DEPTH, DICT_START, END, INTEGER_START, LIST_START, MINUS, STRING_SEPARATOR,
};
use crate::cursor::{BufferCursor, Cursor, StreamCursor};
use crate::error::BencodeError;
use crate::value::{Value, ValueRef};

/// Limits and strictness applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum number of nested lists and dictionaries.
    pub max_depth: usize,
    /// Reject non-canonical integers (`ie`, `i-0e`, `i03e`).
    pub strict_integers: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_integers: false,
        }
    }
}

/// A configured bencode decoder.
///
/// The free functions ([`decode`], [`decode_view`], ...) use
/// `Decoder::default()`. Build a decoder when the defaults do not fit, for
/// example to tighten the nesting limit for untrusted input.
///
/// Integer overflow is always rejected with [`BencodeError::InvalidInteger`].
///
/// # Examples
///
/// ```
/// use rbencode::{BencodeError, Decoder};
///
/// let decoder = Decoder::new().max_depth(1).strict_integers(true);
///
/// assert!(decoder.decode(b"li1ee").is_ok());
/// assert!(matches!(decoder.decode(b"llee"), Err(BencodeError::NestingTooDeep(1))));
/// assert!(matches!(decoder.decode(b"i03e"), Err(BencodeError::InvalidInteger(_))));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    pub fn strict_integers(mut self, strict: bool) -> Self {
        self.options.strict_integers = strict;
        self
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes the first value in `data`, copying string payloads.
    ///
    /// Returns `Ok(None)` for empty input. Bytes after the first value are
    /// ignored; use [`decode_exact`](Self::decode_exact) to reject them.
    pub fn decode(&self, data: &[u8]) -> Result<Option<Value>, BencodeError> {
        self.decode_from(&mut BufferCursor::new(data))
    }

    /// Decodes the first value in `data` without copying string payloads.
    pub fn decode_view<'a>(&self, data: &'a [u8]) -> Result<Option<ValueRef<'a>>, BencodeError> {
        self.decode_view_from(&mut BufferCursor::new(data))
    }

    /// Decodes exactly one value spanning all of `data`.
    pub fn decode_exact(&self, data: &[u8]) -> Result<Value, BencodeError> {
        let mut cursor = BufferCursor::new(data);
        let value = self
            .decode_from(&mut cursor)?
            .ok_or(BencodeError::UnexpectedEof)?;

        if !cursor.is_empty() {
            return Err(BencodeError::TrailingData);
        }

        Ok(value)
    }

    /// Decodes the next value from `cursor`, advancing it past the value.
    ///
    /// Returns `Ok(None)` if the cursor is already at the end. After an
    /// error the cursor position is unspecified.
    pub fn decode_from<C: Cursor>(&self, cursor: &mut C) -> Result<Option<Value>, BencodeError> {
        Parser::<C, Owned>::new(cursor, &self.options).parse()
    }

    /// Zero-copy counterpart of [`decode_from`](Self::decode_from).
    pub fn decode_view_from<'a>(
        &self,
        cursor: &mut BufferCursor<'a>,
    ) -> Result<Option<ValueRef<'a>>, BencodeError> {
        Parser::<BufferCursor<'a>, Borrowed>::new(cursor, &self.options).parse()
    }

    /// Decodes one value from a reader.
    ///
    /// The reader is wrapped in a [`BufReader`], which may read past the end
    /// of the value. To decode several values from one stream, keep a
    /// [`StreamCursor`] and call [`decode_from`](Self::decode_from) on it.
    pub fn decode_reader<R: Read>(&self, reader: R) -> Result<Option<Value>, BencodeError> {
        self.decode_from(&mut StreamCursor::new(BufReader::new(reader)))
    }
}

/// Decodes the first bencode value in `data`.
///
/// String payloads are copied into owned [`Bytes`]. Empty input yields
/// `Ok(None)`. Trailing bytes after the value are not an error.
///
/// # Examples
///
/// ```
/// use rbencode::decode;
///
/// let value = decode(b"l4:spam4:eggse").unwrap().unwrap();
/// let list = value.as_list().unwrap();
/// assert_eq!(list[0].as_str(), Some("spam"));
///
/// assert!(decode(b"").unwrap().is_none());
/// ```
pub fn decode(data: &[u8]) -> Result<Option<Value>, BencodeError> {
    Decoder::default().decode(data)
}

/// Decodes the first bencode value in `data` as a zero-copy view.
pub fn decode_view(data: &[u8]) -> Result<Option<ValueRef<'_>>, BencodeError> {
    Decoder::default().decode_view(data)
}

/// Decodes a single value and fails with [`BencodeError::TrailingData`] if
/// anything follows it.
pub fn decode_exact(data: &[u8]) -> Result<Value, BencodeError> {
    Decoder::default().decode_exact(data)
}

pub fn decode_from<C: Cursor>(cursor: &mut C) -> Result<Option<Value>, BencodeError> {
    Decoder::default().decode_from(cursor)
}

pub fn decode_view_from<'a>(
    cursor: &mut BufferCursor<'a>,
) -> Result<Option<ValueRef<'a>>, BencodeError> {
    Decoder::default().decode_view_from(cursor)
}

pub fn decode_reader<R: Read>(reader: R) -> Result<Option<Value>, BencodeError> {
    Decoder::default().decode_reader(reader)
}

/// How string payloads are pulled out of a cursor and how nodes are built.
trait Extract<C: ?Sized> {
    type Key: Ord + AsRef<[u8]>;
    type Node;

    fn read_string(cursor: &mut C, len: usize) -> Result<Self::Key, BencodeError>;
    fn integer(value: i64) -> Self::Node;
    fn bytes(value: Self::Key) -> Self::Node;
    fn list(items: Vec<Self::Node>) -> Self::Node;
    fn dict(entries: BTreeMap<Self::Key, Self::Node>) -> Self::Node;
}

/// Copy mode: any cursor, owned [`Value`]s.
enum Owned {}

impl<C: Cursor + ?Sized> Extract<C> for Owned {
    type Key = Bytes;
    type Node = Value;

    fn read_string(cursor: &mut C, len: usize) -> Result<Bytes, BencodeError> {
        cursor.read_bytes(len)
    }

    fn integer(value: i64) -> Value {
        Value::Integer(value)
    }

    fn bytes(value: Bytes) -> Value {
        Value::Bytes(value)
    }

    fn list(items: Vec<Value>) -> Value {
        Value::List(items)
    }

    fn dict(entries: BTreeMap<Bytes, Value>) -> Value {
        Value::Dict(entries)
    }
}

/// View mode: buffer cursors only, [`ValueRef`]s into the buffer.
enum Borrowed {}

impl<'a> Extract<BufferCursor<'a>> for Borrowed {
    type Key = &'a [u8];
    type Node = ValueRef<'a>;

    fn read_string(cursor: &mut BufferCursor<'a>, len: usize) -> Result<&'a [u8], BencodeError> {
        cursor.take(len)
    }

    fn integer(value: i64) -> ValueRef<'a> {
        ValueRef::Integer(value)
    }

    fn bytes(value: &'a [u8]) -> ValueRef<'a> {
        ValueRef::Bytes(value)
    }

    fn list(items: Vec<ValueRef<'a>>) -> ValueRef<'a> {
        ValueRef::List(items)
    }

    fn dict(entries: BTreeMap<&'a [u8], ValueRef<'a>>) -> ValueRef<'a> {
        ValueRef::Dict(entries)
    }
}

struct Parser<'p, C: ?Sized, E> {
    cursor: &'p mut C,
    options: &'p DecodeOptions,
    extract: PhantomData<E>,
}

impl<'p, C, E> Parser<'p, C, E>
where
    C: Cursor + ?Sized,
    E: Extract<C>,
{
    fn new(cursor: &'p mut C, options: &'p DecodeOptions) -> Self {
        Self {
            cursor,
            options,
            extract: PhantomData,
        }
    }

    fn parse(&mut self) -> Result<Option<E::Node>, BencodeError> {
        // Only an exhausted top level yields no value; nested ends are errors.
        if self.cursor.peek()?.is_none() {
            return Ok(None);
        }

        self.parse_value(0).map(Some)
    }

    fn parse_value(&mut self, depth: usize) -> Result<E::Node, BencodeError> {
        match self.cursor.peek()? {
            None => Err(BencodeError::UnexpectedEof),
            Some(INTEGER_START) => self.parse_integer().map(E::integer),
            Some(LIST_START) => self.parse_list(depth),
            Some(DICT_START) => self.parse_dict(depth),
            Some(b'0'..=b'9') => self.parse_string().map(E::bytes),
            Some(c) => Err(BencodeError::UnknownType(c as char)),
        }
    }

    fn parse_integer(&mut self) -> Result<i64, BencodeError> {
        self.cursor.advance();

        let negative = self.cursor.peek()? == Some(MINUS);
        if negative {
            self.cursor.advance();
        }

        let mut value: i64 = 0;
        let mut digits = 0;
        let mut leading_zero = false;
        while let Some(c @ b'0'..=b'9') = self.cursor.peek()? {
            let digit = i64::from(c - b'0');
            leading_zero |= digits == 0 && digit == 0;

            // Accumulate negatives downwards so i64::MIN is representable.
            value = value
                .checked_mul(10)
                .and_then(|v| {
                    if negative {
                        v.checked_sub(digit)
                    } else {
                        v.checked_add(digit)
                    }
                })
                .ok_or_else(|| BencodeError::InvalidInteger("out of range".into()))?;

            digits += 1;
            self.cursor.advance();
        }

        self.expect(END)?;

        if self.options.strict_integers {
            if digits == 0 {
                return Err(BencodeError::InvalidInteger("empty".into()));
            }
            if leading_zero && digits > 1 {
                return Err(BencodeError::InvalidInteger("leading zeros".into()));
            }
            if leading_zero && negative {
                return Err(BencodeError::InvalidInteger("negative zero".into()));
            }
        }

        Ok(value)
    }

    fn parse_string(&mut self) -> Result<E::Key, BencodeError> {
        let mut len: usize = 0;
        while let Some(c @ b'0'..=b'9') = self.cursor.peek()? {
            len = len
                .checked_mul(10)
                .and_then(|l| l.checked_add(usize::from(c - b'0')))
                .ok_or(BencodeError::InvalidStringLength)?;
            self.cursor.advance();
        }

        self.expect(STRING_SEPARATOR)?;
        E::read_string(&mut *self.cursor, len)
    }

    fn parse_list(&mut self, depth: usize) -> Result<E::Node, BencodeError> {
        let depth = self.enter(depth)?;
        self.cursor.advance();

        let mut list = Vec::new();
        while self.next_item()?.is_some() {
            list.push(self.parse_value(depth)?);
        }

        self.cursor.advance();
        Ok(E::list(list))
    }

    fn parse_dict(&mut self, depth: usize) -> Result<E::Node, BencodeError> {
        let depth = self.enter(depth)?;
        self.cursor.advance();

        let mut dict = BTreeMap::new();
        while let Some(c) = self.next_item()? {
            if !c.is_ascii_digit() {
                return Err(BencodeError::ExpectedStringKey(c as char));
            }

            let key = self.parse_string()?;
            let value = self.parse_value(depth)?;

            match dict.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
                Entry::Occupied(entry) => {
                    let key = Bytes::copy_from_slice(entry.key().as_ref());
                    tracing::trace!(
                        key = %String::from_utf8_lossy(&key),
                        position = self.cursor.position(),
                        "rejecting duplicate dict key"
                    );
                    return Err(BencodeError::DuplicateKey(key));
                }
            }
        }

        self.cursor.advance();
        Ok(E::dict(dict))
    }

    /// Returns the next byte inside a list or dict, or `None` at its closing `e`.
    fn next_item(&mut self) -> Result<Option<u8>, BencodeError> {
        match self.cursor.peek()? {
            None => Err(BencodeError::UnexpectedEof),
            Some(END) => Ok(None),
            Some(c) => Ok(Some(c)),
        }
    }

    fn enter(&self, depth: usize) -> Result<usize, BencodeError> {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            tracing::debug!(
                max_depth = self.options.max_depth,
                position = self.cursor.position(),
                "bencode nesting limit exceeded"
            );
            return Err(BencodeError::NestingTooDeep(self.options.max_depth));
        }
        Ok(depth)
    }

    fn expect(&mut self, token: u8) -> Result<(), BencodeError> {
        match self.cursor.peek()? {
            Some(c) if c == token => {
                self.cursor.advance();
                Ok(())
            }
            Some(c) => Err(BencodeError::MalformedToken {
                expected: token as char,
                found: c as char,
            }),
            None => Err(BencodeError::UnexpectedEof),
        }
    }
}
