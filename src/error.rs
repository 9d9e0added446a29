use bytes::Bytes;
use thiserror::Error;

use crate::value::Kind;

/// Errors produced while decoding or encoding bencode.
#[derive(Debug, Error)]
pub enum BencodeError {
    /// The input ended in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A delimiter (`e` or `:`) was expected but another byte was found.
    #[error("expected {expected:?}, found {found:?}")]
    MalformedToken { expected: char, found: char },

    /// The leading byte of a value is not `i`, `l`, `d` or a digit.
    #[error("unknown value type {0:?}")]
    UnknownType(char),

    /// A dictionary key position held something other than a byte string.
    #[error("expected string key, found {0:?}")]
    ExpectedStringKey(char),

    /// The same key appeared twice in one dictionary.
    #[error("duplicate key in dict: {}", String::from_utf8_lossy(.0))]
    DuplicateKey(Bytes),

    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    #[error("invalid string length")]
    InvalidStringLength,

    /// Containers were nested deeper than the configured limit.
    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("trailing data after value")]
    TrailingData,

    /// The value has no bencode representation.
    #[error("unsupported type: {0}")]
    UnsupportedType(&'static str),

    /// Typed extraction asked for a different kind of value.
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: Kind, found: Kind },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
