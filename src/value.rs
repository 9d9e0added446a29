use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::BencodeError;

/// The four kinds of bencode node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Integer,
    Bytes,
    List,
    Dict,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Integer => "integer",
            Kind::Bytes => "byte string",
            Kind::List => "list",
            Kind::Dict => "dict",
        })
    }
}

/// An owned bencode value.
///
/// Byte strings are held as [`Bytes`], so cloning a decoded value is cheap.
/// Dictionaries are kept in a [`BTreeMap`] and therefore always iterate (and
/// encode) in ascending key order.
///
/// # Examples
///
/// ```
/// use rbencode::Value;
/// use bytes::Bytes;
/// use std::collections::BTreeMap;
///
/// // Creating values directly
/// let int = Value::Integer(42);
/// let string = Value::string("hello");
/// let list = Value::List(vec![Value::Integer(1), Value::Integer(2)]);
///
/// // Using From implementations
/// let int: Value = 42i64.into();
/// let string: Value = "hello".into();
///
/// // Accessing values
/// assert_eq!(int.as_integer(), Some(42));
/// assert_eq!(string.as_str(), Some("hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A signed 64-bit integer.
    Integer(i64),
    /// A byte string (may or may not be valid UTF-8).
    Bytes(Bytes),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A dictionary with byte string keys.
    Dict(BTreeMap<Bytes, Value>),
}

impl Value {
    /// Creates a byte string value from a UTF-8 string.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbencode::Value;
    ///
    /// let value = Value::string("hello");
    /// assert_eq!(value.as_str(), Some("hello"));
    /// ```
    pub fn string(s: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Integer(_) => Kind::Integer,
            Value::Bytes(_) => Kind::Bytes,
            Value::List(_) => Kind::List,
            Value::Dict(_) => Kind::Dict,
        }
    }

    /// Returns the value as an integer, if it is one.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbencode::Value;
    ///
    /// let int = Value::Integer(42);
    /// assert_eq!(int.as_integer(), Some(42));
    ///
    /// let string = Value::string("hello");
    /// assert_eq!(string.as_integer(), None);
    /// ```
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a byte string, if it is one.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as a UTF-8 string, if it is a valid UTF-8 byte string.
    ///
    /// Returns `None` if the value is not a byte string or if the bytes are not valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Returns the value as a list, if it is one.
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the value as a dictionary reference, if it is one.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbencode::decode;
    ///
    /// let value = decode(b"d3:foo3:bare").unwrap().unwrap();
    /// let dict = value.as_dict().unwrap();
    /// assert!(dict.contains_key(b"foo".as_slice()));
    /// ```
    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes the value and returns the byte string, if it is one.
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Consumes the value and returns the list, if it is one.
    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Consumes the value and returns the dictionary, if it is one.
    ///
    /// This avoids cloning the dictionary when you need ownership.
    pub fn into_dict(self) -> Option<BTreeMap<Bytes, Value>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up a key in this value if it is a dictionary.
    ///
    /// Returns `None` if the value is not a dictionary or if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbencode::decode;
    ///
    /// let value = decode(b"d3:foo3:bare").unwrap().unwrap();
    /// assert_eq!(value.get(b"foo").and_then(|v| v.as_str()), Some("bar"));
    /// assert_eq!(value.get(b"missing"), None);
    /// ```
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?.get(key)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

impl From<BTreeMap<Bytes, Value>> for Value {
    fn from(d: BTreeMap<Bytes, Value>) -> Self {
        Value::Dict(d)
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(view: ValueRef<'_>) -> Self {
        view.to_owned_value()
    }
}

macro_rules! impl_try_from_value {
    (@convert $source:ident, $value:expr, $variant:ident) => {
        match $value {
            $source::$variant(inner) => Ok(inner),
            other => Err(BencodeError::TypeMismatch {
                expected: Kind::$variant,
                found: other.kind(),
            }),
        }
    };
    ($source:ident { $($target:ty => $variant:ident),* $(,)? }) => {
        $(
            impl TryFrom<$source> for $target {
                type Error = BencodeError;

                fn try_from(value: $source) -> Result<Self, Self::Error> {
                    impl_try_from_value!(@convert $source, value, $variant)
                }
            }
        )*
    };
    ($source:ident<$lt:lifetime> { $($target:ty => $variant:ident),* $(,)? }) => {
        $(
            impl<$lt> TryFrom<$source<$lt>> for $target {
                type Error = BencodeError;

                fn try_from(value: $source<$lt>) -> Result<Self, Self::Error> {
                    impl_try_from_value!(@convert $source, value, $variant)
                }
            }
        )*
    };
}

impl_try_from_value!(Value {
    i64 => Integer,
    Bytes => Bytes,
    Vec<Value> => List,
    BTreeMap<Bytes, Value> => Dict,
});

/// A bencode value borrowing its byte strings from the decoded buffer.
///
/// Produced by [`decode_view`](crate::decode_view). No string payload is copied;
/// the borrow checker keeps the source buffer alive for as long as any view
/// into it exists.
///
/// # Examples
///
/// ```
/// use rbencode::{decode_view, ValueRef};
///
/// let data = b"d4:spaml1:a1:bee".to_vec();
/// let value = decode_view(&data).unwrap().unwrap();
/// let list = value.get(b"spam").and_then(ValueRef::as_list).unwrap();
/// assert_eq!(list[0].as_bytes(), Some(&b"a"[..]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueRef<'a> {
    Integer(i64),
    Bytes(&'a [u8]),
    List(Vec<ValueRef<'a>>),
    Dict(BTreeMap<&'a [u8], ValueRef<'a>>),
}

impl<'a> ValueRef<'a> {
    /// Returns the kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            ValueRef::Integer(_) => Kind::Integer,
            ValueRef::Bytes(_) => Kind::Bytes,
            ValueRef::List(_) => Kind::List,
            ValueRef::Dict(_) => Kind::Dict,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ValueRef::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the borrowed byte string, with the lifetime of the source buffer.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            ValueRef::Bytes(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the byte string as UTF-8, if it is a valid UTF-8 byte string.
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.as_bytes()?).ok()
    }

    /// Returns the value as a list, if it is one.
    pub fn as_list(&self) -> Option<&Vec<ValueRef<'a>>> {
        match self {
            ValueRef::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the value as a dictionary reference, if it is one.
    pub fn as_dict(&self) -> Option<&BTreeMap<&'a [u8], ValueRef<'a>>> {
        match self {
            ValueRef::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up a key in this value if it is a dictionary.
    pub fn get(&self, key: &[u8]) -> Option<&ValueRef<'a>> {
        self.as_dict()?.get(key)
    }

    /// Copies every borrowed byte string into an owned [`Value`].
    pub fn to_owned_value(&self) -> Value {
        match self {
            ValueRef::Integer(i) => Value::Integer(*i),
            ValueRef::Bytes(b) => Value::Bytes(Bytes::copy_from_slice(b)),
            ValueRef::List(l) => Value::List(l.iter().map(ValueRef::to_owned_value).collect()),
            ValueRef::Dict(d) => Value::Dict(
                d.iter()
                    .map(|(k, v)| (Bytes::copy_from_slice(k), v.to_owned_value()))
                    .collect(),
            ),
        }
    }
}

impl_try_from_value!(ValueRef<'a> {
    i64 => Integer,
    &'a [u8] => Bytes,
    Vec<ValueRef<'a>> => List,
    BTreeMap<&'a [u8], ValueRef<'a>> => Dict,
});
