use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::Write;

use crate::constants::{DICT_START, END, LIST_START};
use crate::error::BencodeError;
use crate::value::{Value, ValueRef};

/// Types that can be written as bencode.
///
/// Implemented for [`Value`], [`ValueRef`], integers, strings, byte slices,
/// `Vec<T>`, tuples (as heterogeneous lists) and `BTreeMap`s with byte-like
/// keys.
pub trait ToBencode {
    fn to_bencode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), BencodeError>;
}

/// Encodes a value to a byte vector.
///
/// Dictionaries are written in the iteration order of their map. For the
/// `BTreeMap`-backed [`Value::Dict`] that is sorted key order, which is the
/// canonical form.
///
/// # Errors
///
/// Returns [`BencodeError::UnsupportedType`] when asked to encode an absent
/// value (`None`).
///
/// # Examples
///
/// ```
/// use rbencode::{encode, Value};
/// use std::collections::BTreeMap;
/// use bytes::Bytes;
///
/// // Encode an integer
/// let encoded = encode(&Value::Integer(42)).unwrap();
/// assert_eq!(encoded, b"i42e");
///
/// // Encode a string
/// let encoded = encode(&Value::string("hello")).unwrap();
/// assert_eq!(encoded, b"5:hello");
///
/// // Encode a list
/// let list = Value::List(vec![Value::Integer(1), Value::string("two")]);
/// let encoded = encode(&list).unwrap();
/// assert_eq!(encoded, b"li1e3:twoe");
///
/// // Encode a dictionary
/// let mut dict = BTreeMap::new();
/// dict.insert(Bytes::from_static(b"a"), Value::Integer(1));
/// dict.insert(Bytes::from_static(b"b"), Value::Integer(2));
/// let encoded = encode(&Value::Dict(dict)).unwrap();
/// assert_eq!(encoded, b"d1:ai1e1:bi2ee");
/// ```
pub fn encode<T: ToBencode + ?Sized>(value: &T) -> Result<Vec<u8>, BencodeError> {
    let mut encoder = Encoder::new(Vec::new());
    encoder.emit(value)?;
    Ok(encoder.into_inner())
}

/// Encodes a value straight into `writer`.
pub fn encode_to<W: Write, T: ToBencode + ?Sized>(writer: W, value: &T) -> Result<(), BencodeError> {
    Encoder::new(writer).emit(value)
}

/// A streaming bencode writer.
///
/// Every call writes through to the underlying sink; nothing is buffered
/// here. Wrap the sink in a `BufWriter` when writing to a file or socket.
///
/// # Examples
///
/// ```
/// use rbencode::Encoder;
///
/// let mut encoder = Encoder::new(Vec::new());
/// encoder
///     .emit_dict(|dict| {
///         dict.add("cow", "moo")?;
///         dict.add("spam", &["a", "b"].map(String::from).to_vec())?;
///         Ok(())
///     })
///     .unwrap();
/// assert_eq!(encoder.into_inner(), b"d3:cow3:moo4:spaml1:a1:bee");
/// ```
#[derive(Debug)]
pub struct Encoder<W> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn emit<T: ToBencode + ?Sized>(&mut self, value: &T) -> Result<(), BencodeError> {
        value.to_bencode(self)
    }

    pub fn emit_integer(&mut self, value: i64) -> Result<(), BencodeError> {
        self.emit_decimal(value)
    }

    pub fn emit_bytes(&mut self, bytes: &[u8]) -> Result<(), BencodeError> {
        write!(self.writer, "{}:", bytes.len())?;
        self.writer.write_all(bytes)?;
        Ok(())
    }

    /// Writes `l` and returns a builder that writes the closing `e`.
    pub fn begin_list(&mut self) -> Result<ListEncoder<'_, W>, BencodeError> {
        ListEncoder::open(self)
    }

    /// Writes `d` and returns a builder that writes the closing `e`.
    ///
    /// Keys are written in call order; sort them first for canonical output.
    pub fn begin_dict(&mut self) -> Result<DictEncoder<'_, W>, BencodeError> {
        DictEncoder::open(self)
    }

    /// Writes a list whose items are added by `f`.
    pub fn emit_list<F>(&mut self, f: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut ListEncoder<'_, W>) -> Result<(), BencodeError>,
    {
        let mut list = self.begin_list()?;
        f(&mut list)?;
        list.finish()
    }

    /// Writes a dictionary whose entries are added by `f`.
    pub fn emit_dict<F>(&mut self, f: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut DictEncoder<'_, W>) -> Result<(), BencodeError>,
    {
        let mut dict = self.begin_dict()?;
        f(&mut dict)?;
        dict.finish()
    }

    fn emit_decimal<I: Display>(&mut self, value: I) -> Result<(), BencodeError> {
        write!(self.writer, "i{}e", value)?;
        Ok(())
    }

    fn token(&mut self, token: u8) -> Result<(), BencodeError> {
        self.writer.write_all(&[token])?;
        Ok(())
    }

    fn close_on_drop(&mut self, container: &'static str) {
        tracing::trace!(container, "closing unfinished container on drop");
        if let Err(e) = self.token(END) {
            tracing::debug!(container, error = %e, "failed to close container on drop");
        }
    }
}

/// Incremental list writer returned by [`Encoder::begin_list`].
///
/// The closing `e` is written by [`finish`](Self::finish), or on drop if
/// `finish` was never reached (early return, panic). Only `finish` reports
/// a failure to write it.
///
/// # Examples
///
/// ```
/// use rbencode::Encoder;
///
/// let mut encoder = Encoder::new(Vec::new());
/// let mut list = encoder.begin_list().unwrap();
/// list.add(&42).unwrap().add("spam").unwrap();
/// list.finish().unwrap();
/// assert_eq!(encoder.into_inner(), b"li42e4:spame");
/// ```
#[must_use = "a list is closed when the builder is finished or dropped"]
pub struct ListEncoder<'a, W: Write> {
    encoder: &'a mut Encoder<W>,
    open: bool,
}

impl<'a, W: Write> ListEncoder<'a, W> {
    fn open(encoder: &'a mut Encoder<W>) -> Result<Self, BencodeError> {
        encoder.token(LIST_START)?;
        Ok(Self {
            encoder,
            open: true,
        })
    }

    /// Appends one item.
    pub fn add<T: ToBencode + ?Sized>(&mut self, value: &T) -> Result<&mut Self, BencodeError> {
        self.encoder.emit(value)?;
        Ok(self)
    }

    /// Starts a nested list as the next item.
    pub fn begin_list(&mut self) -> Result<ListEncoder<'_, W>, BencodeError> {
        self.encoder.begin_list()
    }

    /// Starts a nested dictionary as the next item.
    pub fn begin_dict(&mut self) -> Result<DictEncoder<'_, W>, BencodeError> {
        self.encoder.begin_dict()
    }

    /// Writes the closing `e`.
    pub fn finish(mut self) -> Result<(), BencodeError> {
        self.open = false;
        self.encoder.token(END)
    }
}

impl<W: Write> Drop for ListEncoder<'_, W> {
    fn drop(&mut self) {
        if self.open {
            self.encoder.close_on_drop("list");
        }
    }
}

/// Incremental dictionary writer returned by [`Encoder::begin_dict`].
///
/// Entries are written in call order with no sorting or duplicate check.
/// Closing follows the same rules as [`ListEncoder`].
#[must_use = "a dict is closed when the builder is finished or dropped"]
pub struct DictEncoder<'a, W: Write> {
    encoder: &'a mut Encoder<W>,
    open: bool,
}

impl<'a, W: Write> DictEncoder<'a, W> {
    fn open(encoder: &'a mut Encoder<W>) -> Result<Self, BencodeError> {
        encoder.token(DICT_START)?;
        Ok(Self {
            encoder,
            open: true,
        })
    }

    /// Appends one key/value pair.
    pub fn add<K, T>(&mut self, key: &K, value: &T) -> Result<&mut Self, BencodeError>
    where
        K: AsRef<[u8]> + ?Sized,
        T: ToBencode + ?Sized,
    {
        self.encoder.emit_bytes(key.as_ref())?;
        self.encoder.emit(value)?;
        Ok(self)
    }

    /// Writes `key` and starts a nested list as its value.
    pub fn begin_list<K>(&mut self, key: &K) -> Result<ListEncoder<'_, W>, BencodeError>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.encoder.emit_bytes(key.as_ref())?;
        self.encoder.begin_list()
    }

    /// Writes `key` and starts a nested dictionary as its value.
    pub fn begin_dict<K>(&mut self, key: &K) -> Result<DictEncoder<'_, W>, BencodeError>
    where
        K: AsRef<[u8]> + ?Sized,
    {
        self.encoder.emit_bytes(key.as_ref())?;
        self.encoder.begin_dict()
    }

    /// Writes the closing `e`.
    pub fn finish(mut self) -> Result<(), BencodeError> {
        self.open = false;
        self.encoder.token(END)
    }
}

impl<W: Write> Drop for DictEncoder<'_, W> {
    fn drop(&mut self) {
        if self.open {
            self.encoder.close_on_drop("dict");
        }
    }
}

impl ToBencode for Value {
    fn to_bencode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), BencodeError> {
        match self {
            Value::Integer(i) => encoder.emit_integer(*i),
            Value::Bytes(b) => encoder.emit_bytes(b),
            Value::List(l) => l.to_bencode(encoder),
            Value::Dict(d) => d.to_bencode(encoder),
        }
    }
}

impl ToBencode for ValueRef<'_> {
    fn to_bencode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), BencodeError> {
        match self {
            ValueRef::Integer(i) => encoder.emit_integer(*i),
            ValueRef::Bytes(b) => encoder.emit_bytes(b),
            ValueRef::List(l) => l.to_bencode(encoder),
            ValueRef::Dict(d) => d.to_bencode(encoder),
        }
    }
}

impl<T: ToBencode + ?Sized> ToBencode for &T {
    fn to_bencode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), BencodeError> {
        (**self).to_bencode(encoder)
    }
}

/// `None` is the absent top-level value, which has no encoding.
impl<T: ToBencode> ToBencode for Option<T> {
    fn to_bencode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), BencodeError> {
        match self {
            Some(value) => value.to_bencode(encoder),
            None => {
                tracing::debug!("refusing to encode an absent value");
                Err(BencodeError::UnsupportedType("absent"))
            }
        }
    }
}

// u8 is left out so that byte strings and lists of integers never overlap.
macro_rules! impl_integer_to_bencode {
    ($($ty:ty),*) => {
        $(
            impl ToBencode for $ty {
                fn to_bencode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), BencodeError> {
                    encoder.emit_decimal(*self)
                }
            }
        )*
    };
}

impl_integer_to_bencode!(i8, i16, i32, i64, isize, u16, u32, u64, usize);

macro_rules! impl_bytes_to_bencode {
    ($($ty:ty),*) => {
        $(
            impl ToBencode for $ty {
                fn to_bencode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), BencodeError> {
                    encoder.emit_bytes(AsRef::<[u8]>::as_ref(self))
                }
            }
        )*
    };
}

impl_bytes_to_bencode!(str, String, [u8], Bytes);

impl<const N: usize> ToBencode for [u8; N] {
    fn to_bencode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), BencodeError> {
        encoder.emit_bytes(self)
    }
}

impl<T: ToBencode> ToBencode for Vec<T> {
    fn to_bencode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), BencodeError> {
        let mut list = encoder.begin_list()?;
        for item in self {
            list.add(item)?;
        }
        list.finish()
    }
}

impl<K, V> ToBencode for BTreeMap<K, V>
where
    K: AsRef<[u8]>,
    V: ToBencode,
{
    fn to_bencode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), BencodeError> {
        let mut dict = encoder.begin_dict()?;
        for (key, value) in self {
            dict.add(key, value)?;
        }
        dict.finish()
    }
}

macro_rules! impl_tuple_to_bencode {
    ($(($($name:ident $idx:tt),+)),* $(,)?) => {
        $(
            impl<$($name: ToBencode),+> ToBencode for ($($name,)+) {
                fn to_bencode<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<(), BencodeError> {
                    let mut list = encoder.begin_list()?;
                    $(list.add(&self.$idx)?;)+
                    list.finish()
                }
            }
        )*
    };
}

impl_tuple_to_bencode!(
    (A 0),
    (A 0, B 1),
    (A 0, B 1, C 2),
    (A 0, B 1, C 2, D 3),
    (A 0, B 1, C 2, D 3, E 4),
    (A 0, B 1, C 2, D 3, E 4, F 5),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_encodes_as_list() {
        assert_eq!(encode(&(1, "spam", -3i64)).unwrap(), b"li1e4:spami-3ee");
    }

    #[test]
    fn test_nested_builders() {
        let mut encoder = Encoder::new(Vec::new());
        {
            let mut dict = encoder.begin_dict().unwrap();
            {
                let mut list = dict.begin_list("a").unwrap();
                list.add(&1).unwrap();
                list.begin_dict().unwrap().add("x", "y").unwrap();
                list.finish().unwrap();
            }
            dict.add("b", &Bytes::from_static(b"\x00\xff")).unwrap();
            dict.finish().unwrap();
        }
        assert_eq!(encoder.into_inner(), b"d1:ali1ed1:x1:yee1:b2:\x00\xffe");
    }
}
