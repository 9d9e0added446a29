//! rbencode - Bencode encoding and decoding ([BEP-3])
//!
//! Bencode is the serialization format used throughout BitTorrent for storing
//! and transmitting structured data, including `.torrent` files, tracker
//! responses and DHT messages. It is usually read from untrusted peers, so the
//! decoder bounds nesting depth and rejects integer overflow.
//!
//! # Data Types
//!
//! Bencode supports four data types:
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! # Owning and zero-copy decoding
//!
//! [`decode`] copies every byte string into a [`Value`]. [`decode_view`]
//! produces a [`ValueRef`] whose byte strings borrow from the input buffer.
//! Both return `Ok(None)` when the input is empty.
//!
//! ```
//! use rbencode::{decode, decode_view};
//!
//! let data = b"d3:cow3:moo4:spam4:eggse";
//!
//! let owned = decode(data).unwrap().unwrap();
//! assert_eq!(owned.get(b"cow").and_then(|v| v.as_str()), Some("moo"));
//!
//! let view = decode_view(data).unwrap().unwrap();
//! assert_eq!(view.get(b"spam").and_then(|v| v.as_bytes()), Some(&b"eggs"[..]));
//! ```
//!
//! Readers are decoded through a [`StreamCursor`], in copy mode only:
//!
//! ```
//! use rbencode::decode_reader;
//!
//! let value = decode_reader(&b"i-7e"[..]).unwrap().unwrap();
//! assert_eq!(value.as_integer(), Some(-7));
//! ```
//!
//! # Encoding
//!
//! ```
//! use rbencode::{encode, Encoder, Value};
//! use bytes::Bytes;
//! use std::collections::BTreeMap;
//!
//! let mut info = BTreeMap::new();
//! info.insert(Bytes::from_static(b"length"), Value::Integer(1024));
//! info.insert(Bytes::from_static(b"name"), Value::string("example.txt"));
//! assert_eq!(
//!     encode(&Value::Dict(info)).unwrap(),
//!     b"d6:lengthi1024e4:name11:example.txte"
//! );
//!
//! // Builders write straight to the sink and close themselves on drop.
//! let mut encoder = Encoder::new(Vec::new());
//! encoder
//!     .emit_list(|list| {
//!         list.add("spam")?.add(&42)?;
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(encoder.into_inner(), b"l4:spami42ee");
//! ```
//!
//! # Error Handling
//!
//! Decoding can fail for various reasons:
//!
//! - [`BencodeError::UnexpectedEof`] - Input ended inside a value
//! - [`BencodeError::MalformedToken`] - Missing `e` or `:` delimiter
//! - [`BencodeError::UnknownType`] - Unrecognized leading byte
//! - [`BencodeError::ExpectedStringKey`] - Dictionary key is not a byte string
//! - [`BencodeError::DuplicateKey`] - Dictionary key appears twice
//! - [`BencodeError::NestingTooDeep`] - Depth limit exceeded (64 levels by default)
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod constants;
mod cursor;
mod decode;
mod encode;
mod error;
mod value;

pub use constants::DEFAULT_MAX_DEPTH;
pub use cursor::{BufferCursor, Cursor, StreamCursor};
pub use decode::{
    decode, decode_exact, decode_from, decode_reader, decode_view, decode_view_from,
    DecodeOptions, Decoder,
};
pub use encode::{encode, encode_to, DictEncoder, Encoder, ListEncoder, ToBencode};
pub use error::BencodeError;
pub use value::{Kind, Value, ValueRef};
