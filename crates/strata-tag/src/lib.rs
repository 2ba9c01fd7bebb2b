//! Free-form tag values attached to segment cells.
//!
//! A [`Tag`] is a small self-describing tree: integers, strings, byte arrays, lists and string-keyed [`Compound`]s. Tags
//! support deep equality and hashing so they can be deduplicated, and they have a compact big-endian binary form (see
//! [`encode_root`] and [`decode_root`]).

mod codec;
mod compound;

pub use codec::*;
pub use compound::*;

/// A node in a tag tree.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    ByteArray(Vec<u8>),
    String(String),
    List(Vec<Tag>),
    Compound(Compound),
}

impl Tag {
    /// The type byte written in front of this tag's payload.
    pub fn type_id(&self) -> u8 {
        match self {
            Tag::Byte(_) => TYPE_BYTE,
            Tag::Short(_) => TYPE_SHORT,
            Tag::Int(_) => TYPE_INT,
            Tag::Long(_) => TYPE_LONG,
            Tag::ByteArray(_) => TYPE_BYTE_ARRAY,
            Tag::String(_) => TYPE_STRING,
            Tag::List(_) => TYPE_LIST,
            Tag::Compound(_) => TYPE_COMPOUND,
        }
    }
}

impl From<i8> for Tag {
    fn from(x: i8) -> Self {
        Tag::Byte(x)
    }
}

impl From<i16> for Tag {
    fn from(x: i16) -> Self {
        Tag::Short(x)
    }
}

impl From<i32> for Tag {
    fn from(x: i32) -> Self {
        Tag::Int(x)
    }
}

impl From<i64> for Tag {
    fn from(x: i64) -> Self {
        Tag::Long(x)
    }
}

impl From<&str> for Tag {
    fn from(x: &str) -> Self {
        Tag::String(x.to_owned())
    }
}

impl From<String> for Tag {
    fn from(x: String) -> Self {
        Tag::String(x)
    }
}

impl From<Vec<u8>> for Tag {
    fn from(x: Vec<u8>) -> Self {
        Tag::ByteArray(x)
    }
}

impl From<Compound> for Tag {
    fn from(x: Compound) -> Self {
        Tag::Compound(x)
    }
}
