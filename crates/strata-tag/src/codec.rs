use crate::{Compound, Tag};

use thiserror::Error;

pub const TYPE_END: u8 = 0;
pub const TYPE_BYTE: u8 = 1;
pub const TYPE_SHORT: u8 = 2;
pub const TYPE_INT: u8 = 3;
pub const TYPE_LONG: u8 = 4;
pub const TYPE_BYTE_ARRAY: u8 = 7;
pub const TYPE_STRING: u8 = 8;
pub const TYPE_LIST: u8 = 9;
pub const TYPE_COMPOUND: u8 = 10;

/// Nesting deeper than this is rejected while decoding.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum TagError {
    #[error("tag data ended unexpectedly")]
    UnexpectedEof,
    #[error("unknown tag type {0}")]
    UnknownType(u8),
    #[error("root tag must be a compound, found type {0}")]
    RootNotCompound(u8),
    #[error("tag string is not valid UTF-8")]
    InvalidUtf8,
    #[error("tag nesting is too deep")]
    TooDeep,
}

/// Appends the binary form of a root compound to `out`.
///
/// Layout (all integers big-endian): the compound type byte, an empty root name, then the compound payload. A compound
/// payload is a sequence of `type, name, payload` entries closed by [`TYPE_END`]. Strings and byte arrays are prefixed
/// with a `u32` length. Lists are a `u32` count followed by `type, payload` per element.
pub fn encode_root(root: &Compound, out: &mut Vec<u8>) {
    out.push(TYPE_COMPOUND);
    write_str("", out);
    write_compound(root, out);
}

/// Decodes a root compound from the front of `bytes`, advancing the slice past it.
pub fn decode_root(bytes: &mut &[u8]) -> Result<Compound, TagError> {
    let type_id = read_u8(bytes)?;
    if type_id != TYPE_COMPOUND {
        return Err(TagError::RootNotCompound(type_id));
    }
    // Root name is written but has no meaning.
    read_string(bytes)?;
    read_compound(bytes, 0)
}

fn write_str(s: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(&(s.len() as u32).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn write_compound(compound: &Compound, out: &mut Vec<u8>) {
    for (key, value) in compound.iter() {
        out.push(value.type_id());
        write_str(key, out);
        write_payload(value, out);
    }
    out.push(TYPE_END);
}

fn write_payload(tag: &Tag, out: &mut Vec<u8>) {
    match tag {
        Tag::Byte(x) => out.extend_from_slice(&x.to_be_bytes()),
        Tag::Short(x) => out.extend_from_slice(&x.to_be_bytes()),
        Tag::Int(x) => out.extend_from_slice(&x.to_be_bytes()),
        Tag::Long(x) => out.extend_from_slice(&x.to_be_bytes()),
        Tag::ByteArray(x) => {
            out.extend_from_slice(&(x.len() as u32).to_be_bytes());
            out.extend_from_slice(x);
        }
        Tag::String(x) => write_str(x, out),
        Tag::List(elements) => {
            out.extend_from_slice(&(elements.len() as u32).to_be_bytes());
            for element in elements {
                out.push(element.type_id());
                write_payload(element, out);
            }
        }
        Tag::Compound(x) => write_compound(x, out),
    }
}

fn take<'a>(bytes: &mut &'a [u8], n: usize) -> Result<&'a [u8], TagError> {
    if bytes.len() < n {
        return Err(TagError::UnexpectedEof);
    }
    let (head, tail) = bytes.split_at(n);
    *bytes = tail;
    Ok(head)
}

fn take_array<const N: usize>(bytes: &mut &[u8]) -> Result<[u8; N], TagError> {
    let mut array = [0; N];
    array.copy_from_slice(take(bytes, N)?);
    Ok(array)
}

fn read_u8(bytes: &mut &[u8]) -> Result<u8, TagError> {
    Ok(take(bytes, 1)?[0])
}

fn read_len(bytes: &mut &[u8]) -> Result<usize, TagError> {
    Ok(u32::from_be_bytes(take_array(bytes)?) as usize)
}

fn read_string(bytes: &mut &[u8]) -> Result<String, TagError> {
    let len = read_len(bytes)?;
    let raw = take(bytes, len)?;
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| TagError::InvalidUtf8)
}

fn read_compound(bytes: &mut &[u8], depth: usize) -> Result<Compound, TagError> {
    if depth >= MAX_DEPTH {
        return Err(TagError::TooDeep);
    }
    let mut compound = Compound::new();
    loop {
        let type_id = read_u8(bytes)?;
        if type_id == TYPE_END {
            return Ok(compound);
        }
        let key = read_string(bytes)?;
        let value = read_payload(type_id, bytes, depth + 1)?;
        compound.insert(key, value);
    }
}

fn read_payload(type_id: u8, bytes: &mut &[u8], depth: usize) -> Result<Tag, TagError> {
    let tag = match type_id {
        TYPE_BYTE => Tag::Byte(i8::from_be_bytes(take_array(bytes)?)),
        TYPE_SHORT => Tag::Short(i16::from_be_bytes(take_array(bytes)?)),
        TYPE_INT => Tag::Int(i32::from_be_bytes(take_array(bytes)?)),
        TYPE_LONG => Tag::Long(i64::from_be_bytes(take_array(bytes)?)),
        TYPE_BYTE_ARRAY => {
            let len = read_len(bytes)?;
            Tag::ByteArray(take(bytes, len)?.to_vec())
        }
        TYPE_STRING => Tag::String(read_string(bytes)?),
        TYPE_LIST => {
            if depth >= MAX_DEPTH {
                return Err(TagError::TooDeep);
            }
            let len = read_len(bytes)?;
            // Every element costs at least its type byte, so this bounds the allocation by the input size.
            if len > bytes.len() {
                return Err(TagError::UnexpectedEof);
            }
            let mut elements = Vec::with_capacity(len);
            for _ in 0..len {
                let element_type = read_u8(bytes)?;
                elements.push(read_payload(element_type, bytes, depth + 1)?);
            }
            Tag::List(elements)
        }
        TYPE_COMPOUND => Tag::Compound(read_compound(bytes, depth)?),
        other => return Err(TagError::UnknownType(other)),
    };
    Ok(tag)
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
