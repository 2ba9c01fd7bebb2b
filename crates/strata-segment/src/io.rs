//! Binary form of a [`Segment`].
//!
//! All integers are big-endian.
//!
//! ```text
//! [4096 bytes]  low 8 bits of each cell's address, index = x * 256 + y * 16 + z
//! [2048 bytes]  high 4 bits of each cell's address, two cells per byte
//! per record, in ascending address order:
//!   [1 byte]    payload flag: 0 = none, 1 = present
//!   [if 1]      payload compound, see `strata_tag::encode_root`
//!   [2 bytes]   address (i16)
//!   [2 bytes]   refcount (i16)
//! [1 byte]      0xFF
//! ```
//!
//! The empty record, if present, is at address 0. It is absent only when every cell holds other content.
//!
//! Segment counters are not stored; call [`Segment::recount`] after [`Segment::import`].

use crate::address::{
    CellAddresses, PaletteAddress, EMPTY_ADDRESS, HIGH_BYTES_LEN, LOW_BYTES_LEN, SEGMENT_SIZE,
};
use crate::attributes;
use crate::counters::SegmentCounters;
use crate::palette::{Palette, RestoreConflict};
use crate::Segment;

use lz4_flex::frame::{FrameDecoder, FrameEncoder};
use std::io::{self, Read};
use strata_tag::{decode_root, encode_root, Compound, TagError};
use thiserror::Error;

pub const PAYLOAD_NONE: u8 = 0;
pub const PAYLOAD_PRESENT: u8 = 1;
pub const RECORDS_END: u8 = 0xFF;

/// Why [`Segment::import`] rejected its input. The segment is reset to its empty state whenever this is returned.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("segment data ended unexpectedly")]
    UnexpectedEof,
    #[error("invalid record payload: {0}")]
    Tag(#[from] TagError),
    #[error("unknown record payload flag {0}")]
    InvalidFlag(u8),
    #[error("record address {0} is outside of 0..4096")]
    AddressOutOfRange(i16),
    #[error("two records at address {0}")]
    DuplicateAddress(PaletteAddress),
    #[error("record at address {0} duplicates the content of another record")]
    DuplicateContent(PaletteAddress),
    #[error("record at address {address} has invalid refcount {refcount}")]
    InvalidRefcount { address: PaletteAddress, refcount: i16 },
    #[error("empty record at address {0} instead of 0")]
    MisplacedEmptyRecord(PaletteAddress),
    #[error("record at address {0} has a payload the attribute setters would never write")]
    NonCanonicalPayload(PaletteAddress),
    #[error("cell {cell} refers to missing record {address}")]
    DanglingAddress { cell: usize, address: PaletteAddress },
    #[error("record at address {address} claims {stored} references but {counted} cells refer to it")]
    RefcountMismatch {
        address: PaletteAddress,
        stored: u16,
        counted: u16,
    },
    #[error("failed to decompress segment data: {0}")]
    Decompress(#[source] io::Error),
}

impl Segment {
    /// Writes the cell addresses and every palette record.
    pub fn export(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(LOW_BYTES_LEN + HIGH_BYTES_LEN + 5 * self.palette.len() + 1);
        out.extend_from_slice(self.addresses.low_bytes());
        out.extend_from_slice(self.addresses.high_bytes());
        for record in self.palette.iter() {
            match record.payload() {
                Some(payload) => {
                    out.push(PAYLOAD_PRESENT);
                    encode_root(payload, &mut out);
                }
                None => out.push(PAYLOAD_NONE),
            }
            out.extend_from_slice(&(record.address() as i16).to_be_bytes());
            out.extend_from_slice(&(record.refcount() as i16).to_be_bytes());
        }
        out.push(RECORDS_END);
        out
    }

    /// Replaces the contents of this segment with data written by [`Segment::export`], starting at `bytes[offset]`.
    /// Returns the number of bytes read.
    ///
    /// On error, every cell is reset to the canonical empty record. Counters are zeroed either way; call
    /// [`Segment::recount`] after a successful import.
    pub fn import(&mut self, bytes: &[u8], offset: usize) -> Result<usize, FormatError> {
        let decoded = bytes
            .get(offset..)
            .ok_or(FormatError::UnexpectedEof)
            .and_then(decode);
        match decoded {
            Ok((addresses, palette, consumed)) => {
                log::debug!(
                    "Imported segment at y = {}: {} records from {} bytes",
                    self.base_y(),
                    palette.len(),
                    consumed
                );
                self.addresses = addresses;
                self.palette = palette;
                self.counters = SegmentCounters::default();
                Ok(consumed)
            }
            Err(e) => {
                log::warn!(
                    "Resetting segment at y = {} after failed import: {}",
                    self.base_y(),
                    e
                );
                self.clear();
                Err(e)
            }
        }
    }

    /// [`Segment::export`] wrapped in an LZ4 frame.
    pub fn export_compressed(&self) -> Vec<u8> {
        let bytes = self.export();
        let mut encoder = FrameEncoder::new(Vec::new());
        io::copy(&mut bytes.as_slice(), &mut encoder).expect("writing to a Vec can't fail");
        encoder.finish().expect("writing to a Vec can't fail")
    }

    /// Reverses [`Segment::export_compressed`]. Fails like [`Segment::import`] does.
    pub fn import_compressed(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        let mut decompressed = Vec::new();
        if let Err(e) = FrameDecoder::new(bytes).read_to_end(&mut decompressed) {
            let e = FormatError::Decompress(e);
            log::warn!(
                "Resetting segment at y = {} after failed import: {}",
                self.base_y(),
                e
            );
            self.clear();
            return Err(e);
        }
        self.import(&decompressed, 0).map(|_| ())
    }
}

fn take<'a>(bytes: &mut &'a [u8], n: usize) -> Result<&'a [u8], FormatError> {
    if bytes.len() < n {
        return Err(FormatError::UnexpectedEof);
    }
    let (head, tail) = bytes.split_at(n);
    *bytes = tail;
    Ok(head)
}

fn read_i16(bytes: &mut &[u8]) -> Result<i16, FormatError> {
    let raw = take(bytes, 2)?;
    Ok(i16::from_be_bytes([raw[0], raw[1]]))
}

/// Decodes and validates a whole segment without touching any existing one.
fn decode(bytes: &[u8]) -> Result<(CellAddresses, Palette<Compound>, usize), FormatError> {
    let mut cursor = bytes;

    let low = take(&mut cursor, LOW_BYTES_LEN)?;
    let high = take(&mut cursor, HIGH_BYTES_LEN)?;
    let addresses = CellAddresses::from_bytes(low, high).ok_or(FormatError::UnexpectedEof)?;

    let mut palette = Palette::without_records();
    loop {
        let flag = take(&mut cursor, 1)?[0];
        let payload = match flag {
            RECORDS_END => break,
            PAYLOAD_NONE => None,
            PAYLOAD_PRESENT => Some(decode_root(&mut cursor)?),
            other => return Err(FormatError::InvalidFlag(other)),
        };

        let address = read_i16(&mut cursor)?;
        let refcount = read_i16(&mut cursor)?;
        if !(0..SEGMENT_SIZE as i16).contains(&address) {
            return Err(FormatError::AddressOutOfRange(address));
        }
        let address = address as PaletteAddress;
        match &payload {
            None if address != EMPTY_ADDRESS => return Err(FormatError::MisplacedEmptyRecord(address)),
            Some(payload) if !attributes::is_canonical(payload) => {
                return Err(FormatError::NonCanonicalPayload(address))
            }
            _ => {}
        }
        // Only the empty record may be unreferenced.
        let min_refcount = if payload.is_none() { 0 } else { 1 };
        if !(min_refcount..=SEGMENT_SIZE as i16).contains(&refcount) {
            return Err(FormatError::InvalidRefcount { address, refcount });
        }

        palette
            .restore(payload, address, refcount as u16)
            .map_err(|conflict| match conflict {
                RestoreConflict::AddressOutOfRange => FormatError::AddressOutOfRange(address as i16),
                RestoreConflict::AddressOccupied => FormatError::DuplicateAddress(address),
                RestoreConflict::DuplicateContent => FormatError::DuplicateContent(address),
            })?;
    }

    let mut counts = vec![0u16; SEGMENT_SIZE];
    for (cell, address) in addresses.iter().enumerate() {
        if palette.try_get(address).is_none() {
            return Err(FormatError::DanglingAddress { cell, address });
        }
        counts[address as usize] += 1;
    }
    for record in palette.iter() {
        let counted = counts[record.address() as usize];
        if record.refcount() != counted {
            return Err(FormatError::RefcountMismatch {
                address: record.address(),
                stored: record.refcount(),
                counted,
            });
        }
    }

    Ok((addresses, palette, bytes.len() - cursor.len()))
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
