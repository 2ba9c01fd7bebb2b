//! The strata segment data model.
//!
//! # Segments
//!
//! A chunk column is split vertically into [`Segment`]s of 16x16x16 cells. Every cell has an object type, a 4-bit secondary
//! value, 4-bit sky and local light levels and an optional free-form [`Compound`] tag.
//!
//! ## Palette
//!
//! Cells don't store their attributes directly. Each cell holds a 12-bit [`PaletteAddress`] into a per-segment [`Palette`]
//! of deduplicated, reference-counted records, so cells with identical attributes share storage. Address 0 holds the empty
//! record (no attributes at all), which every cell of a fresh segment points at. Only when every cell holds distinct
//! non-empty content does another record borrow that slot, and it moves out again as soon as a cell needs the empty record.
//!
//! Records are placed by content hash: a new record lands at the address derived from its hash, or at the nearest vacant
//! address to it. When the last cell referring to a record moves away, the record is evicted and its slot can be reused.
//!
//! ## Persistence
//!
//! [`Segment::export`] and [`Segment::import`] read and write a compact binary form. Import validates everything it reads
//! and resets the segment on failure. Derived counters are not stored; call [`Segment::recount`] after importing.

mod address;
pub mod attributes;
mod config;
mod counters;
mod io;
mod palette;
mod registry;
mod segment;

pub use address::*;
pub use config::*;
pub use counters::*;
pub use io::*;
pub use palette::*;
pub use registry::*;
pub use segment::*;

pub use glam;
pub use strata_tag as tag;
pub use strata_tag::Compound;
