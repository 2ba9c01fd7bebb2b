//! Palette-compressed storage for 16x16x16 voxel segments.
//!
//! The storage itself lives in [`strata_segment`]; this crate adds file-based configuration and reporting on top.

mod config;
mod summary;

pub use config::Config;
pub use summary::{SegmentSummary, TypeCount};

pub use strata_segment as segment;
pub use strata_tag as tag;
