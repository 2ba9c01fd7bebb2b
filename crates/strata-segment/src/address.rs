use strata_core::static_assertions::const_assert_eq;
use strata_core::NibbleArray;

use glam::UVec3;
use ndshape::{ConstShape, ConstShape3u32};

/// A 12-bit index into a segment's palette.
pub type PaletteAddress = u16;

pub const ADDRESS_BITS: u32 = 12;
pub const ADDRESS_MASK: PaletteAddress = (1 << ADDRESS_BITS) - 1;

/// The address of the canonical empty record.
pub const EMPTY_ADDRESS: PaletteAddress = 0;

/// The 16x16x16 shape of a segment.
///
/// Coordinates are linearized as `x * 256 + y * 16 + z`, so they are passed to the shape in `[z, y, x]` order.
pub type SegmentShape = ConstShape3u32<16, 16, 16>;
pub const SEGMENT_SIZE: usize = SegmentShape::SIZE as usize;
pub const SEGMENT_EDGE_LENGTH: u32 = 16;

const_assert_eq!(SEGMENT_SIZE, 1 << ADDRESS_BITS);

/// The linear index of the cell at `p`. Each component of `p` must be less than 16.
#[inline]
pub fn cell_index(p: UVec3) -> usize {
    debug_assert!(
        p.max_element() < SEGMENT_EDGE_LENGTH,
        "cell {:?} is outside of the segment",
        p
    );
    SegmentShape::linearize([p.z, p.y, p.x]) as usize
}

/// The cell coordinates at linear index `i`.
#[inline]
pub fn cell_coords(i: usize) -> UVec3 {
    let [z, y, x] = SegmentShape::delinearize(i as u32);
    UVec3::new(x, y, z)
}

/// Per-cell palette addresses, split into a byte array for the low 8 bits and a [`NibbleArray`] for the high 4 bits.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CellAddresses {
    low: Box<[u8]>,
    high: NibbleArray,
}

pub const LOW_BYTES_LEN: usize = SEGMENT_SIZE;
pub const HIGH_BYTES_LEN: usize = SEGMENT_SIZE / 2;

impl Default for CellAddresses {
    fn default() -> Self {
        Self {
            low: vec![0; LOW_BYTES_LEN].into_boxed_slice(),
            high: NibbleArray::new(SEGMENT_SIZE),
        }
    }
}

impl CellAddresses {
    #[inline]
    pub fn get(&self, index: usize) -> PaletteAddress {
        self.low[index] as PaletteAddress | (self.high.get(index) as PaletteAddress) << 8
    }

    /// Only the low 12 bits of `address` are stored.
    #[inline]
    pub fn set(&mut self, index: usize, address: PaletteAddress) {
        self.low[index] = address as u8;
        self.high.set(index, (address >> 8) as u8);
    }

    /// Points every cell at `address`.
    pub fn fill(&mut self, address: PaletteAddress) {
        self.low.fill(address as u8);
        self.high.fill((address >> 8) as u8);
    }

    /// Repoints every cell at `from` to `to`.
    pub fn replace(&mut self, from: PaletteAddress, to: PaletteAddress) {
        for index in 0..SEGMENT_SIZE {
            if self.get(index) == from {
                self.set(index, to);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = PaletteAddress> + '_ {
        (0..SEGMENT_SIZE).map(|i| self.get(i))
    }

    pub fn low_bytes(&self) -> &[u8] {
        &self.low
    }

    pub fn high_bytes(&self) -> &[u8] {
        self.high.as_bytes()
    }

    /// Builds addresses from raw low and high arrays. Returns `None` if either slice has the wrong length.
    pub fn from_bytes(low: &[u8], high: &[u8]) -> Option<Self> {
        if low.len() != LOW_BYTES_LEN || high.len() != HIGH_BYTES_LEN {
            return None;
        }
        let mut addresses = Self::default();
        addresses.low.copy_from_slice(low);
        addresses.high.as_bytes_mut().copy_from_slice(high);
        Some(addresses)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cell_index_is_x_major() {
        assert_eq!(cell_index(UVec3::new(0, 0, 0)), 0);
        assert_eq!(cell_index(UVec3::new(0, 0, 1)), 1);
        assert_eq!(cell_index(UVec3::new(0, 1, 0)), 16);
        assert_eq!(cell_index(UVec3::new(1, 0, 0)), 256);
        assert_eq!(cell_index(UVec3::new(1, 2, 3)), 256 + 32 + 3);
        assert_eq!(cell_index(UVec3::new(15, 15, 15)), 4095);
    }

    #[test]
    fn cell_coords_inverts_cell_index() {
        for i in [0, 1, 17, 300, 2048, 4095] {
            assert_eq!(cell_index(cell_coords(i)), i);
        }
    }

    #[test]
    fn address_is_split_into_low_byte_and_high_nibble() {
        let mut addresses = CellAddresses::default();
        addresses.set(5, 0xABC);
        addresses.set(4, 0x123);

        assert_eq!(addresses.get(5), 0xABC);
        assert_eq!(addresses.get(4), 0x123);
        assert_eq!(addresses.low_bytes()[5], 0xBC);
        assert_eq!(addresses.low_bytes()[4], 0x23);
        // Cell 4 is the low nibble and cell 5 the high nibble of the same byte.
        assert_eq!(addresses.high_bytes()[2], 0xA1);
    }

    #[test]
    fn fill_points_every_cell_at_one_address() {
        let mut addresses = CellAddresses::default();
        addresses.set(100, 0xFFF);
        addresses.fill(0x321);
        assert!(addresses.iter().all(|a| a == 0x321));
    }

    #[test]
    fn from_bytes_checks_lengths() {
        let addresses = CellAddresses::default();
        let restored =
            CellAddresses::from_bytes(addresses.low_bytes(), addresses.high_bytes()).unwrap();
        assert_eq!(restored, addresses);
        assert!(CellAddresses::from_bytes(&[0; 10], addresses.high_bytes()).is_none());
    }

    #[test]
    fn replace_repoints_only_matching_cells() {
        let mut addresses = CellAddresses::default();
        addresses.set(3, 0x7AB);
        addresses.set(4000, 0x7AB);
        addresses.set(9, 0x001);
        addresses.replace(0x7AB, 0x123);

        assert_eq!(addresses.get(3), 0x123);
        assert_eq!(addresses.get(4000), 0x123);
        assert_eq!(addresses.get(9), 0x001);
        assert_eq!(addresses.iter().filter(|&a| a == 0).count(), SEGMENT_SIZE - 3);
    }
}
