/// A dense array of 4-bit values, two per byte.
///
/// Entry `i` lives in byte `i / 2`: even entries in the low nibble, odd entries in the high nibble. The backing bytes are
/// exposed so the array can be written and read verbatim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NibbleArray {
    bytes: Box<[u8]>,
}

impl NibbleArray {
    /// An array of `len` zeroed nibbles. `len` must be even.
    pub fn new(len: usize) -> Self {
        assert!(len % 2 == 0, "NibbleArray length must be even, got {}", len);
        Self {
            bytes: vec![0; len / 2].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() * 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> u8 {
        let byte = self.bytes[i >> 1];
        if i & 1 == 0 {
            byte & 0x0F
        } else {
            byte >> 4
        }
    }

    /// Only the low 4 bits of `value` are stored.
    #[inline]
    pub fn set(&mut self, i: usize, value: u8) {
        let value = value & 0x0F;
        let byte = &mut self.bytes[i >> 1];
        if i & 1 == 0 {
            *byte = (*byte & 0xF0) | value;
        } else {
            *byte = (*byte & 0x0F) | (value << 4);
        }
    }

    pub fn fill(&mut self, value: u8) {
        let value = value & 0x0F;
        self.bytes.fill(value | (value << 4));
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
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
    fn neighbors_do_not_clobber_each_other() {
        let mut nibbles = NibbleArray::new(4096);
        nibbles.set(10, 0xA);
        nibbles.set(11, 0x5);
        assert_eq!(nibbles.get(10), 0xA);
        assert_eq!(nibbles.get(11), 0x5);

        nibbles.set(10, 0x3);
        assert_eq!(nibbles.get(10), 0x3);
        assert_eq!(nibbles.get(11), 0x5);
    }

    #[test]
    fn backing_bytes_pack_even_entries_low() {
        let mut nibbles = NibbleArray::new(4);
        nibbles.set(0, 0x1);
        nibbles.set(1, 0x2);
        nibbles.set(3, 0xF);
        assert_eq!(nibbles.as_bytes(), &[0x21, 0xF0]);
    }

    #[test]
    fn values_are_masked_to_four_bits() {
        let mut nibbles = NibbleArray::new(2);
        nibbles.set(0, 0x1C);
        assert_eq!(nibbles.get(0), 0xC);
        assert_eq!(nibbles.get(1), 0);
    }

    #[test]
    fn fill_sets_every_entry() {
        let mut nibbles = NibbleArray::new(16);
        nibbles.fill(0x7);
        assert!((0..16).all(|i| nibbles.get(i) == 0x7));
        nibbles.fill(0);
        assert!(nibbles.as_bytes().iter().all(|&b| b == 0));
    }
}
