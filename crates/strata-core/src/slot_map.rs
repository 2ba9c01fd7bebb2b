use static_assertions::const_assert_eq;
use std::ops::{Index, IndexMut};

/// Number of slots in a [`SlotMap4096`]; exactly one per cell of a 16x16x16 segment.
pub const SLOT_CAPACITY: usize = 4096;

const_assert_eq!(SLOT_CAPACITY, 16 * 16 * 16);

/// A fixed-capacity map from slot index in `0..N` to values of type `T`.
///
/// Unlike a general purpose slab, the caller chooses which slot a value lands in. [`FixedSlotMap::find_vacant_near`]
/// implements the expanding two-sided probe used to place values near a preferred slot.
#[derive(Clone, Debug)]
pub struct FixedSlotMap<T, const N: usize> {
    slots: Box<[Option<T>]>,
    len: usize,
}

/// The slot map used by segment palettes.
pub type SlotMap4096<T> = FixedSlotMap<T, SLOT_CAPACITY>;

impl<T, const N: usize> Default for FixedSlotMap<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> FixedSlotMap<T, N> {
    pub fn new() -> Self {
        Self {
            slots: (0..N).map(|_| None).collect(),
            len: 0,
        }
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    #[inline]
    pub fn is_vacant(&self, slot: usize) -> bool {
        self.slots[slot].is_none()
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Puts `value` into `slot`, returning the value that previously occupied it.
    pub fn insert(&mut self, slot: usize, value: T) -> Option<T> {
        let old = self.slots[slot].replace(value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    pub fn remove(&mut self, slot: usize) -> Option<T> {
        let old = self.slots[slot].take();
        if old.is_some() {
            self.len -= 1;
        }
        old
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.len = 0;
    }

    /// Iterates over occupied slots in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v)))
    }

    /// Finds the vacant slot closest to `candidate`.
    ///
    /// `candidate` itself is tried first. Then for each distance `i` in `1..N`, `candidate + i` is tried before
    /// `candidate - i`, skipping whichever side falls outside of `0..N`. Returns `None` only when every slot is occupied.
    pub fn find_vacant_near(&self, candidate: usize) -> Option<usize> {
        debug_assert!(candidate < N);

        if self.is_vacant(candidate) {
            return Some(candidate);
        }
        if self.is_full() {
            return None;
        }

        for i in 1..N {
            let right = candidate + i;
            if right < N && self.is_vacant(right) {
                return Some(right);
            }
            if let Some(left) = candidate.checked_sub(i) {
                if self.is_vacant(left) {
                    return Some(left);
                }
            }
        }

        None
    }
}

impl<T, const N: usize> Index<usize> for FixedSlotMap<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, slot: usize) -> &Self::Output {
        match self.slots[slot].as_ref() {
            Some(value) => value,
            None => panic!("Slot {} is vacant", slot),
        }
    }
}

impl<T, const N: usize> IndexMut<usize> for FixedSlotMap<T, N> {
    #[inline]
    fn index_mut(&mut self, slot: usize) -> &mut Self::Output {
        match self.slots[slot].as_mut() {
            Some(value) => value,
            None => panic!("Slot {} is vacant", slot),
        }
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
    fn insert_and_remove_track_len() {
        let mut map = SlotMap4096::new();
        assert!(map.is_empty());

        assert_eq!(map.insert(7, 'a'), None);
        assert_eq!(map.insert(7, 'b'), Some('a'));
        assert_eq!(map.len(), 1);
        assert_eq!(map[7], 'b');

        assert_eq!(map.remove(7), Some('b'));
        assert_eq!(map.remove(7), None);
        assert!(map.is_empty());
    }

    #[test]
    fn vacant_candidate_is_taken_as_is() {
        let map = FixedSlotMap::<(), 8>::new();
        assert_eq!(map.find_vacant_near(5), Some(5));
    }

    #[test]
    fn probe_prefers_right_before_left() {
        let mut map = FixedSlotMap::<(), 8>::new();
        map.insert(4, ());
        assert_eq!(map.find_vacant_near(4), Some(5));

        map.insert(5, ());
        assert_eq!(map.find_vacant_near(4), Some(3));

        map.insert(3, ());
        assert_eq!(map.find_vacant_near(4), Some(6));
    }

    #[test]
    fn probe_does_not_skip_distances() {
        let mut map = FixedSlotMap::<(), 8>::new();
        for slot in [2, 3, 4, 5, 6] {
            map.insert(slot, ());
        }
        // Distance 1 and 2 are occupied on both sides; distance 3 finds 7 before 1.
        assert_eq!(map.find_vacant_near(4), Some(7));
        map.insert(7, ());
        assert_eq!(map.find_vacant_near(4), Some(1));
    }

    #[test]
    fn probe_clips_at_both_edges() {
        let mut map = FixedSlotMap::<(), 8>::new();
        for slot in 1..8 {
            map.insert(slot, ());
        }
        assert_eq!(map.find_vacant_near(7), Some(0));

        map.insert(0, ());
        map.remove(7);
        assert_eq!(map.find_vacant_near(0), Some(7));
    }

    #[test]
    fn full_map_has_no_vacancy() {
        let mut map = SlotMap4096::new();
        for slot in 0..SLOT_CAPACITY {
            map.insert(slot, slot);
        }
        assert!(map.is_full());
        assert_eq!(map.find_vacant_near(2048), None);

        map.remove(0);
        assert_eq!(map.find_vacant_near(4095), Some(0));
    }

    #[test]
    fn iter_is_in_slot_order() {
        let mut map = SlotMap4096::new();
        map.insert(300, "c");
        map.insert(0, "a");
        map.insert(12, "b");
        let slots: Vec<_> = map.iter().collect();
        assert_eq!(slots, vec![(0, &"a"), (12, &"b"), (300, &"c")]);
    }
}
