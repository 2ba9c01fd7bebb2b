pub mod nibble_array;
pub mod slot_map;

pub use nibble_array::NibbleArray;
pub use slot_map::{FixedSlotMap, SlotMap4096, SLOT_CAPACITY};

use ahash::{AHashMap, AHashSet, AHasher};
use std::hash::{Hash, Hasher};

pub type SmallKeyHashMap<K, V> = AHashMap<K, V>;
pub type SmallKeyHashSet<K> = AHashSet<K>;

// Re-exports.
pub use ahash;
pub use static_assertions;

/// Hashes `value` down to 32 bits with a fixed-key [`AHasher`].
///
/// The result is stable for the lifetime of the process, which is all that in-memory deduplication needs. It is never
/// written to disk.
pub fn hash32<T: Hash + ?Sized>(value: &T) -> u32 {
    let mut hasher = AHasher::default();
    value.hash(&mut hasher);
    let h = hasher.finish();
    (h ^ (h >> 32)) as u32
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
