use crate::registry::ObjectTypeFlags;

/// Aggregate cell counts derived from object types. Not persisted; rebuilt with a full sweep after import.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SegmentCounters {
    /// Cells whose object type is not empty.
    pub non_empty: u16,
    /// Non-empty cells whose object type needs periodic updates.
    pub periodic_update: u16,
}

impl SegmentCounters {
    #[inline]
    pub fn add(&mut self, flags: ObjectTypeFlags) {
        if flags.is_empty {
            return;
        }
        self.non_empty += 1;
        if flags.needs_periodic_update {
            self.periodic_update += 1;
        }
    }

    /// Saturates at zero; counts that were never rebuilt after an import can otherwise underflow.
    #[inline]
    pub fn remove(&mut self, flags: ObjectTypeFlags) {
        if flags.is_empty {
            return;
        }
        self.non_empty = self.non_empty.saturating_sub(1);
        if flags.needs_periodic_update {
            self.periodic_update = self.periodic_update.saturating_sub(1);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.non_empty == 0
    }

    #[inline]
    pub fn needs_periodic_update(&self) -> bool {
        self.periodic_update > 0
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

    const TICKING: ObjectTypeFlags = ObjectTypeFlags {
        is_empty: false,
        needs_periodic_update: true,
    };
    const SOLID: ObjectTypeFlags = ObjectTypeFlags {
        is_empty: false,
        needs_periodic_update: false,
    };

    #[test]
    fn empty_types_are_not_counted() {
        let mut counters = SegmentCounters::default();
        counters.add(ObjectTypeFlags::EMPTY);
        counters.remove(ObjectTypeFlags::EMPTY);
        assert_eq!(counters, SegmentCounters::default());
        assert!(counters.is_empty());
    }

    #[test]
    fn add_and_remove_balance() {
        let mut counters = SegmentCounters::default();
        counters.add(TICKING);
        counters.add(SOLID);
        assert_eq!(counters.non_empty, 2);
        assert!(counters.needs_periodic_update());

        counters.remove(TICKING);
        assert_eq!(counters.non_empty, 1);
        assert!(!counters.needs_periodic_update());
    }

    #[test]
    fn remove_saturates() {
        let mut counters = SegmentCounters::default();
        counters.remove(TICKING);
        assert_eq!(counters, SegmentCounters::default());
    }
}
