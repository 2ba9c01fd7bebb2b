use crate::address::{PaletteAddress, ADDRESS_MASK, EMPTY_ADDRESS, SEGMENT_SIZE};

use smallvec::SmallVec;
use strata_core::{hash32, SlotMap4096, SmallKeyHashMap};
use strata_tag::Compound;

/// Content that can be stored in a [`Palette`].
pub trait PalettePayload: Clone + Eq {
    /// A hash of the content. Equal payloads must have equal hashes.
    fn content_hash(&self) -> u32;
}

impl PalettePayload for Compound {
    fn content_hash(&self) -> u32 {
        hash32(self)
    }
}

/// The hash of the canonical empty content.
pub const EMPTY_CONTENT_HASH: u32 = 0;

/// Every cell of a fresh segment refers to the canonical empty record.
pub const EMPTY_RECORD_INITIAL_REFCOUNT: u16 = SEGMENT_SIZE as u16;

/// A shared, reference-counted palette entry. The payload is never mutated after the record is published.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaletteRecord<P> {
    payload: Option<P>,
    content_hash: u32,
    address: PaletteAddress,
    refcount: u16,
}

impl<P: PalettePayload> PaletteRecord<P> {
    fn new(payload: Option<P>, address: PaletteAddress, refcount: u16) -> Self {
        Self {
            content_hash: content_hash(payload.as_ref()),
            payload,
            address,
            refcount,
        }
    }
}

impl<P> PaletteRecord<P> {
    #[inline]
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    #[inline]
    pub fn content_hash(&self) -> u32 {
        self.content_hash
    }

    #[inline]
    pub fn address(&self) -> PaletteAddress {
        self.address
    }

    #[inline]
    pub fn refcount(&self) -> u16 {
        self.refcount
    }
}

pub fn content_hash<P: PalettePayload>(payload: Option<&P>) -> u32 {
    payload.map_or(EMPTY_CONTENT_HASH, P::content_hash)
}

/// The slot a payload with `hash` tries first.
#[inline]
pub fn candidate_address(hash: u32) -> PaletteAddress {
    ((hash ^ (hash >> 16)) as PaletteAddress) & ADDRESS_MASK
}

/// Where [`Palette::change`] put the new content.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Placement {
    /// The record now holding the content.
    pub address: PaletteAddress,
    /// Set when the record at [`EMPTY_ADDRESS`] was moved to make room for the empty record. Cells that referred to
    /// [`EMPTY_ADDRESS`] before the change must be repointed here.
    pub relocated_to: Option<PaletteAddress>,
}

impl Placement {
    fn at(address: PaletteAddress) -> Self {
        Self {
            address,
            relocated_to: None,
        }
    }
}

/// Reasons a record can't be restored into a [`Palette`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RestoreConflict {
    AddressOutOfRange,
    AddressOccupied,
    DuplicateContent,
}

/// A deduplicated table of up to 4096 [`PaletteRecord`]s keyed by 12-bit address.
///
/// Records are stored in a slot map indexed by address. A second index from content hash to addresses finds existing
/// records with equal content. Both indices always cover the same set of records.
///
/// The canonical empty record (no payload) lives at [`EMPTY_ADDRESS`] whenever it exists. It is not evicted when its last
/// reference goes away; only new content that finds no other vacant slot can take its place.
#[derive(Clone, Debug)]
pub struct Palette<P> {
    slots: SlotMap4096<PaletteRecord<P>>,
    dedup: SmallKeyHashMap<u32, SmallVec<[PaletteAddress; 1]>>,
}

impl<P: PalettePayload> Default for Palette<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PalettePayload> Palette<P> {
    /// A palette holding only the canonical empty record, referenced by every cell.
    pub fn new() -> Self {
        let mut palette = Self {
            slots: SlotMap4096::new(),
            dedup: SmallKeyHashMap::default(),
        };
        palette.insert_record(PaletteRecord::new(
            None,
            EMPTY_ADDRESS,
            EMPTY_RECORD_INITIAL_REFCOUNT,
        ));
        palette
    }

    /// Drops every record and reinstates the canonical empty record with its initial refcount.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// # Panics
    ///
    /// If no record lives at `address`. Every cell address names a live record, so this indicates a broken invariant.
    #[inline]
    pub fn get(&self, address: PaletteAddress) -> &PaletteRecord<P> {
        match self.slots.get(address as usize) {
            Some(record) => record,
            None => panic!("No palette record at address {}", address),
        }
    }

    #[inline]
    pub fn try_get(&self, address: PaletteAddress) -> Option<&PaletteRecord<P>> {
        self.slots.get(address as usize)
    }

    /// Records in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = &PaletteRecord<P>> {
        self.slots.iter().map(|(_, record)| record)
    }

    /// Finds the live record whose content equals `payload`.
    pub fn find(&self, payload: Option<&P>) -> Option<PaletteAddress> {
        self.find_with_hash(payload, content_hash(payload))
    }

    fn find_with_hash(&self, payload: Option<&P>, hash: u32) -> Option<PaletteAddress> {
        self.dedup.get(&hash)?.iter().copied().find(|&address| {
            self.slots
                .get(address as usize)
                .map_or(false, |record| record.payload.as_ref() == payload)
        })
    }

    /// Moves one reference from the record at `old` to the record holding `payload`, creating that record if necessary.
    ///
    /// The old record is released first, so a slot it frees can be reused by the new record. New content goes to the
    /// vacant slot nearest its candidate address. Only when no slot is vacant does it take [`EMPTY_ADDRESS`] from an
    /// unreferenced empty record. The empty record always comes back at [`EMPTY_ADDRESS`]; whatever took that slot in the
    /// meantime is moved, and the returned [`Placement`] says where.
    ///
    /// `payload` must differ from the old record's content.
    ///
    /// # Panics
    ///
    /// If a new record is needed and every slot is taken by a referenced record. This can't happen while each live
    /// record is referenced by at least one of 4096 cells.
    pub fn change(&mut self, old: PaletteAddress, payload: Option<P>) -> Placement {
        debug_assert!(
            self.get(old).payload.as_ref() != payload.as_ref(),
            "changing a record to its own content"
        );

        self.release(old);

        let hash = content_hash(payload.as_ref());
        if let Some(address) = self.find_with_hash(payload.as_ref(), hash) {
            self.slots[address as usize].refcount += 1;
            return Placement::at(address);
        }

        if payload.is_none() {
            return self.recreate_empty_record();
        }

        let candidate = candidate_address(hash);
        let address = match self
            .slots
            .find_vacant_near(candidate as usize)
            .or_else(|| self.reclaim_empty_slot())
        {
            Some(slot) => slot as PaletteAddress,
            None => panic!(
                "Palette slots exhausted while placing content with hash {:#010x}; live records: {}",
                hash,
                self.slots.len()
            ),
        };

        log::trace!(
            "New palette record at {} (candidate {}, hash {:#010x})",
            address,
            candidate,
            hash
        );
        self.insert_record(PaletteRecord {
            payload,
            content_hash: hash,
            address,
            refcount: 1,
        });
        Placement::at(address)
    }

    /// Drops one reference to the record at `address`. Records with content are evicted at zero; the empty record stays
    /// until its slot is needed.
    fn release(&mut self, address: PaletteAddress) {
        let record = &mut self.slots[address as usize];
        record.refcount = record.refcount.saturating_sub(1);
        if record.refcount == 0 && record.payload.is_some() {
            log::trace!("Evicting palette record at {}", address);
            self.remove_record(address);
        }
    }

    /// Frees [`EMPTY_ADDRESS`] if it holds the empty record and no cell refers to it.
    fn reclaim_empty_slot(&mut self) -> Option<usize> {
        match self.slots.get(EMPTY_ADDRESS as usize) {
            Some(record) if record.payload.is_none() && record.refcount == 0 => {}
            _ => return None,
        }
        log::trace!("Reclaiming the slot of the unreferenced empty record");
        self.remove_record(EMPTY_ADDRESS);
        Some(EMPTY_ADDRESS as usize)
    }

    /// Puts a new empty record with one reference at [`EMPTY_ADDRESS`], moving any record found there.
    fn recreate_empty_record(&mut self) -> Placement {
        let mut placement = Placement::at(EMPTY_ADDRESS);
        if let Some(occupant_hash) = self.slots.get(EMPTY_ADDRESS as usize).map(|r| r.content_hash) {
            // Searched while the occupant still holds its slot, so the result is never EMPTY_ADDRESS.
            let to = match self.slots.find_vacant_near(candidate_address(occupant_hash) as usize) {
                Some(slot) => slot as PaletteAddress,
                None => panic!(
                    "Palette slots exhausted while restoring the empty record; live records: {}",
                    self.slots.len()
                ),
            };
            if let Some(occupant) = self.remove_record(EMPTY_ADDRESS) {
                log::trace!("Moving palette record from {} to {}", EMPTY_ADDRESS, to);
                self.insert_record(PaletteRecord {
                    address: to,
                    ..occupant
                });
            }
            placement.relocated_to = Some(to);
        }
        self.insert_record(PaletteRecord::new(None, EMPTY_ADDRESS, 1));
        placement
    }

    fn insert_record(&mut self, record: PaletteRecord<P>) {
        let address = record.address;
        self.dedup
            .entry(record.content_hash)
            .or_default()
            .push(address);
        self.slots.insert(address as usize, record);
    }

    fn remove_record(&mut self, address: PaletteAddress) -> Option<PaletteRecord<P>> {
        let record = self.slots.remove(address as usize)?;
        if let Some(bucket) = self.dedup.get_mut(&record.content_hash) {
            bucket.retain(|a| *a != address);
            if bucket.is_empty() {
                self.dedup.remove(&record.content_hash);
            }
        }
        Some(record)
    }

    /// An empty table for restoring records one at a time with [`Palette::restore`].
    pub(crate) fn without_records() -> Self {
        Self {
            slots: SlotMap4096::new(),
            dedup: SmallKeyHashMap::default(),
        }
    }

    /// Puts a record back at a known address, e.g. while importing. The content hash is recomputed.
    pub(crate) fn restore(
        &mut self,
        payload: Option<P>,
        address: PaletteAddress,
        refcount: u16,
    ) -> Result<(), RestoreConflict> {
        if address > ADDRESS_MASK {
            return Err(RestoreConflict::AddressOutOfRange);
        }
        if !self.slots.is_vacant(address as usize) {
            return Err(RestoreConflict::AddressOccupied);
        }
        let record = PaletteRecord::new(payload, address, refcount);
        if self
            .find_with_hash(record.payload.as_ref(), record.content_hash)
            .is_some()
        {
            return Err(RestoreConflict::DuplicateContent);
        }
        self.insert_record(record);
        Ok(())
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
