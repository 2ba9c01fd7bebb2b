use crate::address::{cell_index, CellAddresses, PaletteAddress, EMPTY_ADDRESS, SEGMENT_SIZE};
use crate::attributes as attr;
use crate::config::SegmentConfig;
use crate::counters::SegmentCounters;
use crate::palette::{Palette, PaletteRecord};
use crate::registry::{ObjectId, ObjectTypeRegistry};

use glam::UVec3;
use strata_tag::Compound;

/// Attribute storage for one 16x16x16 slice of a chunk column.
///
/// Each cell stores a 12-bit [`PaletteAddress`]. The address names a shared, deduplicated [`PaletteRecord`] whose payload
/// holds the cell's object type, secondary value, light levels and free-form tag. Most cells of a typical segment point at
/// the same few records.
///
/// Coordinates are cell coordinates within the segment; every component must be less than 16.
#[derive(Clone, Debug)]
pub struct Segment {
    base_y: i32,
    has_sky_light: bool,
    pub(crate) counters: SegmentCounters,
    pub(crate) addresses: CellAddresses,
    pub(crate) palette: Palette<Compound>,
}

impl Default for Segment {
    fn default() -> Self {
        Self::from_config(&SegmentConfig::default())
    }
}

impl Segment {
    pub fn new(base_y: i32, has_sky_light: bool) -> Self {
        Self {
            base_y,
            has_sky_light,
            counters: SegmentCounters::default(),
            addresses: CellAddresses::default(),
            palette: Palette::new(),
        }
    }

    pub fn from_config(config: &SegmentConfig) -> Self {
        Self::new(config.base_y, config.has_sky_light)
    }

    /// The world Y coordinate of the lowest layer of cells.
    pub fn base_y(&self) -> i32 {
        self.base_y
    }

    pub fn has_sky_light(&self) -> bool {
        self.has_sky_light
    }

    /// True when no cell holds a non-empty object type.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn needs_periodic_update(&self) -> bool {
        self.counters.needs_periodic_update()
    }

    pub fn counters(&self) -> SegmentCounters {
        self.counters
    }

    /// Number of distinct attribute records currently in use, including the canonical empty record.
    pub fn palette_len(&self) -> usize {
        self.palette.len()
    }

    pub fn palette(&self) -> &Palette<Compound> {
        &self.palette
    }

    pub fn cell_address(&self, p: UVec3) -> PaletteAddress {
        self.addresses.get(cell_index(p))
    }

    pub fn record(&self, p: UVec3) -> &PaletteRecord<Compound> {
        self.palette.get(self.cell_address(p))
    }

    #[inline]
    fn payload(&self, index: usize) -> Option<&Compound> {
        self.palette.get(self.addresses.get(index)).payload()
    }

    /// Copy-on-write update of one cell's payload, followed by a palette change if the content differs.
    fn rewrite_cell(&mut self, index: usize, edit: impl FnOnce(&mut Compound)) {
        let old = self.addresses.get(index);
        let current = self.palette.get(old).payload();
        let new = attr::rewrite(current, edit);
        if new.as_ref() == current {
            return;
        }
        let placement = self.palette.change(old, new);
        if let Some(to) = placement.relocated_to {
            self.addresses.replace(EMPTY_ADDRESS, to);
        }
        self.addresses.set(index, placement.address);
    }

    pub fn object_id(&self, p: UVec3) -> ObjectId {
        ObjectId(attr::object_id_bits(attr::id_sky(self.payload(cell_index(p)))))
    }

    /// Sets the object type at `p`, keeping the segment counters up to date. Only the low 12 bits of `id` are used.
    pub fn set_object_id(&mut self, p: UVec3, id: ObjectId, registry: &impl ObjectTypeRegistry) {
        let index = cell_index(p);
        let id = id.masked();
        let field = attr::id_sky(self.payload(index));
        let old_id = ObjectId(attr::object_id_bits(field));
        if old_id == id {
            return;
        }

        let field = attr::with_object_id_bits(field, id.0);
        self.rewrite_cell(index, |c| attr::put_id_sky(c, field));

        self.counters.remove(registry.flags(old_id));
        self.counters.add(registry.flags(id));
    }

    /// Like [`Segment::set_object_id`], with the type looked up by name. Returns `false` if the registry doesn't know it.
    pub fn set_object_type(&mut self, p: UVec3, name: &str, registry: &impl ObjectTypeRegistry) -> bool {
        match registry.id_of(name) {
            Some(id) => {
                self.set_object_id(p, id, registry);
                true
            }
            None => false,
        }
    }

    /// The 4-bit secondary value (e.g. orientation or growth stage).
    pub fn secondary(&self, p: UVec3) -> u8 {
        attr::secondary_bits(attr::meta_light(self.payload(cell_index(p))))
    }

    pub fn set_secondary(&mut self, p: UVec3, value: u8) {
        let index = cell_index(p);
        let field = attr::meta_light(self.payload(index));
        let new_field = attr::with_secondary_bits(field, value);
        if new_field != field {
            self.rewrite_cell(index, |c| attr::put_meta_light(c, new_field));
        }
    }

    /// Always 0 when the segment has no sky light.
    pub fn sky_light(&self, p: UVec3) -> u8 {
        if !self.has_sky_light {
            return 0;
        }
        attr::sky_light_bits(attr::id_sky(self.payload(cell_index(p))))
    }

    /// Stores the level even when the segment has no sky light; it just won't be visible to [`Segment::sky_light`].
    pub fn set_sky_light(&mut self, p: UVec3, level: u8) {
        let index = cell_index(p);
        let field = attr::id_sky(self.payload(index));
        let new_field = attr::with_sky_light_bits(field, level);
        if new_field != field {
            self.rewrite_cell(index, |c| attr::put_id_sky(c, new_field));
        }
    }

    pub fn local_light(&self, p: UVec3) -> u8 {
        attr::local_light_bits(attr::meta_light(self.payload(cell_index(p))))
    }

    pub fn set_local_light(&mut self, p: UVec3, level: u8) {
        let index = cell_index(p);
        let field = attr::meta_light(self.payload(index));
        let new_field = attr::with_local_light_bits(field, level);
        if new_field != field {
            self.rewrite_cell(index, |c| attr::put_meta_light(c, new_field));
        }
    }

    /// Borrows the tag at `p`. The borrow ends at the next mutation of the segment; use [`Segment::tag`] for an owned copy.
    pub fn peek_tag(&self, p: UVec3) -> Option<&Compound> {
        attr::tag(self.payload(cell_index(p)))
    }

    pub fn tag(&self, p: UVec3) -> Option<Compound> {
        self.peek_tag(p).cloned()
    }

    pub fn has_tag(&self, p: UVec3) -> bool {
        self.peek_tag(p).is_some()
    }

    /// Replaces the tag at `p`; `None` removes it.
    pub fn set_tag(&mut self, p: UVec3, tag: Option<&Compound>) {
        let index = cell_index(p);
        if attr::tag(self.payload(index)) == tag {
            return;
        }
        let tag = tag.cloned();
        self.rewrite_cell(index, |c| attr::put_tag(c, tag));
    }

    /// Recomputes the counters from every cell. Required after [`Segment::import`].
    pub fn recount(&mut self, registry: &impl ObjectTypeRegistry) {
        let mut counters = SegmentCounters::default();
        for index in 0..SEGMENT_SIZE {
            let id = attr::object_id_bits(attr::id_sky(self.payload(index)));
            counters.add(registry.flags(ObjectId(id)));
        }
        log::debug!(
            "Recounted segment at y = {}: {} non-empty, {} periodic",
            self.base_y,
            counters.non_empty,
            counters.periodic_update
        );
        self.counters = counters;
    }

    /// Puts the segment back in its freshly constructed state: one empty record referenced by every cell.
    pub fn clear(&mut self) {
        self.addresses.fill(EMPTY_ADDRESS);
        self.palette.reset();
        self.counters = SegmentCounters::default();
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
