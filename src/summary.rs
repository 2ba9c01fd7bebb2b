use strata_segment::{attributes, ObjectId, ObjectTypeTable, Segment};

use std::collections::BTreeMap;
use std::fmt;

/// How many cells of a segment hold one object type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeCount {
    pub id: ObjectId,
    /// `None` for ids the table doesn't know.
    pub name: Option<String>,
    pub cells: usize,
}

/// A per-type breakdown of a segment, computed from its palette rather than from every cell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SegmentSummary {
    pub base_y: i32,
    pub palette_len: usize,
    pub tagged_cells: usize,
    pub non_empty: u16,
    pub periodic_update: u16,
    /// Ordered by id.
    pub types: Vec<TypeCount>,
}

impl SegmentSummary {
    /// Counters are read as they are, so call [`Segment::recount`] first on an imported segment.
    pub fn of(segment: &Segment, object_types: &ObjectTypeTable) -> Self {
        let mut cells_by_id = BTreeMap::new();
        let mut tagged_cells = 0;
        for record in segment.palette().iter() {
            let refs = record.refcount() as usize;
            if refs == 0 {
                continue;
            }
            let id = attributes::object_id_bits(attributes::id_sky(record.payload()));
            *cells_by_id.entry(id).or_insert(0) += refs;
            if attributes::tag(record.payload()).is_some() {
                tagged_cells += refs;
            }
        }

        let types = cells_by_id
            .into_iter()
            .map(|(id, cells)| {
                let id = ObjectId(id);
                TypeCount {
                    id,
                    name: object_types.get(id).map(|info| info.name.clone()),
                    cells,
                }
            })
            .collect();

        let counters = segment.counters();
        Self {
            base_y: segment.base_y(),
            palette_len: segment.palette_len(),
            tagged_cells,
            non_empty: counters.non_empty,
            periodic_update: counters.periodic_update,
            types,
        }
    }
}

impl fmt::Display for SegmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "segment at y = {}: {} palette records, {} non-empty cells, {} needing periodic updates, {} tagged",
            self.base_y, self.palette_len, self.non_empty, self.periodic_update, self.tagged_cells
        )?;
        for count in &self.types {
            match &count.name {
                Some(name) => writeln!(f, "  {:>4} {:<16} {}", count.id.0, name, count.cells)?,
                None => writeln!(f, "  {:>4} {:<16} {}", count.id.0, "<unknown>", count.cells)?,
            }
        }
        Ok(())
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
