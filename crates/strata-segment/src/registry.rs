use crate::attributes::OBJECT_ID_MASK;

use serde::{Deserialize, Serialize};

/// Identifies the type of object occupying a cell. Only the low 12 bits are stored.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ObjectId(pub u16);

impl ObjectId {
    pub const EMPTY: Self = Self(0);
    pub const MAX: Self = Self(OBJECT_ID_MASK);

    #[inline]
    pub fn masked(self) -> Self {
        Self(self.0 & OBJECT_ID_MASK)
    }
}

/// What the segment needs to know about an object type.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ObjectTypeFlags {
    pub is_empty: bool,
    pub needs_periodic_update: bool,
}

impl ObjectTypeFlags {
    pub const EMPTY: Self = Self {
        is_empty: true,
        needs_periodic_update: false,
    };
}

/// Resolves object types, both by id and by name.
pub trait ObjectTypeRegistry {
    fn flags(&self, id: ObjectId) -> ObjectTypeFlags;

    fn id_of(&self, name: &str) -> Option<ObjectId>;
}

/// Metadata about a specific type of object.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ObjectTypeInfo {
    pub name: String,
    #[serde(default)]
    pub is_empty: bool,
    #[serde(default)]
    pub needs_periodic_update: bool,
}

impl ObjectTypeInfo {
    pub fn flags(&self) -> ObjectTypeFlags {
        ObjectTypeFlags {
            is_empty: self.is_empty,
            needs_periodic_update: self.needs_periodic_update,
        }
    }
}

/// An [`ObjectTypeRegistry`] backed by a list where the index of each entry is its [`ObjectId`].
///
/// Ids past the end of the list resolve to [`ObjectTypeFlags::EMPTY`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ObjectTypeTable {
    types: Vec<ObjectTypeInfo>,
}

impl ObjectTypeTable {
    pub fn new(types: Vec<ObjectTypeInfo>) -> Self {
        Self { types }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&ObjectTypeInfo> {
        self.types.get(id.0 as usize)
    }

    /// Appends a type and returns its id.
    pub fn push(&mut self, info: ObjectTypeInfo) -> ObjectId {
        self.types.push(info);
        ObjectId((self.types.len() - 1) as u16)
    }
}

impl ObjectTypeRegistry for ObjectTypeTable {
    fn flags(&self, id: ObjectId) -> ObjectTypeFlags {
        self.get(id)
            .map_or(ObjectTypeFlags::EMPTY, ObjectTypeInfo::flags)
    }

    fn id_of(&self, name: &str) -> Option<ObjectId> {
        self.types
            .iter()
            .position(|info| info.name == name)
            .map(|i| ObjectId(i as u16))
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
