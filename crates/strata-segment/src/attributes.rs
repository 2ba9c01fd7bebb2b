//! Bit layout of cell attributes inside a palette payload.
//!
//! A payload is a [`Compound`] with up to three entries:
//!
//! - [`ID_SKY_KEY`]: a short; low 12 bits are the [`ObjectId`](crate::ObjectId), high 4 bits the sky light level
//! - [`META_LIGHT_KEY`]: a byte; high 4 bits are the secondary value, low 4 bits the local light level
//! - [`TAG_KEY`]: the free-form tag compound
//!
//! Packed fields equal to zero are stored as missing entries, and a payload with no entries is stored as no payload at
//! all. This keeps one canonical encoding for every attribute set, so equal attributes always deduplicate.

use strata_tag::{Compound, Tag};

pub const ID_SKY_KEY: &str = "id_sky";
pub const META_LIGHT_KEY: &str = "meta_light";
pub const TAG_KEY: &str = "tag";

pub const OBJECT_ID_MASK: u16 = 0x0FFF;
pub const NIBBLE_MASK: u8 = 0x0F;

/// The 16-bit field holding the object type and sky light.
#[inline]
pub fn id_sky(payload: Option<&Compound>) -> u16 {
    payload
        .and_then(|c| c.get_short(ID_SKY_KEY))
        .map_or(0, |x| x as u16)
}

/// The 8-bit field holding the secondary value and local light.
#[inline]
pub fn meta_light(payload: Option<&Compound>) -> u8 {
    payload
        .and_then(|c| c.get_byte(META_LIGHT_KEY))
        .map_or(0, |x| x as u8)
}

#[inline]
pub fn tag(payload: Option<&Compound>) -> Option<&Compound> {
    payload.and_then(|c| c.get_compound(TAG_KEY))
}

#[inline]
pub fn object_id_bits(id_sky: u16) -> u16 {
    id_sky & OBJECT_ID_MASK
}

#[inline]
pub fn sky_light_bits(id_sky: u16) -> u8 {
    (id_sky >> 12) as u8
}

#[inline]
pub fn with_object_id_bits(id_sky: u16, id: u16) -> u16 {
    (id_sky & !OBJECT_ID_MASK) | (id & OBJECT_ID_MASK)
}

#[inline]
pub fn with_sky_light_bits(id_sky: u16, level: u8) -> u16 {
    (id_sky & OBJECT_ID_MASK) | ((level & NIBBLE_MASK) as u16) << 12
}

#[inline]
pub fn secondary_bits(meta_light: u8) -> u8 {
    meta_light >> 4
}

#[inline]
pub fn local_light_bits(meta_light: u8) -> u8 {
    meta_light & NIBBLE_MASK
}

#[inline]
pub fn with_secondary_bits(meta_light: u8, value: u8) -> u8 {
    (meta_light & NIBBLE_MASK) | (value & NIBBLE_MASK) << 4
}

#[inline]
pub fn with_local_light_bits(meta_light: u8, level: u8) -> u8 {
    (meta_light & !NIBBLE_MASK) | (level & NIBBLE_MASK)
}

/// Copies `payload` (or starts from nothing), applies `edit` and normalizes the result.
///
/// The input is never modified; records sharing it are unaffected.
pub fn rewrite(payload: Option<&Compound>, edit: impl FnOnce(&mut Compound)) -> Option<Compound> {
    let mut copy = payload.cloned().unwrap_or_default();
    edit(&mut copy);
    (!copy.is_empty()).then(|| copy)
}

/// True if `payload` is exactly what the setters produce for the attributes it holds: no zero-valued packed entries,
/// no entries of the wrong type and no unknown keys. An empty compound is never canonical; it is stored as no payload.
pub fn is_canonical(payload: &Compound) -> bool {
    !payload.is_empty()
        && payload.iter().all(|(key, value)| match (key, value) {
            (ID_SKY_KEY, Tag::Short(x)) => *x != 0,
            (META_LIGHT_KEY, Tag::Byte(x)) => *x != 0,
            (TAG_KEY, Tag::Compound(_)) => true,
            _ => false,
        })
}

pub fn put_id_sky(c: &mut Compound, value: u16) {
    if value == 0 {
        c.remove(ID_SKY_KEY);
    } else {
        c.insert(ID_SKY_KEY, Tag::Short(value as i16));
    }
}

pub fn put_meta_light(c: &mut Compound, value: u8) {
    if value == 0 {
        c.remove(META_LIGHT_KEY);
    } else {
        c.insert(META_LIGHT_KEY, Tag::Byte(value as i8));
    }
}

pub fn put_tag(c: &mut Compound, tag: Option<Compound>) {
    match tag {
        Some(tag) => {
            c.insert(TAG_KEY, tag);
        }
        None => {
            c.remove(TAG_KEY);
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
    fn missing_payload_reads_as_zero() {
        assert_eq!(id_sky(None), 0);
        assert_eq!(meta_light(None), 0);
        assert_eq!(tag(None), None);
    }

    #[test]
    fn object_id_and_sky_light_are_independent() {
        let field = with_sky_light_bits(with_object_id_bits(0, 0xABC), 0xD);
        assert_eq!(field, 0xDABC);
        assert_eq!(object_id_bits(field), 0xABC);
        assert_eq!(sky_light_bits(field), 0xD);

        let field = with_object_id_bits(field, 0x1FFF);
        assert_eq!(object_id_bits(field), 0xFFF);
        assert_eq!(sky_light_bits(field), 0xD);
    }

    #[test]
    fn secondary_and_local_light_are_independent() {
        let field = with_local_light_bits(with_secondary_bits(0, 9), 0x13);
        assert_eq!(secondary_bits(field), 9);
        assert_eq!(local_light_bits(field), 3);
    }

    #[test]
    fn sky_light_survives_short_sign_bit() {
        let payload = rewrite(None, |c| put_id_sky(c, with_sky_light_bits(0, 15)));
        assert_eq!(sky_light_bits(id_sky(payload.as_ref())), 15);
    }

    #[test]
    fn zero_fields_normalize_to_no_payload() {
        let some = rewrite(None, |c| put_meta_light(c, 0x40));
        assert!(some.is_some());

        let none = rewrite(some.as_ref(), |c| put_meta_light(c, 0));
        assert_eq!(none, None);
    }

    #[test]
    fn rewrite_leaves_original_untouched() {
        let original = rewrite(None, |c| put_id_sky(c, 7)).unwrap();
        let changed = rewrite(Some(&original), |c| put_id_sky(c, 8));
        assert_eq!(id_sky(Some(&original)), 7);
        assert_eq!(id_sky(changed.as_ref()), 8);
    }

    #[test]
    fn setter_output_is_canonical() {
        let payload = rewrite(None, |c| {
            put_id_sky(c, 0x1234);
            put_meta_light(c, 0x56);
            put_tag(c, Some(Compound::new()));
        })
        .unwrap();
        assert!(is_canonical(&payload));
    }

    #[test]
    fn non_canonical_payloads() {
        let mut zero_id = Compound::new();
        zero_id.insert(ID_SKY_KEY, Tag::Short(0));
        let mut wide_id = Compound::new();
        wide_id.insert(ID_SKY_KEY, Tag::Int(5));
        let mut stray = Compound::new();
        stray.insert("color", 3i8);
        let mut flat_tag = Compound::new();
        flat_tag.insert(TAG_KEY, "text");

        for payload in [Compound::new(), zero_id, wide_id, stray, flat_tag] {
            assert!(!is_canonical(&payload), "{:?}", payload);
        }
    }
}
