use crate::Tag;

use std::collections::BTreeMap;

/// A string-keyed map of [`Tag`]s.
///
/// Keys are kept sorted, so two compounds with the same entries are equal and hash the same regardless of insertion order.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Compound {
    entries: BTreeMap<String, Tag>,
}

impl Compound {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.entries.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Tag> {
        self.entries.get_mut(key)
    }

    /// Returns the previous value at `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Tag>) -> Option<Tag> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Tag> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_byte(&self, key: &str) -> Option<i8> {
        match self.get(key) {
            Some(Tag::Byte(x)) => Some(*x),
            _ => None,
        }
    }

    pub fn get_short(&self, key: &str) -> Option<i16> {
        match self.get(key) {
            Some(Tag::Short(x)) => Some(*x),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        match self.get(key) {
            Some(Tag::Int(x)) => Some(*x),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(Tag::String(x)) => Some(x.as_str()),
            _ => None,
        }
    }

    pub fn get_compound(&self, key: &str) -> Option<&Compound> {
        match self.get(key) {
            Some(Tag::Compound(x)) => Some(x),
            _ => None,
        }
    }

    /// Follows a chain of nested compounds, e.g. `["display", "name"]`.
    pub fn get_path(&self, path: &[&str]) -> Option<&Tag> {
        let (last, parents) = path.split_last()?;
        let mut node = self;
        for key in parents {
            node = node.get_compound(key)?;
        }
        node.get(last)
    }
}

impl<K, V> FromIterator<(K, V)> for Compound
where
    K: Into<String>,
    V: Into<Tag>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
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

    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(c: &Compound) -> u64 {
        let mut h = DefaultHasher::new();
        c.hash(&mut h);
        h.finish()
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let mut a = Compound::new();
        a.insert("x", 1i32);
        a.insert("y", "two");

        let mut b = Compound::new();
        b.insert("y", "two");
        b.insert("x", 1i32);

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn typed_getters_reject_other_types() {
        let c: Compound = [("n", Tag::Short(4))].into_iter().collect();
        assert_eq!(c.get_short("n"), Some(4));
        assert_eq!(c.get_byte("n"), None);
        assert_eq!(c.get_short("missing"), None);
    }

    #[test]
    fn nested_path_lookup() {
        let mut inner = Compound::new();
        inner.insert("name", "lantern");
        let mut outer = Compound::new();
        outer.insert("display", inner);

        assert_eq!(
            outer.get_path(&["display", "name"]),
            Some(&Tag::from("lantern"))
        );
        assert_eq!(outer.get_path(&["display", "lore"]), None);
        assert_eq!(outer.get_path(&[]), None);
    }
}
