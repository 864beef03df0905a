//! String-keyed metadata bags with a tagged value union.
//!
//! Both mesh formats attach open-ended extra data to facets and meshes
//! (declared normals, color words, texture coordinates, unknown tags). A
//! closed value union keeps that flexibility while staying statically
//! checkable everywhere else.

use std::collections::BTreeMap;

use crate::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single metadata value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetaValue {
    /// A floating-point number.
    Number(f64),
    /// A non-negative index into some sequence (vertex, normal, texture).
    Index(usize),
    /// Free text (solid names, unparsed tokens).
    Text(String),
    /// A 3D vector (declared normals, materialized `vn` records).
    Vector(Vector3),
    /// Raw bytes (the opaque 80-byte binary STL header).
    Bytes(Vec<u8>),
    /// An ordered list of values.
    List(Vec<MetaValue>),
    /// A nested string-keyed map.
    Map(BTreeMap<String, MetaValue>),
    /// Placeholder for an omitted optional value, such as a missing
    /// texture or normal sub-index in an OBJ face token.
    Missing,
}

impl MetaValue {
    /// Borrow as a number if this is a `Number`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow as an index if this is an `Index`.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            _ => None,
        }
    }

    /// Borrow as text if this is a `Text`.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a vector if this is a `Vector`.
    #[must_use]
    pub fn as_vector(&self) -> Option<Vector3> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow as bytes if this is a `Bytes`.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Borrow as a list if this is a `List`.
    #[must_use]
    pub fn as_list(&self) -> Option<&[MetaValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a map if this is a `Map`.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, MetaValue>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// True for the `Missing` placeholder.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<f64> for MetaValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<usize> for MetaValue {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vector3> for MetaValue {
    fn from(v: Vector3) -> Self {
        Self::Vector(v)
    }
}

impl From<Vec<u8>> for MetaValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<MetaValue>> for MetaValue {
    fn from(items: Vec<MetaValue>) -> Self {
        Self::List(items)
    }
}

/// An open string-keyed metadata bag.
///
/// Every facet and mesh owns a fresh, independent bag; bags are never
/// shared between constructions.
///
/// # Example
///
/// ```
/// use meshmeter_model::{MetaValue, Metadata};
///
/// let mut meta = Metadata::new();
/// meta.set("volume", 8.0);
/// assert_eq!(meta.number("volume"), Some(8.0));
/// meta.push("normals", MetaValue::Missing);
/// assert_eq!(meta.get("normals").and_then(MetaValue::as_list).map(<[_]>::len), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Metadata {
    entries: BTreeMap<String, MetaValue>,
}

impl Metadata {
    /// Create an empty bag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Fetch a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// Fetch a value mutably by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut MetaValue> {
        self.entries.get_mut(key)
    }

    /// Set a value, replacing any previous entry under the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove and return a value.
    pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
        self.entries.remove(key)
    }

    /// True if the key has an entry.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Fetch a numeric value by key.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(MetaValue::as_number)
    }

    /// Fetch a text value by key.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetaValue::as_text)
    }

    /// Append a value to the list stored under `key`, creating the list on
    /// first use. An existing non-list entry is replaced by a fresh list.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        let slot = self
            .entries
            .entry(key.into())
            .or_insert_with(|| MetaValue::List(Vec::new()));
        if let MetaValue::List(items) = slot {
            items.push(value.into());
        } else {
            *slot = MetaValue::List(vec![value.into()]);
        }
    }

    /// Insert a value into the nested map stored under `key`, creating the
    /// map on first use.
    pub fn map_insert(
        &mut self,
        key: impl Into<String>,
        entry: impl Into<String>,
        value: impl Into<MetaValue>,
    ) {
        let slot = self
            .entries
            .entry(key.into())
            .or_insert_with(|| MetaValue::Map(BTreeMap::new()));
        if let MetaValue::Map(map) = slot {
            map.insert(entry.into(), value.into());
        } else {
            let mut map = BTreeMap::new();
            map.insert(entry.into(), value.into());
            *slot = MetaValue::Map(map);
        }
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the bag holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
