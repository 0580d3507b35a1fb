//! Field paths and the field-name resolver.
//!
//! A field name is a plain string. Dots inside a field name are part of the
//! name, not separators: `"data.name"` is one atomic key. The only structure
//! a name can carry is list traversal, marked by an `items.<index>.fields.`
//! segment, which resolves into alternating structural and field-name
//! segments reaching a record nested inside a list item.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single segment in a field path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seg {
    /// Object key access: a field name or a structural key (`items`, `fields`).
    Key(String),
    /// List item index access.
    Index(usize),
}

impl Seg {
    /// Create a key segment.
    #[inline]
    pub fn key(k: impl Into<String>) -> Self {
        Seg::Key(k.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Seg::Index(i)
    }

    /// Get the key if this is a key segment.
    #[inline]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Seg::Key(k) => Some(k),
            Seg::Index(_) => None,
        }
    }

    /// Get the index if this is an index segment.
    #[inline]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Seg::Key(_) => None,
            Seg::Index(i) => Some(*i),
        }
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => write!(f, ".{}", k),
            Seg::Index(i) => write!(f, "[{}]", i),
        }
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Key(s)
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// A resolved path into the field tree.
///
/// Paths are walked against the state's `fields` object. Use
/// [`resolve_field_path`] to build one from a field-name string, or the
/// builder methods for structural construction.
///
/// # Examples
///
/// ```
/// use form_state::FieldPath;
///
/// let path = FieldPath::new().key("listField").key("items").index(0).key("fields");
/// assert_eq!(path.len(), 4);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath(Vec<Seg>);

impl FieldPath {
    /// Create an empty path (the `fields` root).
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create a path from a vector of segments.
    #[inline]
    pub fn from_segments(segments: Vec<Seg>) -> Self {
        Self(segments)
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index segment and return self (builder pattern).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// Push a segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    /// Check if this path is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the first segment.
    #[inline]
    pub fn first(&self) -> Option<&Seg> {
        self.0.first()
    }

    /// Get the last segment.
    #[inline]
    pub fn last(&self) -> Option<&Seg> {
        self.0.last()
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Seg> {
        self.0.iter()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for seg in &self.0 {
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromIterator<Seg> for FieldPath {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        FieldPath(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldPath {
    type Item = Seg;
    type IntoIter = std::vec::IntoIter<Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldPath {
    type Item = &'a Seg;
    type IntoIter = std::slice::Iter<'a, Seg>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for FieldPath {
    type Output = Seg;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Resolve a field-name string into a [`FieldPath`].
///
/// Pure and infallible: the result always has at least one segment.
///
/// - Without an `items.<index>.fields.` marker the whole name is one opaque
///   key, dots included: `"data.name"` resolves to `["data.name"]`.
/// - With markers, the path alternates field-name keys with the literal
///   `items` / index / `fields` segments, to arbitrary nesting depth.
///
/// A marker only counts when its index parses as an integer, the list field
/// name before it is non-empty, and a sub-field name follows it.
///
/// # Examples
///
/// ```
/// use form_state::{path, resolve_field_path};
///
/// assert_eq!(resolve_field_path("name"), path!("name"));
/// assert_eq!(resolve_field_path("data.name"), path!("data.name"));
/// assert_eq!(
///     resolve_field_path("data.listField.items.1.fields.fieldName"),
///     path!("data.listField", "items", 1, "fields", "fieldName"),
/// );
/// ```
pub fn resolve_field_path(name: &str) -> FieldPath {
    use crate::record::{FIELDS_KEY, ITEMS_KEY};

    let parts: Vec<&str> = name.split('.').collect();
    let mut segs = Vec::new();
    let mut start = 0;

    loop {
        let mut marker = None;
        // The list field name before the marker must be non-empty, and at
        // least one sub-field part must follow `fields`.
        let mut j = start + 1;
        while j + 3 < parts.len() {
            if parts[j] == ITEMS_KEY && parts[j + 2] == FIELDS_KEY {
                if let Ok(index) = parts[j + 1].parse::<usize>() {
                    marker = Some((j, index));
                    break;
                }
            }
            j += 1;
        }

        match marker {
            Some((j, index)) => {
                segs.push(Seg::Key(parts[start..j].join(".")));
                segs.push(Seg::Key(ITEMS_KEY.to_owned()));
                segs.push(Seg::Index(index));
                segs.push(Seg::Key(FIELDS_KEY.to_owned()));
                start = j + 3;
            }
            None => {
                segs.push(Seg::Key(parts[start..].join(".")));
                break;
            }
        }
    }

    FieldPath(segs)
}

/// Construct a [`FieldPath`] from a sequence of segments.
///
/// String literals become key segments, numbers become index segments.
///
/// # Examples
///
/// ```
/// use form_state::path;
///
/// let p = path!("listField", "items", 0, "fields", "name");
/// assert_eq!(p.len(), 5);
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::FieldPath::new()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::FieldPath::new();
        $(
            p.push($crate::Seg::from($seg));
        )+
        p
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_name() {
        assert_eq!(resolve_field_path("name"), path!("name"));
    }

    #[test]
    fn test_combined_name_is_one_key() {
        assert_eq!(resolve_field_path("data.name"), path!("data.name"));
    }

    #[test]
    fn test_single_name_with_items() {
        assert_eq!(
            resolve_field_path("listField.items.1.fields.fieldName"),
            path!("listField", "items", 1, "fields", "fieldName"),
        );
    }

    #[test]
    fn test_combined_name_with_items() {
        assert_eq!(
            resolve_field_path("data.listField.items.1.fields.fieldName"),
            path!("data.listField", "items", 1, "fields", "fieldName"),
        );
    }

    #[test]
    fn test_nested_list_path() {
        assert_eq!(
            resolve_field_path("a.items.0.fields.inner.items.3.fields.leaf"),
            path!("a", "items", 0, "fields", "inner", "items", 3, "fields", "leaf"),
        );
    }

    #[test]
    fn test_non_numeric_index_is_not_a_marker() {
        assert_eq!(
            resolve_field_path("a.items.x.fields.b"),
            path!("a.items.x.fields.b"),
        );
    }

    #[test]
    fn test_trailing_marker_without_subfield_is_atomic() {
        assert_eq!(
            resolve_field_path("a.items.1.fields"),
            path!("a.items.1.fields"),
        );
    }

    #[test]
    fn test_resolution_is_pure() {
        let a = resolve_field_path("data.listField.items.1.fields.fieldName");
        let b = resolve_field_path("data.listField.items.1.fields.fieldName");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_name_is_one_empty_key() {
        assert_eq!(resolve_field_path(""), path!(""));
    }

    #[test]
    fn test_display() {
        let p = path!("listField", "items", 1, "fields", "name");
        assert_eq!(format!("{}", p), "$.listField.items[1].fields.name");
    }

    #[test]
    fn test_path_serde() {
        let p = path!("data.listField", "items", 0, "fields", "x");
        let json = serde_json::to_string(&p).unwrap();
        let parsed: FieldPath = serde_json::from_str(&json).unwrap();
        assert_eq!(p, parsed);
    }
}
