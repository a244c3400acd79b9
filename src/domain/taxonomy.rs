//! Label taxonomies that collapse each annotator's vocabulary onto the
//! canonical (primary) one.
//!
//! Tables are built once at startup and shared read-only behind an `Arc`.
//! A label missing from a table is its own parent.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::span::Origin;

/// Secondary annotator labels and the canonical parent each one refines
pub const SECONDARY_TYPE_MAP: &[(&str, &str)] = &[
    ("EMPLOYER", "PROFESSION"),
    ("HOSPITAL", "ADDRESS"),
    ("HOSPITAL_NAME", "ADDRESS"),
    ("IDENTIFIER", "ID"),
    ("LOCATION", "ADDRESS"),
    ("MEDICAL_RECORD_NUMBER", "ID"),
    ("PATIENT_OR_FAMILY_NAME", "NAME"),
    ("PHONE_NUMBER", "PHONE_OR_FAX"),
    ("PROVIDER_NAME", "NAME"),
    ("SPECIALTY", "ADDRESS"),
    ("SSN", "ID"),
    ("WARD", "ADDRESS"),
];

/// Raw label -> parent label, identity for unknown labels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMap {
    entries: BTreeMap<String, String>,
}

impl TypeMap {
    /// Empty map (every label is its own parent)
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in secondary annotator table
    pub fn secondary() -> Self {
        Self::from_pairs(SECONDARY_TYPE_MAP.iter().copied())
    }

    /// Build from `(raw, parent)` pairs; both sides are uppercased
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = Self::new();
        map.extend(pairs);
        map
    }

    /// Add or replace entries; later pairs win
    pub fn extend<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (raw, parent) in pairs {
            self.entries
                .insert(raw.as_ref().to_uppercase(), parent.as_ref().to_uppercase());
        }
    }

    /// Parent of `label`, or `label` itself
    pub fn parent_of<'a>(&'a self, label: &'a str) -> &'a str {
        self.entries.get(label).map(String::as_str).unwrap_or(label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Per-annotator taxonomy lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    secondary: Arc<TypeMap>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new(TypeMap::secondary())
    }
}

impl Taxonomy {
    pub fn new(secondary: TypeMap) -> Self {
        Self {
            secondary: Arc::new(secondary),
        }
    }

    /// Built-in table extended with configured entries
    pub fn with_secondary_overrides<K, V>(overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut secondary = TypeMap::secondary();
        secondary.extend(overrides);
        Self::new(secondary)
    }

    /// Map carried by spans of `origin`; the primary vocabulary is canonical
    pub fn for_origin(&self, origin: Origin) -> Option<Arc<TypeMap>> {
        match origin {
            Origin::Primary => None,
            Origin::Secondary => Some(Arc::clone(&self.secondary)),
        }
    }

    pub fn secondary(&self) -> &TypeMap {
        &self.secondary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secondary_table_entries() {
        let map = TypeMap::secondary();
        assert_eq!(map.len(), SECONDARY_TYPE_MAP.len());
        assert_eq!(map.parent_of("EMPLOYER"), "PROFESSION");
        assert_eq!(map.parent_of("HOSPITAL"), "ADDRESS");
        assert_eq!(map.parent_of("PATIENT_OR_FAMILY_NAME"), "NAME");
        assert_eq!(map.parent_of("PHONE_NUMBER"), "PHONE_OR_FAX");
    }

    #[test]
    fn test_identity_fallback() {
        let map = TypeMap::secondary();
        assert_eq!(map.parent_of("URL_OR_IP"), "URL_OR_IP");
        assert_eq!(map.parent_of("AGE"), "AGE");
    }

    #[test]
    fn test_overrides_uppercase_and_replace() {
        let taxonomy = Taxonomy::with_secondary_overrides([("city", "address"), ("ssn", "ssn")]);
        let map = taxonomy.secondary();
        assert_eq!(map.parent_of("CITY"), "ADDRESS");
        assert_eq!(map.parent_of("SSN"), "SSN");
        assert_eq!(map.parent_of("WARD"), "ADDRESS");
    }

    #[test]
    fn test_primary_has_no_map() {
        let taxonomy = Taxonomy::default();
        assert!(taxonomy.for_origin(Origin::Primary).is_none());

        let shared = taxonomy.for_origin(Origin::Secondary).unwrap();
        let again = taxonomy.for_origin(Origin::Secondary).unwrap();
        assert!(Arc::ptr_eq(&shared, &again));
    }
}
