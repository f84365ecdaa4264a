//! Pattern catalog: the secret identifier -> key table.
//!
//! Each pattern identifier names an artwork file in the asset store and maps
//! to a small integer key. The key is the value of `x` in the generated math
//! problem, so it must never be derivable from anything but the artwork
//! itself. The catalog is immutable for the process lifetime.

use std::collections::BTreeMap;

use rand::Rng;
use rookery_common::GateError;

/// Builtin pattern table. Keys are deliberately uncorrelated with the
/// identifier ordering.
const BUILTIN_PATTERNS: &[(&str, u8)] = &[
    ("raven0", 5),
    ("raven1", 3),
    ("raven2", 4),
    ("raven3", 1),
    ("raven4", 6),
    ("raven5", 5),
    ("raven6", 5),
    ("raven7", 4),
    ("raven8", 8),
    ("raven9", 5),
    ("raven10", 1),
    ("raven11", 3),
    ("raven12", 2),
    ("raven13", 1),
    ("raven14", 7),
    ("raven15", 2),
    ("raven16", 7),
    ("raven17", 4),
    ("raven18", 3),
    ("raven19", 1),
    ("raven20", 8),
    ("raven21", 7),
    ("raven22", 5),
    ("raven23", 1),
    ("raven24", 5),
];

/// Immutable mapping from pattern identifier to secret key
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    entries: Vec<(String, u8)>,
}

impl PatternCatalog {
    /// The builtin 25-pattern raven catalog
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_PATTERNS
                .iter()
                .map(|(id, key)| (id.to_string(), *key))
                .collect(),
        }
    }

    /// Build a catalog from a user-supplied table (e.g. a config file).
    ///
    /// An empty table is a configuration error, checked once here rather
    /// than on every challenge.
    pub fn from_map(patterns: BTreeMap<String, u8>) -> Result<Self, GateError> {
        if patterns.is_empty() {
            return Err(GateError::Config("pattern catalog is empty".to_string()));
        }
        Ok(Self {
            entries: patterns.into_iter().collect(),
        })
    }

    /// Pick a pattern uniformly at random
    pub fn choose(&self, rng: &mut impl Rng) -> (&str, u8) {
        let idx = rng.random_range(0..self.entries.len());
        let (id, key) = &self.entries[idx];
        (id.as_str(), *key)
    }

    /// Look up the secret key for an identifier
    pub fn key_for(&self, pattern_id: &str) -> Option<u8> {
        self.entries
            .iter()
            .find(|(id, _)| id == pattern_id)
            .map(|(_, key)| *key)
    }

    /// All pattern identifiers, in catalog order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_builtin_catalog() {
        let catalog = PatternCatalog::builtin();
        assert_eq!(catalog.len(), 25);
        assert_eq!(catalog.key_for("raven8"), Some(8));
        assert_eq!(catalog.key_for("raven24"), Some(5));
        assert_eq!(catalog.key_for("crow0"), None);
        assert!(catalog.entries.iter().all(|(_, k)| (1..=8).contains(k)));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = PatternCatalog::from_map(BTreeMap::new()).unwrap_err();
        assert!(matches!(err, GateError::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_from_map() {
        let mut map = BTreeMap::new();
        map.insert("owl0".to_string(), 2);
        map.insert("owl1".to_string(), 7);
        let catalog = PatternCatalog::from_map(map).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.key_for("owl1"), Some(7));
    }

    #[test]
    fn test_choose_returns_member() {
        let catalog = PatternCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let (id, key) = catalog.choose(&mut rng);
            assert_eq!(catalog.key_for(id), Some(key));
        }
    }
}
