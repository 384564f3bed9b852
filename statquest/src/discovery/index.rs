//! Pair-keyed storage of relations.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::relation::{Alpha, Relation};

/// Ordered pair of observable names identifying one unordered pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub a: String,
    pub b: String,
}

impl PairKey {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    /// The same pair in the opposite orientation.
    pub fn reversed(&self) -> Self {
        Self {
            a: self.b.clone(),
            b: self.a.clone(),
        }
    }

    /// True when `a` comes before `b` (or equals it) in name order.
    pub fn is_canonical(&self) -> bool {
        self.a <= self.b
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

/// Relations grouped by pair, iterated in pair order.
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    entries: BTreeMap<PairKey, Vec<Relation>>,
}

impl RelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a relation under the pair named by its observables.
    pub fn insert(&mut self, relation: Relation) {
        let key = PairKey::new(relation.a().name(), relation.b().name());
        self.entries.entry(key).or_default().push(relation);
    }

    /// Ensures an entry exists for `key`, possibly empty.
    pub fn touch(&mut self, key: PairKey) -> &mut Vec<Relation> {
        self.entries.entry(key).or_default()
    }

    /// Relations of the pair in either orientation.
    pub fn get(&self, a: &str, b: &str) -> Option<&[Relation]> {
        self.entries
            .get(&PairKey::new(a, b))
            .or_else(|| self.entries.get(&PairKey::new(b, a)))
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PairKey, Vec<Relation>> {
        self.entries.iter()
    }

    /// All relations, pair by pair.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.entries.values().flatten()
    }

    /// Number of pair entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of relations across all pairs.
    pub fn relation_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Removes symmetric-test relations stored under a non-canonical key when
    /// the canonical key already holds a relation from the same test.
    ///
    /// Returns the number of relations removed.
    pub fn deduplicate_symmetric(&mut self) -> usize {
        let reversed_keys: Vec<PairKey> = self
            .entries
            .keys()
            .filter(|key| !key.is_canonical())
            .cloned()
            .collect();

        let mut removed = 0;
        for key in reversed_keys {
            let canonical_tests: Vec<_> = match self.entries.get(&key.reversed()) {
                Some(relations) => relations.iter().map(Relation::test).collect(),
                None => continue,
            };
            if let Some(relations) = self.entries.get_mut(&key) {
                let before = relations.len();
                relations.retain(|r| {
                    !(r.test().is_symmetric() && canonical_tests.contains(&r.test()))
                });
                removed += before - relations.len();
            }
        }
        removed
    }

    /// Drops pairs without relations. Returns the number of pairs dropped.
    pub fn prune_empty(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, relations| !relations.is_empty());
        before - self.entries.len()
    }

    /// The relations credible at `alpha`, keeping pair and relation order and
    /// dropping pairs left without relations.
    pub fn credible_only(&self, alpha: Alpha) -> RelationIndex {
        let entries = self
            .entries
            .iter()
            .filter_map(|(key, relations)| {
                let credible: Vec<Relation> = relations
                    .iter()
                    .filter(|r| r.credible(alpha))
                    .cloned()
                    .collect();
                (!credible.is_empty()).then(|| (key.clone(), credible))
            })
            .collect();
        RelationIndex { entries }
    }
}

impl<'a> IntoIterator for &'a RelationIndex {
    type Item = (&'a PairKey, &'a Vec<Relation>);
    type IntoIter = btree_map::Iter<'a, PairKey, Vec<Relation>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Relation> for RelationIndex {
    fn from_iter<I: IntoIterator<Item = Relation>>(iter: I) -> Self {
        let mut index = RelationIndex::new();
        for relation in iter {
            index.insert(relation);
        }
        index
    }
}
