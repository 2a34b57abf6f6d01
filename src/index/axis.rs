use std::{collections::BTreeMap, collections::BTreeSet, ops::Index, sync::Arc};

use crate::dimension::{AxisKey, DimensionKind};

/// A realized axis: the ordered keys of one dimension after a build.
#[derive(Debug, Clone)]
pub struct Axis {
    kind: DimensionKind,
    keys: Vec<AxisKey>,
    positions: BTreeMap<AxisKey, usize>,
}

impl Axis {
    /// Build from keys already in axis order and free of duplicates.
    fn from_ordered(kind: DimensionKind, keys: Vec<AxisKey>) -> Self {
        let positions = keys
            .iter()
            .cloned()
            .enumerate()
            .map(|(pos, key)| (key, pos))
            .collect();

        Axis {
            kind,
            keys,
            positions,
        }
    }

    /// The dimension this axis belongs to.
    pub fn kind(&self) -> DimensionKind {
        self.kind
    }

    /// The keys, in axis order.
    pub fn keys(&self) -> &[AxisKey] {
        &self.keys
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the axis has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Position of a key along the axis.
    pub fn position(&self, key: &AxisKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Iterate over the keys in order.
    pub fn iter(&self) -> std::slice::Iter<AxisKey> {
        self.keys.iter()
    }
}

impl PartialEq for Axis {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.keys == other.keys
    }
}

impl Index<usize> for Axis {
    type Output = AxisKey;

    fn index(&self, pos: usize) -> &AxisKey {
        &self.keys[pos]
    }
}

impl<'a> IntoIterator for &'a Axis {
    type Item = &'a AxisKey;
    type IntoIter = std::slice::Iter<'a, AxisKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

#[derive(Debug)]
enum Members {
    Growing(BTreeSet<AxisKey>),
    Frozen(Arc<Axis>),
}

/// The distinct keys of one axis while a build runs.
///
/// A growing set sorts and deduplicates by the dimension's ordering; a frozen set is fixed to its
/// seed and only answers membership.
#[derive(Debug)]
pub struct AxisValueSet {
    kind: DimensionKind,
    members: Members,
}

impl AxisValueSet {
    /// An empty set that grows as keys are registered.
    pub fn growing(kind: DimensionKind) -> Self {
        AxisValueSet {
            kind,
            members: Members::Growing(BTreeSet::new()),
        }
    }

    /// A set fixed to `seed`, which must be free of duplicates.
    pub fn frozen(kind: DimensionKind, seed: &[AxisKey]) -> Self {
        AxisValueSet {
            kind,
            members: Members::Frozen(Arc::new(Axis::from_ordered(kind, seed.to_vec()))),
        }
    }

    /// Whether the membership is fixed.
    pub fn is_frozen(&self) -> bool {
        match self.members {
            Members::Growing(_) => false,
            Members::Frozen(_) => true,
        }
    }

    /// Whether registering `key` would succeed.
    pub fn admits(&self, key: &AxisKey) -> bool {
        match &self.members {
            Members::Growing(_) => true,
            Members::Frozen(axis) => axis.position(key).is_some(),
        }
    }

    /// Add a key. A frozen set never grows, it only reports whether the key is a member.
    pub fn register(&mut self, key: AxisKey) -> bool {
        match &mut self.members {
            Members::Growing(keys) => {
                keys.insert(key);
                true
            }
            Members::Frozen(axis) => axis.position(&key).is_some(),
        }
    }

    /// Number of keys currently in the set.
    pub fn len(&self) -> usize {
        match &self.members {
            Members::Growing(keys) => keys.len(),
            Members::Frozen(axis) => axis.len(),
        }
    }

    /// Whether the set has no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The keys as an immutable axis, in final order.
    pub fn snapshot(&self) -> Arc<Axis> {
        match &self.members {
            Members::Growing(keys) => Arc::new(Axis::from_ordered(
                self.kind,
                keys.iter().cloned().collect(),
            )),
            Members::Frozen(axis) => Arc::clone(axis),
        }
    }
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::record::{Level, Network};

    #[test]
    fn test_growing_set_sorts_and_dedups() {
        let mut set = AxisValueSet::growing(DimensionKind::Network);
        assert!(set.register(Network::new(3, "temp").into()));
        assert!(set.register(Network::new(1, "synop").into()));
        assert!(set.register(Network::new(3, "temp").into()));

        let axis = set.snapshot();
        assert_eq!(axis.len(), 2);
        assert_eq!(axis[0], AxisKey::Network(Network::new(1, "synop")));
        assert_eq!(axis.position(&Network::new(3, "temp").into()), Some(1));
    }

    #[test]
    fn test_frozen_set_rejects_strangers() {
        let seed: Vec<AxisKey> = vec![
            Level::new(3, Some(2), None).into(),
            Level::new(1, None, None).into(),
        ];
        let mut set = AxisValueSet::frozen(DimensionKind::Level, &seed);

        assert!(set.is_frozen());
        assert!(set.admits(&Level::new(1, None, None).into()));
        assert!(!set.admits(&Level::new(102, Some(2000), None).into()));
        assert!(!set.register(Level::new(102, Some(2000), None).into()));
        assert_eq!(set.len(), 2);

        // Seed order is kept.
        let axis = set.snapshot();
        assert_eq!(axis.keys(), seed.as_slice());
    }

    #[test]
    fn test_empty_snapshot() {
        let set = AxisValueSet::growing(DimensionKind::DateTime);
        assert!(set.is_empty());
        assert!(set.snapshot().is_empty());
    }
}
