//! The axis registry of a build.

use log::debug;
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    dimension::{AxisKey, Dimension, DimensionKind, Seed},
    record::VarCode,
};

mod axis;

pub use axis::{Axis, AxisValueSet};

#[derive(Debug)]
enum Registry {
    Shared(AxisValueSet),
    PerVariable(BTreeMap<VarCode, AxisValueSet>),
}

impl Registry {
    fn for_dimension(dim: &Dimension) -> Self {
        if dim.is_shared() {
            let set = match dim.seed() {
                Some(Seed::Shared(keys)) => AxisValueSet::frozen(dim.kind(), keys),
                // Only independent dimensions are frozen per variable.
                Some(Seed::PerVariable(_)) => AxisValueSet::frozen(dim.kind(), &[]),
                None => AxisValueSet::growing(dim.kind()),
            };
            Registry::Shared(set)
        } else {
            Registry::PerVariable(BTreeMap::new())
        }
    }
}

#[derive(Debug, Clone)]
enum Realized {
    Shared(Arc<Axis>),
    PerVariable {
        kind: DimensionKind,
        axes: BTreeMap<VarCode, Arc<Axis>>,
    },
}

/// The final axes of a build, one per dimension and variable.
#[derive(Debug, Clone)]
pub struct Materialized {
    realized: Vec<Realized>,
}

impl Materialized {
    /// The axes of `var`, in dimension order.
    pub fn axes_for(&self, var: &VarCode) -> Vec<Arc<Axis>> {
        self.realized
            .iter()
            .map(|realized| match realized {
                Realized::Shared(axis) => Arc::clone(axis),
                Realized::PerVariable { kind, axes } => axes
                    .get(var)
                    .cloned()
                    .unwrap_or_else(|| AxisValueSet::growing(*kind).snapshot()),
            })
            .collect()
    }
}

/// The ordered dimensions of a build and the axes they grow.
///
/// Axes live here only for the duration of one build. [`IndexSet::freeze_all`] turns the axes of
/// the last build into frozen seeds, so a later build over a different query lines up with it.
#[derive(Debug)]
pub struct IndexSet {
    dimensions: Vec<Dimension>,
    registries: Vec<Registry>,
    realized: Option<Materialized>,
}

impl IndexSet {
    /// Create a new index set.
    pub fn new(dimensions: Vec<Dimension>) -> Self {
        let registries = dimensions.iter().map(Registry::for_dimension).collect();

        IndexSet {
            dimensions,
            registries,
            realized: None,
        }
    }

    /// The dimensions, in axis order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Whether there are no dimensions at all.
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Drop the axes of any previous build.
    pub(crate) fn begin(&mut self) {
        self.realized = None;
        self.registries = self
            .dimensions
            .iter()
            .map(Registry::for_dimension)
            .collect();
    }

    fn set_for(&mut self, dim_idx: usize, var: &VarCode) -> &mut AxisValueSet {
        let dim = &self.dimensions[dim_idx];
        match &mut self.registries[dim_idx] {
            Registry::Shared(set) => set,
            Registry::PerVariable(sets) => sets.entry(var.clone()).or_insert_with(|| {
                match dim.seed() {
                    Some(seed) => AxisValueSet::frozen(dim.kind(), seed.keys_for(var)),
                    None => AxisValueSet::growing(dim.kind()),
                }
            }),
        }
    }

    /// Whether the axis of `dim_idx` for `var` would accept `key`.
    pub fn admits(&self, dim_idx: usize, var: &VarCode, key: &AxisKey) -> bool {
        match &self.registries[dim_idx] {
            Registry::Shared(set) => set.admits(key),
            Registry::PerVariable(sets) => match sets.get(var) {
                Some(set) => set.admits(key),
                None => match self.dimensions[dim_idx].seed() {
                    Some(seed) => seed.keys_for(var).contains(key),
                    None => true,
                },
            },
        }
    }

    /// Add `key` to the axis of `dim_idx` for `var`, returning whether it was accepted.
    pub fn register(&mut self, dim_idx: usize, var: &VarCode, key: AxisKey) -> bool {
        self.set_for(dim_idx, var).register(key)
    }

    /// Sort out the final axes. They are kept for [`IndexSet::freeze_all`].
    pub fn materialize(&mut self) -> Materialized {
        let materialized = self.realize();
        self.commit(materialized.clone());
        materialized
    }

    // The final axes, not yet kept for freezing.
    pub(crate) fn realize(&self) -> Materialized {
        let realized = self
            .registries
            .iter()
            .zip(&self.dimensions)
            .map(|(registry, dim)| match registry {
                Registry::Shared(set) => Realized::Shared(set.snapshot()),
                Registry::PerVariable(sets) => Realized::PerVariable {
                    kind: dim.kind(),
                    axes: sets
                        .iter()
                        .map(|(var, set)| (var.clone(), set.snapshot()))
                        .collect(),
                },
            })
            .collect();

        Materialized { realized }
    }

    // Keep the axes of a completed build for `freeze_all`.
    pub(crate) fn commit(&mut self, materialized: Materialized) {
        self.realized = Some(materialized);
    }

    /// Freeze every dimension to the axes of the last build.
    ///
    /// Independent dimensions are frozen per variable. Does nothing before the first build, or
    /// when the last build failed.
    pub fn freeze_all(&mut self) {
        let realized = match &self.realized {
            Some(materialized) => &materialized.realized,
            None => {
                debug!("freeze_all called before any build, nothing to freeze");
                return;
            }
        };

        for (dim, realized) in self.dimensions.iter_mut().zip(realized) {
            let seed = match realized {
                Realized::Shared(axis) => Seed::Shared(axis.keys().to_vec()),
                Realized::PerVariable { axes, .. } => Seed::PerVariable(
                    axes.iter()
                        .map(|(var, axis)| (var.clone(), axis.keys().to_vec()))
                        .collect(),
                ),
            };
            debug!("freezing {} axis", dim.kind());
            dim.set_seed(seed);
        }

        self.begin();
    }
}

#[cfg(test)]
mod unit {
    use super::*;
    use crate::record::{Level, TimeRange};

    fn b13011() -> VarCode {
        VarCode::new("B13011")
    }

    fn b10004() -> VarCode {
        VarCode::new("B10004")
    }

    #[test]
    fn test_shared_axis_is_the_same_for_all_variables() {
        let mut index = IndexSet::new(vec![Dimension::time_range()]);
        index.register(0, &b13011(), TimeRange::new(4, Some(-21600), Some(0)).into());
        index.register(0, &b10004(), TimeRange::new(0, None, None).into());

        let axes = index.materialize();
        assert_eq!(axes.axes_for(&b13011()), axes.axes_for(&b10004()));
        assert_eq!(axes.axes_for(&b13011())[0].len(), 2);
    }

    #[test]
    fn test_independent_axis_per_variable() {
        let mut index = IndexSet::new(vec![Dimension::time_range().independent()]);
        index.register(0, &b13011(), TimeRange::new(4, Some(-21600), Some(0)).into());
        index.register(0, &b13011(), TimeRange::new(4, Some(-43200), Some(0)).into());
        index.register(0, &b10004(), TimeRange::new(0, None, None).into());

        let axes = index.materialize();
        assert_eq!(axes.axes_for(&b13011())[0].len(), 2);
        assert_eq!(axes.axes_for(&b10004())[0].len(), 1);
        assert!(axes.axes_for(&VarCode::new("B12101"))[0].is_empty());
    }

    #[test]
    fn test_frozen_dimension_rejects() {
        let dim = Dimension::level()
            .frozen(vec![Level::new(1, None, None).into()])
            .unwrap();
        let mut index = IndexSet::new(vec![dim]);

        let other: AxisKey = Level::new(3, Some(2), None).into();
        assert!(!index.admits(0, &b13011(), &other));
        assert!(!index.register(0, &b13011(), other));
        assert!(index.register(0, &b13011(), Level::new(1, None, None).into()));

        assert_eq!(index.materialize().axes_for(&b13011())[0].len(), 1);
    }

    #[test]
    fn test_freeze_all_reuses_axes() {
        let mut index = IndexSet::new(vec![Dimension::level()]);
        index.register(0, &b13011(), Level::new(3, Some(2), None).into());
        index.register(0, &b13011(), Level::new(1, None, None).into());
        let first = index.materialize().axes_for(&b13011());

        index.freeze_all();
        assert!(index.dimensions()[0].is_frozen());
        assert!(!index.admits(0, &b13011(), &Level::new(7, None, None).into()));

        index.register(0, &b13011(), Level::new(1, None, None).into());
        let second = index.materialize().axes_for(&b13011());
        assert_eq!(first, second);
    }

    #[test]
    fn test_freeze_all_independent() {
        let mut index = IndexSet::new(vec![Dimension::time_range().independent()]);
        index.register(0, &b13011(), TimeRange::new(4, Some(-21600), Some(0)).into());
        index.materialize();
        index.freeze_all();

        assert!(index.admits(0, &b13011(), &TimeRange::new(4, Some(-21600), Some(0)).into()));
        assert!(!index.admits(0, &b10004(), &TimeRange::new(4, Some(-21600), Some(0)).into()));
    }

    #[test]
    fn test_freeze_before_build_does_nothing() {
        let mut index = IndexSet::new(vec![Dimension::station()]);
        index.freeze_all();
        assert!(!index.dimensions()[0].is_frozen());
    }
}
