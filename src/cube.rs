//! The dense, masked result of a build.

use ndarray::{ArrayD, Dimension as _, IxDyn};
use std::{collections::BTreeMap, sync::Arc};

use crate::{dimension::AxisKey, index::Axis, record::VarCode, value::Value};

/// Values of one variable laid out on a grid of axes.
///
/// `values` and `present` have the same shape, one extent per axis. A cell holds data only where
/// `present` is true, the value array holds a filler everywhere else. Attribute cubes share the
/// axes of their owner.
#[derive(Debug, Clone)]
pub struct Cube {
    var: VarCode,
    axes: Vec<Arc<Axis>>,
    values: ArrayD<Value>,
    present: ArrayD<bool>,
    attributes: BTreeMap<VarCode, Cube>,
}

impl Cube {
    /// An all-missing cube on `axes`.
    pub(crate) fn empty(var: VarCode, axes: Vec<Arc<Axis>>) -> Self {
        let shape: Vec<usize> = axes.iter().map(|axis| axis.len()).collect();

        Cube {
            var,
            values: ArrayD::from_elem(IxDyn(&shape), Value::default()),
            present: ArrayD::from_elem(IxDyn(&shape), false),
            axes,
            attributes: BTreeMap::new(),
        }
    }

    /// The variable (or attribute) code.
    pub fn var(&self) -> &VarCode {
        &self.var
    }

    /// The axes, in dimension order.
    pub fn axes(&self) -> &[Arc<Axis>] {
        &self.axes
    }

    /// Extent along each axis.
    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    /// Total number of cells.
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// The dense value array. Only cells marked present are meaningful.
    pub fn values(&self) -> &ArrayD<Value> {
        &self.values
    }

    /// The presence mask.
    pub fn present(&self) -> &ArrayD<bool> {
        &self.present
    }

    /// Attribute cubes by attribute code.
    pub fn attributes(&self) -> &BTreeMap<VarCode, Cube> {
        &self.attributes
    }

    /// The cube of one attribute.
    pub fn attribute(&self, code: &str) -> Option<&Cube> {
        self.attributes.get(&VarCode::new(code))
    }

    /// The value at `index`, if present.
    pub fn get(&self, index: &[usize]) -> Option<&Value> {
        let ix = IxDyn(index);
        match self.present.get(ix.clone()) {
            Some(&true) => self.values.get(ix),
            _ => None,
        }
    }

    /// The value at the cell located by one key per axis, if present.
    pub fn get_by_keys(&self, keys: &[AxisKey]) -> Option<&Value> {
        self.locate(keys).and_then(|index| self.get(&index))
    }

    /// Resolve one key per axis into a cell index.
    pub fn locate(&self, keys: &[AxisKey]) -> Option<Vec<usize>> {
        if keys.len() != self.axes.len() {
            return None;
        }

        self.axes
            .iter()
            .zip(keys)
            .map(|(axis, key)| axis.position(key))
            .collect()
    }

    /// Number of cells holding data.
    pub fn present_count(&self) -> usize {
        self.present.iter().filter(|&&p| p).count()
    }

    /// Number of cells without data.
    pub fn missing_count(&self) -> usize {
        self.size() - self.present_count()
    }

    /// Present cells with their index, in row-major order.
    pub fn iter_present(&self) -> impl Iterator<Item = (Vec<usize>, &Value)> + '_ {
        self.present
            .indexed_iter()
            .zip(self.values.iter())
            .filter(|((_, present), _)| **present)
            .map(|((index, _), value)| (index.slice().to_vec(), value))
    }

    /// Mean of the present numeric values, `None` if there are none.
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .iter_present()
            .filter_map(|(_, value)| value.as_f64())
            .fold((0.0, 0usize), |(sum, count), val| (sum + val, count + 1));

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    pub(crate) fn is_present(&self, index: &[usize]) -> bool {
        self.present[IxDyn(index)]
    }

    pub(crate) fn value_at(&self, index: &[usize]) -> &Value {
        &self.values[IxDyn(index)]
    }

    pub(crate) fn set(&mut self, index: &[usize], value: Value) {
        let ix = IxDyn(index);
        self.values[ix.clone()] = value;
        self.present[ix] = true;
    }

    pub(crate) fn clear(&mut self, index: &[usize]) {
        let ix = IxDyn(index);
        self.values[ix.clone()] = Value::default();
        self.present[ix] = false;
    }

    /// The attribute cube for `code`, created on the owner's axes if needed.
    pub(crate) fn attribute_mut(&mut self, code: &VarCode) -> &mut Cube {
        let axes = &self.axes;
        self.attributes
            .entry(code.clone())
            .or_insert_with(|| Cube::empty(code.clone(), axes.clone()))
    }

    pub(crate) fn attributes_mut(&mut self) -> impl Iterator<Item = &mut Cube> + '_ {
        self.attributes.values_mut()
    }
}
