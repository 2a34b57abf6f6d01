//! Turning a record stream into cubes.
//!
//! A build runs in two phases. While records flow in, each one is placed along every dimension;
//! only a record that every dimension accepts registers its keys and is buffered, so an axis never
//! holds a key that no surviving record uses. Once the stream is exhausted the axes are sorted,
//! the arrays are sized from them and the buffered records are written into their cells.

use log::{debug, trace, warn};
use std::{collections::BTreeMap, collections::BTreeSet, fmt};

use crate::{
    cube::Cube,
    dimension::AxisKey,
    errors::VolndErr,
    index::IndexSet,
    record::{Record, VarCode},
    value::Value,
};

/// Cubes by variable code.
pub type Cubes = BTreeMap<VarCode, Cube>;

/// Which attributes to export alongside the values.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeSelection {
    /// No attribute cubes.
    None,
    /// A cube for every attribute found on the accepted records.
    All,
    /// A cube for each of these codes, created even when no record carries it.
    Only(BTreeSet<VarCode>),
}

impl AttributeSelection {
    /// Select a list of attribute codes.
    pub fn only<'s>(codes: impl IntoIterator<Item = &'s str>) -> Self {
        AttributeSelection::Only(codes.into_iter().map(VarCode::new).collect())
    }

    fn wants(&self, code: &VarCode) -> bool {
        match self {
            AttributeSelection::None => false,
            AttributeSelection::All => true,
            AttributeSelection::Only(codes) => codes.contains(code),
        }
    }
}

impl Default for AttributeSelection {
    fn default() -> Self {
        AttributeSelection::None
    }
}

/// Per build settings.
pub struct BuildOptions {
    /// Fail when two records write different values into the same cell. When off, the last
    /// record wins.
    pub check_conflicts: bool,
    /// Attribute cubes to build.
    pub attributes: AttributeSelection,
    filter: Option<Box<dyn Fn(&Record) -> bool>>,
}

impl BuildOptions {
    /// Conflict checking on, no attributes, no filter.
    pub fn new() -> Self {
        BuildOptions {
            check_conflicts: true,
            attributes: AttributeSelection::None,
            filter: None,
        }
    }

    /// Turn conflict checking on or off.
    pub fn check_conflicts(self, check_conflicts: bool) -> Self {
        BuildOptions {
            check_conflicts,
            ..self
        }
    }

    /// Choose the attribute cubes to build.
    pub fn attributes(self, attributes: AttributeSelection) -> Self {
        BuildOptions { attributes, ..self }
    }

    /// Only consider records for which `filter` returns true.
    pub fn filter(self, filter: impl Fn(&Record) -> bool + 'static) -> Self {
        BuildOptions {
            filter: Some(Box::new(filter)),
            ..self
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BuildOptions")
            .field("check_conflicts", &self.check_conflicts)
            .field("attributes", &self.attributes)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// Two accepted records that map to the same cell with different values.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub var: VarCode,
    /// Set when the collision is in an attribute cube.
    pub attribute: Option<VarCode>,
    /// One key per axis.
    pub coordinate: Vec<AxisKey>,
    pub old: Value,
    pub new: Value,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "conflicting values for {}", self.var)?;
        if let Some(attr) = &self.attribute {
            write!(f, " attribute {}", attr)?;
        }
        write!(
            f,
            " at {:?}: {} then {}",
            self.coordinate, self.old, self.new
        )
    }
}

/// Counters of what happened to the records of a build.
#[allow(missing_docs)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub seen: usize,
    /// Dropped by the record filter.
    pub filtered: usize,
    /// Dropped because a dimension found no key.
    pub absent: usize,
    /// Dropped because a frozen axis did not have the key.
    pub rejected: usize,
    pub accepted: usize,
}

/// Where the attributes of an accepted record come from.
pub trait AttributeSource {
    /// The attributes of the value in `record`.
    fn attributes(&mut self, record: &Record) -> Result<Vec<(VarCode, Value)>, VolndErr>;
}

/// Reads the attributes the producer attached to each record.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedAttributes;

impl AttributeSource for EmbeddedAttributes {
    fn attributes(&mut self, record: &Record) -> Result<Vec<(VarCode, Value)>, VolndErr> {
        Ok(record.attributes.clone())
    }
}

// An accepted record waiting for the axes to be final.
struct Pending {
    var: VarCode,
    keys: Vec<AxisKey>,
    value: Value,
    attributes: Vec<(VarCode, Value)>,
}

/// A single-use build over an [`IndexSet`].
///
/// Feed records with [`push`](CubeBuilder::push) and collect the cubes with
/// [`finish`](CubeBuilder::finish), or do both with [`build`](CubeBuilder::build).
pub struct CubeBuilder<'a> {
    index: &'a mut IndexSet,
    options: BuildOptions,
    attribute_source: Box<dyn AttributeSource + 'a>,
    pending: Vec<Pending>,
    stats: BuildStats,
}

impl<'a> CubeBuilder<'a> {
    /// Start a build. Any axes left in `index` by a previous build are dropped.
    pub fn new(index: &'a mut IndexSet, options: BuildOptions) -> Self {
        index.begin();

        CubeBuilder {
            index,
            options,
            attribute_source: Box::new(EmbeddedAttributes),
            pending: vec![],
            stats: BuildStats::default(),
        }
    }

    /// Look attributes up somewhere other than on the records.
    pub fn with_attribute_source(self, source: impl AttributeSource + 'a) -> Self {
        CubeBuilder {
            attribute_source: Box::new(source),
            ..self
        }
    }

    /// What happened to the records so far.
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Offer one record. Returns whether it was accepted.
    pub fn push(&mut self, record: Record) -> Result<bool, VolndErr> {
        self.stats.seen += 1;

        if let Some(filter) = &self.options.filter {
            if !filter(&record) {
                trace!("{} record filtered out", record.var);
                self.stats.filtered += 1;
                return Ok(false);
            }
        }

        let mut keys = Vec::with_capacity(self.index.len());
        for (dim_idx, dim) in self.index.dimensions().iter().enumerate() {
            let key = match dim.extract(&record) {
                Some(key) => key,
                None => {
                    trace!("{} record has no {} key", record.var, dim.kind());
                    self.stats.absent += 1;
                    return Ok(false);
                }
            };

            if !self.index.admits(dim_idx, &record.var, &key) {
                trace!("{} record rejected by frozen {} axis", record.var, dim.kind());
                self.stats.rejected += 1;
                return Ok(false);
            }

            keys.push(key);
        }

        for (dim_idx, key) in keys.iter().enumerate() {
            if !self.index.register(dim_idx, &record.var, key.clone()) {
                return Err(VolndErr::LogicError("admitted key refused by its axis"));
            }
        }

        let attributes = match self.options.attributes {
            AttributeSelection::None => vec![],
            _ => {
                let selection = &self.options.attributes;
                self.attribute_source
                    .attributes(&record)?
                    .into_iter()
                    .filter(|(code, _)| selection.wants(code))
                    .collect()
            }
        };

        self.pending.push(Pending {
            var: record.var,
            keys,
            value: record.value,
            attributes,
        });
        self.stats.accepted += 1;

        Ok(true)
    }

    /// Size the cubes from the final axes and fill them.
    pub fn finish(self) -> Result<Cubes, VolndErr> {
        let CubeBuilder {
            index,
            options,
            pending,
            stats,
            ..
        } = self;

        let axes = index.realize();

        let mut cubes = Cubes::new();
        for rec in &pending {
            if !cubes.contains_key(&rec.var) {
                let mut cube = Cube::empty(rec.var.clone(), axes.axes_for(&rec.var));
                if let AttributeSelection::Only(codes) = &options.attributes {
                    for code in codes {
                        cube.attribute_mut(code);
                    }
                }
                cubes.insert(rec.var.clone(), cube);
            }
        }

        for rec in pending {
            let cube = cubes
                .get_mut(&rec.var)
                .ok_or(VolndErr::LogicError("no cube for a buffered record"))?;

            if let Err(conflict) = write(cube, rec, options.check_conflicts)? {
                warn!("aborting build: {}", conflict);
                return Err(conflict.into());
            }
        }

        debug!(
            "built {} cubes from {} records: {} accepted, {} filtered, {} without a key, {} rejected",
            cubes.len(),
            stats.seen,
            stats.accepted,
            stats.filtered,
            stats.absent,
            stats.rejected
        );
        for cube in cubes.values() {
            debug!("{} shape {:?}", cube.var(), cube.shape());
        }

        index.commit(axes);

        Ok(cubes)
    }

    /// Consume a record stream and return the cubes.
    pub fn build(mut self, records: impl IntoIterator<Item = Record>) -> Result<Cubes, VolndErr> {
        for record in records {
            self.push(record)?;
        }
        self.finish()
    }

    /// Like [`build`](CubeBuilder::build) for a stream that can fail, stopping at the first error.
    pub fn try_build<I, E>(mut self, records: I) -> Result<Cubes, VolndErr>
    where
        I: IntoIterator<Item = Result<Record, E>>,
        VolndErr: From<E>,
    {
        for record in records {
            self.push(record?)?;
        }
        self.finish()
    }
}

// Write one buffered record into its cube. The outer error is a logic error, the inner one a
// conflict.
fn write(
    cube: &mut Cube,
    rec: Pending,
    check_conflicts: bool,
) -> Result<Result<(), Conflict>, VolndErr> {
    let index = cube
        .locate(&rec.keys)
        .ok_or(VolndErr::LogicError("registered key missing from its axis"))?;

    if cube.is_present(&index) {
        if check_conflicts {
            if !cube.value_at(&index).same_as(&rec.value) {
                return Ok(Err(Conflict {
                    var: rec.var,
                    attribute: None,
                    coordinate: rec.keys,
                    old: cube.value_at(&index).clone(),
                    new: rec.value,
                }));
            }
        } else {
            // The attributes of the overwritten record go with it.
            for attr in cube.attributes_mut() {
                attr.clear(&index);
            }
        }
    }

    cube.set(&index, rec.value);

    for (code, value) in rec.attributes {
        let attr = cube.attribute_mut(&code);
        if check_conflicts && attr.is_present(&index) && !attr.value_at(&index).same_as(&value) {
            return Ok(Err(Conflict {
                var: rec.var,
                coordinate: rec.keys,
                old: attr.value_at(&index).clone(),
                new: value,
                attribute: Some(code),
            }));
        }
        attr.set(&index, value);
    }

    Ok(Ok(()))
}

/// Build cubes from `records` in one call.
pub fn read(
    records: impl IntoIterator<Item = Record>,
    index: &mut IndexSet,
    options: BuildOptions,
) -> Result<Cubes, VolndErr> {
    CubeBuilder::new(index, options).build(records)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
