#![deny(missing_docs)]
//! Turn a stream of station observation records into dense, masked multi-dimensional cubes.
//!
//! An [`IndexSet`] lists the dimensions of the output, in order. A build reads every record once,
//! keeping only those that all dimensions can locate, then lays the axes out and writes each kept
//! value into the [`Cube`] of its variable:
//!
//! ```
//! use volnd::{read, BuildOptions, Dimension, IndexSet, Network, Record, Station, VarCode};
//!
//! let records = vec![
//!     Record::new("B10004", 100000.0)
//!         .with_station(Station::new(1, 44.5, 11.3))
//!         .with_network(Network::new(1, "synop")),
//!     Record::new("B10004", 98000.0)
//!         .with_station(Station::new(2, 45.0, 12.0))
//!         .with_network(Network::new(3, "temp")),
//! ];
//!
//! let mut index = IndexSet::new(vec![Dimension::station(), Dimension::network()]);
//! let cubes = read(records, &mut index, BuildOptions::default()).unwrap();
//!
//! let pressure = &cubes[&VarCode::new("B10004")];
//! assert_eq!(pressure.shape(), &[2, 2]);
//! assert_eq!(pressure.missing_count(), 2);
//! ```

//
// Public API
//
pub use builder::{
    read, AttributeSelection, AttributeSource, BuildOptions, BuildStats, Conflict, CubeBuilder,
    Cubes, EmbeddedAttributes,
};
pub use coords::Coords;
pub use cube::Cube;
pub use dimension::{AxisKey, Dimension, DimensionKind, Interval, Seed};
pub use errors::VolndErr;
pub use index::{Axis, AxisValueSet, IndexSet, Materialized};
pub use record::{Level, Network, Record, TimeRange, VarCode};
pub use source::{SqliteAttributes, SqliteRecords, ATTRIBUTES_SQL};
pub use station::{Station, StationNumber};
pub use value::Value;

//
// Implementation only
//
mod builder;
mod coords;
mod cube;
mod dimension;
mod errors;
mod index;
mod record;
mod source;
mod station;
mod value;

#[cfg(test)]
extern crate tempdir;
