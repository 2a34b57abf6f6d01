//! Observation records as delivered by the query layer.

use chrono::NaiveDateTime;
use std::{cmp::Ordering, fmt};

use crate::{station::Station, value::Value};

/// Code of a variable or attribute, e.g. `B13011`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarCode(String);

impl VarCode {
    /// Create a new code.
    pub fn new(code: &str) -> Self {
        VarCode(code.to_owned())
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VarCode {
    fn from(code: &str) -> Self {
        VarCode::new(code)
    }
}

impl From<String> for VarCode {
    fn from(code: String) -> Self {
        VarCode(code)
    }
}

impl fmt::Display for VarCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Vertical level: a level type and up to two sub-levels.
///
/// Ordered field by field, an absent sub-level sorts before any present one.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level {
    pub ltype: i32,
    pub l1: Option<i32>,
    pub l2: Option<i32>,
}

impl Level {
    /// Create a level.
    pub const fn new(ltype: i32, l1: Option<i32>, l2: Option<i32>) -> Self {
        Level { ltype, l1, l2 }
    }
}

/// Time range: statistical processing indicator and two bounds in seconds.
///
/// Ordered like [`Level`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeRange {
    pub pind: i32,
    pub p1: Option<i32>,
    pub p2: Option<i32>,
}

impl TimeRange {
    /// Create a time range.
    pub const fn new(pind: i32, p1: Option<i32>, p2: Option<i32>) -> Self {
        TimeRange { pind, p1, p2 }
    }
}

/// Reporting network, ordered and compared by report code only.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub struct Network {
    pub code: i32,
    pub name: String,
}

impl Network {
    /// Create a network.
    pub fn new(code: i32, name: &str) -> Self {
        Network {
            code,
            name: name.to_owned(),
        }
    }
}

impl PartialEq for Network {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Network {}

impl PartialOrd for Network {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Network {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code.cmp(&other.code)
    }
}

/// One observation.
///
/// Everything that locates the observation is optional: a dimension that needs a missing field
/// drops the record instead of failing.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub struct Record {
    pub station: Option<Station>,
    pub datetime: Option<NaiveDateTime>,
    pub level: Option<Level>,
    pub time_range: Option<TimeRange>,
    pub network: Option<Network>,
    pub var: VarCode,
    pub value: Value,
    pub context_id: Option<i64>,
    /// Attributes attached by the producer, read by [`EmbeddedAttributes`].
    ///
    /// [`EmbeddedAttributes`]: crate::EmbeddedAttributes
    pub attributes: Vec<(VarCode, Value)>,
}

impl Record {
    /// Create a record that is not located anywhere yet.
    pub fn new(var: impl Into<VarCode>, value: impl Into<Value>) -> Self {
        Record {
            station: None,
            datetime: None,
            level: None,
            time_range: None,
            network: None,
            var: var.into(),
            value: value.into(),
            context_id: None,
            attributes: vec![],
        }
    }

    /// Set the station.
    pub fn with_station(mut self, station: Station) -> Self {
        self.station = Some(station);
        self
    }

    /// Set the date and time.
    pub fn with_datetime(mut self, datetime: NaiveDateTime) -> Self {
        self.datetime = Some(datetime);
        self
    }

    /// Set the level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the time range.
    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = Some(time_range);
        self
    }

    /// Set the network.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    /// Set the context id.
    pub fn with_context_id(mut self, context_id: i64) -> Self {
        self.context_id = Some(context_id);
        self
    }

    /// Attach an attribute.
    pub fn with_attribute(mut self, code: impl Into<VarCode>, value: impl Into<Value>) -> Self {
        self.attributes.push((code.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_absent_sub_levels_sort_first() {
        let surface = Level::new(1, None, None);
        let layer = Level::new(3, Some(2), None);
        let deeper = Level::new(3, Some(2), Some(0));

        assert!(surface < layer);
        assert!(layer < deeper);
        assert!(Level::new(3, None, None) < Level::new(3, Some(-5), None));
    }

    #[test]
    fn test_time_range_order() {
        let mut tranges = vec![
            TimeRange::new(4, Some(-21600), Some(0)),
            TimeRange::new(0, None, None),
            TimeRange::new(4, Some(-43200), Some(0)),
        ];
        tranges.sort();

        assert_eq!(
            tranges,
            vec![
                TimeRange::new(0, None, None),
                TimeRange::new(4, Some(-43200), Some(0)),
                TimeRange::new(4, Some(-21600), Some(0)),
            ]
        );
    }

    #[test]
    fn test_networks_compare_by_code() {
        assert_eq!(Network::new(1, "synop"), Network::new(1, "renamed"));
        assert!(Network::new(1, "synop") < Network::new(3, "temp"));
    }
}
