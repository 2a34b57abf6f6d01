//! Dimensions: how a record is placed along one axis of a cube.

use chrono::NaiveDateTime;
use std::{cmp::Ordering, collections::BTreeMap, collections::BTreeSet, fmt, str::FromStr};

use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::{
    errors::VolndErr,
    record::{Level, Network, Record, TimeRange, VarCode},
    station::Station,
};

mod interval;

pub use interval::Interval;

/// The kinds of dimension a cube can be indexed by.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, EnumString, IntoStaticStr, EnumIter)]
pub enum DimensionKind {
    /// Station number with its coordinates and mobile identifier.
    #[strum(to_string = "station", serialize = "ana")]
    Station,
    /// Date and time of the observation.
    #[strum(to_string = "datetime", serialize = "date")]
    DateTime,
    /// Vertical level.
    #[strum(to_string = "level")]
    Level,
    /// Time range.
    #[strum(to_string = "trange", serialize = "timerange")]
    TimeRange,
    /// Reporting network.
    #[strum(to_string = "network", serialize = "rep_memo")]
    Network,
    /// Date and time snapped to a regular grid.
    #[strum(to_string = "interval")]
    Interval,
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(<&'static str>::from(*self))
    }
}

/// One key along an axis.
///
/// Keys of one axis are always the same variant, so the derived ordering across variants never
/// comes into play.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum AxisKey {
    Station(Station),
    DateTime(NaiveDateTime),
    Level(Level),
    TimeRange(TimeRange),
    Network(Network),
}

impl From<Station> for AxisKey {
    fn from(station: Station) -> Self {
        AxisKey::Station(station)
    }
}

impl From<NaiveDateTime> for AxisKey {
    fn from(datetime: NaiveDateTime) -> Self {
        AxisKey::DateTime(datetime)
    }
}

impl From<Level> for AxisKey {
    fn from(level: Level) -> Self {
        AxisKey::Level(level)
    }
}

impl From<TimeRange> for AxisKey {
    fn from(time_range: TimeRange) -> Self {
        AxisKey::TimeRange(time_range)
    }
}

impl From<Network> for AxisKey {
    fn from(network: Network) -> Self {
        AxisKey::Network(network)
    }
}

/// Fixed membership of a frozen axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Seed {
    /// The same keys for every variable.
    Shared(Vec<AxisKey>),
    /// Keys per variable, for a frozen independent dimension. Variables that are not listed get
    /// an empty axis.
    PerVariable(BTreeMap<VarCode, Vec<AxisKey>>),
}

impl Seed {
    /// The keys for a variable.
    pub fn keys_for(&self, var: &VarCode) -> &[AxisKey] {
        match self {
            Seed::Shared(keys) => keys,
            Seed::PerVariable(map) => map.get(var).map(Vec::as_slice).unwrap_or(&[]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Rule {
    Station,
    DateTime,
    Level,
    TimeRange,
    Network,
    Interval(Interval),
}

/// A rule for extracting and ordering the keys of one cube axis, with its sharing and freezing
/// configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    rule: Rule,
    shared: bool,
    seed: Option<Seed>,
}

impl Dimension {
    fn with_rule(rule: Rule) -> Self {
        Dimension {
            rule,
            shared: true,
            seed: None,
        }
    }

    /// Index by station.
    pub fn station() -> Self {
        Self::with_rule(Rule::Station)
    }

    /// Index by date and time.
    pub fn datetime() -> Self {
        Self::with_rule(Rule::DateTime)
    }

    /// Index by vertical level.
    pub fn level() -> Self {
        Self::with_rule(Rule::Level)
    }

    /// Index by time range.
    pub fn time_range() -> Self {
        Self::with_rule(Rule::TimeRange)
    }

    /// Index by reporting network.
    pub fn network() -> Self {
        Self::with_rule(Rule::Network)
    }

    /// Index by date and time snapped to a regular grid.
    pub fn interval(interval: Interval) -> Self {
        Self::with_rule(Rule::Interval(interval))
    }

    /// Give every variable its own axis for this dimension.
    pub fn independent(self) -> Self {
        Dimension {
            shared: false,
            ..self
        }
    }

    /// Fix the axis to exactly `seed`, in the given order.
    ///
    /// Repeated keys keep their first position. Records whose key is not in the seed are
    /// excluded from the build.
    pub fn frozen(self, seed: impl IntoIterator<Item = AxisKey>) -> Result<Self, VolndErr> {
        let mut seen = BTreeSet::new();
        let mut keys = vec![];
        for key in seed {
            if !self.matches_kind(&key) {
                return Err(VolndErr::SeedMismatch {
                    dimension: self.kind().into(),
                    key: format!("{:?}", key),
                });
            }
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }

        Ok(Dimension {
            seed: Some(Seed::Shared(keys)),
            ..self
        })
    }

    /// Freeze the axis with no members, which rejects every record.
    pub fn freeze_empty(self) -> Self {
        Dimension {
            seed: Some(Seed::Shared(vec![])),
            ..self
        }
    }

    pub(crate) fn set_seed(&mut self, seed: Seed) {
        self.seed = Some(seed);
    }

    /// What this dimension indexes.
    pub fn kind(&self) -> DimensionKind {
        match self.rule {
            Rule::Station => DimensionKind::Station,
            Rule::DateTime => DimensionKind::DateTime,
            Rule::Level => DimensionKind::Level,
            Rule::TimeRange => DimensionKind::TimeRange,
            Rule::Network => DimensionKind::Network,
            Rule::Interval(_) => DimensionKind::Interval,
        }
    }

    /// Whether all variables share one axis.
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    /// Whether the axis membership is fixed.
    pub fn is_frozen(&self) -> bool {
        self.seed.is_some()
    }

    /// The fixed membership, if frozen.
    pub fn seed(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    /// The key of `record` along this dimension, `None` if the record lacks the fields it needs.
    pub fn extract(&self, record: &Record) -> Option<AxisKey> {
        match &self.rule {
            Rule::Station => record.station.clone().map(AxisKey::Station),
            Rule::DateTime => record.datetime.map(AxisKey::DateTime),
            Rule::Level => record.level.map(AxisKey::Level),
            Rule::TimeRange => record.time_range.map(AxisKey::TimeRange),
            Rule::Network => record.network.clone().map(AxisKey::Network),
            Rule::Interval(interval) => record
                .datetime
                .and_then(|dt| interval.slot(dt))
                .map(AxisKey::DateTime),
        }
    }

    /// Order of two keys along this axis.
    pub fn order(&self, left: &AxisKey, right: &AxisKey) -> Ordering {
        left.cmp(right)
    }

    fn matches_kind(&self, key: &AxisKey) -> bool {
        match (&self.rule, key) {
            (Rule::Station, AxisKey::Station(_)) => true,
            (Rule::DateTime, AxisKey::DateTime(_)) => true,
            (Rule::Interval(_), AxisKey::DateTime(_)) => true,
            (Rule::Level, AxisKey::Level(_)) => true,
            (Rule::TimeRange, AxisKey::TimeRange(_)) => true,
            (Rule::Network, AxisKey::Network(_)) => true,
            _ => false,
        }
    }
}

impl FromStr for Dimension {
    type Err = VolndErr;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match DimensionKind::from_str(name)? {
            DimensionKind::Station => Ok(Dimension::station()),
            DimensionKind::DateTime => Ok(Dimension::datetime()),
            DimensionKind::Level => Ok(Dimension::level()),
            DimensionKind::TimeRange => Ok(Dimension::time_range()),
            DimensionKind::Network => Ok(Dimension::network()),
            DimensionKind::Interval => Err(VolndErr::InvalidDimension(format!(
                "{} needs a start and a step",
                name
            ))),
        }
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    use chrono::{Duration, NaiveDate};
    use strum::IntoEnumIterator;

    fn record() -> Record {
        Record::new("B12101", 273.15)
            .with_station(Station::new(7, 44.5, 11.3))
            .with_datetime(NaiveDate::from_ymd(2007, 1, 1).and_hms(12, 3, 0))
            .with_level(Level::new(1, None, None))
    }

    #[test]
    fn test_extract_present_fields() {
        let rec = record();

        assert_eq!(
            Dimension::station().extract(&rec),
            Some(AxisKey::Station(Station::new(7, 44.5, 11.3)))
        );
        assert_eq!(
            Dimension::level().extract(&rec),
            Some(AxisKey::Level(Level::new(1, None, None)))
        );
    }

    #[test]
    fn test_extract_absent_fields() {
        let rec = record();

        assert_eq!(Dimension::time_range().extract(&rec), None);
        assert_eq!(Dimension::network().extract(&rec), None);
    }

    #[test]
    fn test_interval_extract() {
        let start = NaiveDate::from_ymd(2007, 1, 1).and_hms(0, 0, 0);
        let grid = Interval::new(start, Duration::hours(6))
            .unwrap()
            .with_tolerance(Duration::minutes(5))
            .unwrap();
        let dim = Dimension::interval(grid);

        assert_eq!(
            dim.extract(&record()),
            Some(AxisKey::DateTime(start + Duration::hours(12)))
        );

        let strict = Dimension::interval(Interval::new(start, Duration::hours(6)).unwrap());
        assert_eq!(strict.extract(&record()), None);
    }

    #[test]
    fn test_parse_dimension_names() {
        assert_eq!(Dimension::from_str("ana").unwrap().kind(), DimensionKind::Station);
        assert_eq!(
            Dimension::from_str("timerange").unwrap().kind(),
            DimensionKind::TimeRange
        );
        assert!(Dimension::from_str("interval").is_err());
        assert!(Dimension::from_str("bogus").is_err());
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in DimensionKind::iter() {
            assert_eq!(DimensionKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn test_defaults() {
        let dim = Dimension::level();
        assert!(dim.is_shared());
        assert!(!dim.is_frozen());

        let dim = dim.independent();
        assert!(!dim.is_shared());
    }

    #[test]
    fn test_frozen_seed_dedups_in_order() {
        let dim = Dimension::level()
            .frozen(vec![
                Level::new(3, Some(2), None).into(),
                Level::new(1, None, None).into(),
                Level::new(3, Some(2), None).into(),
            ])
            .unwrap();

        assert!(dim.is_frozen());
        assert_eq!(
            dim.seed(),
            Some(&Seed::Shared(vec![
                Level::new(3, Some(2), None).into(),
                Level::new(1, None, None).into(),
            ]))
        );
    }

    #[test]
    fn test_frozen_seed_kind_mismatch() {
        let res = Dimension::level().frozen(vec![TimeRange::new(0, None, None).into()]);
        assert!(matches!(res, Err(VolndErr::SeedMismatch { dimension: "level", .. })));
    }

    #[test]
    fn test_order_is_chronological() {
        let dim = Dimension::datetime();
        let early: AxisKey = NaiveDate::from_ymd(2007, 1, 1).and_hms(0, 0, 0).into();
        let late: AxisKey = NaiveDate::from_ymd(2007, 1, 2).and_hms(0, 0, 0).into();

        assert_eq!(dim.order(&early, &late), Ordering::Less);
        assert_eq!(dim.order(&late, &late), Ordering::Equal);
    }
}
