use crate::coords::Coords;
use std::cmp::Ordering;

mod station_num;

pub use station_num::StationNumber;

/// Key of the station axis.
///
/// Two keys are the same station when their station numbers match; the coordinates and the mobile
/// station identifier travel with the key but take no part in ordering or equality.
#[derive(Debug, Clone)]
pub struct Station {
    /// Station number, the ordering key.
    pub id: StationNumber,
    /// Where the station is.
    pub coords: Coords,
    /// Identifier of a mobile station, `None` for fixed stations.
    pub ident: Option<String>,
}

impl Station {
    /// Create a fixed station.
    pub fn new(id: impl Into<StationNumber>, lat: f64, lon: f64) -> Self {
        Station {
            id: id.into(),
            coords: Coords::from((lat, lon)),
            ident: None,
        }
    }

    /// Create a mobile station.
    pub fn mobile(id: impl Into<StationNumber>, lat: f64, lon: f64, ident: &str) -> Self {
        Station {
            ident: Some(ident.to_owned()),
            ..Station::new(id, lat, lon)
        }
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Station {}

impl PartialOrd for Station {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Station {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_stations_compare_by_number_only() {
        let a = Station::new(1, 10.0, 15.0);
        let moved = Station::new(1, 11.0, 16.0);
        let b = Station::mobile(2, 10.0, 15.0, "ship");

        assert_eq!(a, moved);
        assert!(a < b);
        assert_eq!(b.ident.as_deref(), Some("ship"));
    }
}
