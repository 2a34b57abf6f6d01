use std::fmt;

/// Number of a station in the source database, the identity of a station key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationNumber(i64);

impl StationNumber {
    /// Wrap a station number.
    pub const fn new(num: i64) -> Self {
        StationNumber(num)
    }

    /// The bare number.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for StationNumber {
    fn from(num: i64) -> Self {
        StationNumber(num)
    }
}

impl From<StationNumber> for i64 {
    fn from(num: StationNumber) -> Self {
        num.0
    }
}

impl fmt::Display for StationNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
