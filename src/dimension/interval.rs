use chrono::{Duration, NaiveDateTime};

use crate::errors::VolndErr;

/// A regular time grid: slots at `start + n * step`.
///
/// A date-time belongs to the nearest slot when it lies within `tolerance` of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    start: NaiveDateTime,
    step: Duration,
    tolerance: Duration,
    end: Option<NaiveDateTime>,
}

impl Interval {
    /// Create a grid with no tolerance and no end.
    pub fn new(start: NaiveDateTime, step: Duration) -> Result<Self, VolndErr> {
        if step.num_milliseconds() <= 0 {
            return Err(VolndErr::InvalidInterval("step must be at least one millisecond"));
        }

        Ok(Interval {
            start,
            step,
            tolerance: Duration::zero(),
            end: None,
        })
    }

    /// Accept date-times up to `tolerance` away from a slot.
    pub fn with_tolerance(self, tolerance: Duration) -> Result<Self, VolndErr> {
        if tolerance < Duration::zero() {
            return Err(VolndErr::InvalidInterval("tolerance must not be negative"));
        }

        Ok(Interval { tolerance, ..self })
    }

    /// Reject slots after `end`.
    pub fn until(self, end: NaiveDateTime) -> Self {
        Interval {
            end: Some(end),
            ..self
        }
    }

    /// The first slot.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Distance between slots.
    pub fn step(&self) -> Duration {
        self.step
    }

    /// The slot a date-time falls into, if any.
    pub fn slot(&self, datetime: NaiveDateTime) -> Option<NaiveDateTime> {
        let step = self.step.num_milliseconds();
        let tolerance = self.tolerance.num_milliseconds();
        let offset = (datetime - self.start).num_milliseconds();

        let pos = if offset < 0 {
            if -offset <= tolerance {
                0
            } else {
                return None;
            }
        } else {
            let (quot, rem) = (offset / step, offset % step);
            if rem <= tolerance {
                quot
            } else if step - rem <= tolerance {
                quot + 1
            } else {
                return None;
            }
        };

        let slot = pos
            .checked_mul(step)
            .and_then(|ms| self.start.checked_add_signed(Duration::milliseconds(ms)))?;
        match self.end {
            Some(end) if slot > end => None,
            _ => Some(slot),
        }
    }

    /// Every slot from the start up to and including `end`, for seeding a frozen axis.
    pub fn slots_until(&self, end: NaiveDateTime) -> impl Iterator<Item = NaiveDateTime> {
        let start = self.start;
        let step = self.step.num_milliseconds();
        let end = match self.end {
            Some(own_end) if own_end < end => own_end,
            _ => end,
        };

        let steps = if end < start {
            -1
        } else {
            (end - start).num_milliseconds() / step
        };

        (0..=steps)
            .map(move |n| {
                n.checked_mul(step)
                    .and_then(|ms| start.checked_add_signed(Duration::milliseconds(ms)))
            })
            .take_while(Option::is_some)
            .flatten()
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd(2007, 1, 1).and_hms(hour, min, 0)
    }

    #[test]
    fn test_exact_slots() {
        let grid = Interval::new(at(0, 0), Duration::hours(6)).unwrap();

        assert_eq!(grid.slot(at(0, 0)), Some(at(0, 0)));
        assert_eq!(grid.slot(at(12, 0)), Some(at(12, 0)));
        assert_eq!(grid.slot(at(12, 1)), None);
    }

    #[test]
    fn test_tolerance_on_both_sides() {
        let grid = Interval::new(at(6, 0), Duration::hours(6))
            .unwrap()
            .with_tolerance(Duration::minutes(10))
            .unwrap();

        assert_eq!(grid.slot(at(12, 10)), Some(at(12, 0)));
        assert_eq!(grid.slot(at(11, 50)), Some(at(12, 0)));
        assert_eq!(grid.slot(at(5, 55)), Some(at(6, 0)));
        assert_eq!(grid.slot(at(5, 40)), None);
        assert_eq!(grid.slot(at(12, 11)), None);
    }

    #[test]
    fn test_end_limits_slots() {
        let grid = Interval::new(at(0, 0), Duration::hours(6))
            .unwrap()
            .until(at(12, 0));

        assert_eq!(grid.slot(at(12, 0)), Some(at(12, 0)));
        assert_eq!(grid.slot(at(18, 0)), None);
        assert_eq!(grid.slots_until(at(23, 0)).count(), 3);
    }

    #[test]
    fn test_slots_until() {
        let grid = Interval::new(at(0, 0), Duration::hours(6)).unwrap();

        let slots: Vec<_> = grid.slots_until(at(18, 0)).collect();
        assert_eq!(slots, vec![at(0, 0), at(6, 0), at(12, 0), at(18, 0)]);
        assert_eq!(grid.slots_until(at(5, 0)).count(), 1);
    }

    #[test]
    fn test_slots_past_the_calendar_are_dropped() {
        let last = NaiveDateTime::MAX;
        let grid = Interval::new(last - Duration::minutes(50), Duration::hours(1))
            .unwrap()
            .with_tolerance(Duration::minutes(20))
            .unwrap();

        // The nearest slot is ten minutes past the last representable date-time.
        assert_eq!(grid.slot(last), None);
        assert_eq!(grid.slot(last - Duration::minutes(40)), Some(last - Duration::minutes(50)));

        let edge = Interval::new(last - Duration::hours(2), Duration::hours(1)).unwrap();
        assert_eq!(edge.slots_until(last).last(), Some(last));
        assert_eq!(edge.slots_until(last).count(), 3);
    }

    #[test]
    fn test_bad_parameters() {
        assert!(Interval::new(at(0, 0), Duration::zero()).is_err());
        assert!(Interval::new(at(0, 0), Duration::hours(1))
            .unwrap()
            .with_tolerance(Duration::seconds(-1))
            .is_err());
    }
}
