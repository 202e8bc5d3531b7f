use std::{
    fmt::{Debug, Display, Formatter},
    ops::{Add, Sub},
};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::prelude::*;

pub type Interval<Tz = Utc> = RangeExclusive<DateTime<Tz>>;

#[must_use]
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct RangeExclusive<T: Copy> {
    /// Inclusive.
    pub start: T,

    /// Exclusive.
    pub end: T,
}

impl<T: Copy + Debug> Debug for RangeExclusive<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl<T: Copy> RangeExclusive<T> {
    pub const fn new(start: T, end: T) -> Self {
        Self { start, end }
    }
}

impl<T: Copy + Sub> RangeExclusive<T> {
    #[must_use]
    pub fn len(self) -> <T as Sub>::Output {
        self.end - self.start
    }
}

impl<T: Copy + PartialOrd> RangeExclusive<T> {
    #[must_use]
    pub fn contains(self, other: T) -> bool {
        (self.start <= other) && (other < self.end)
    }
}

impl<T: Copy + PartialOrd + Display> RangeExclusive<T> {
    /// Build the range, refusing the end before the start.
    pub fn try_new(start: T, end: T) -> Result<Self> {
        if end < start {
            return Err(Error::Validation(format!("`{end}` precedes `{start}`")));
        }
        Ok(Self::new(start, end))
    }
}

impl<T> RangeExclusive<T>
where
    T: Copy + PartialOrd + Add<TimeDelta, Output = T>,
{
    /// Split the range into consecutive left-closed, right-open chunks of the given width.
    ///
    /// The last chunk is clipped to the range end. A range narrower than one chunk
    /// produces itself as the only chunk, and an empty range produces nothing.
    pub fn chunks(self, width: TimeDelta) -> Result<impl Iterator<Item = Self>> {
        if width <= TimeDelta::zero() {
            return Err(Error::Validation(format!("chunk width must be positive, got `{width}`")));
        }
        let mut next_start = self.start;
        Ok(std::iter::from_fn(move || {
            if next_start >= self.end {
                return None;
            }
            let start = next_start;
            let end = start + width;
            let end = if end < self.end { end } else { self.end };
            next_start = end;
            Some(Self { start, end })
        }))
    }
}

impl<Tz: TimeZone> Interval<Tz>
where
    DateTime<Tz>: Copy,
{
    pub fn to_utc(self) -> Interval {
        Interval::<Utc>::new(self.start.with_timezone(&Utc), self.end.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use itertools::Itertools;

    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap().and_hms_opt(hour, 0, 0).unwrap().and_utc()
    }

    #[test]
    fn test_chunks_clips_the_last_chunk() -> Result {
        let chunks = Interval::new(at(1, 0), at(3, 0)).chunks(TimeDelta::hours(36))?.collect_vec();
        assert_eq!(
            chunks,
            [Interval::new(at(1, 0), at(2, 12)), Interval::new(at(2, 12), at(3, 0))],
        );
        Ok(())
    }

    #[test]
    fn test_chunks_aligned() -> Result {
        let chunks = Interval::new(at(1, 0), at(4, 0)).chunks(TimeDelta::hours(36))?.collect_vec();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].end, at(4, 0));
        Ok(())
    }

    #[test]
    fn test_chunks_narrow_window() -> Result {
        let interval = Interval::new(at(1, 0), at(1, 5));
        let chunks = interval.chunks(TimeDelta::hours(36))?.collect_vec();
        assert_eq!(chunks, [interval]);
        Ok(())
    }

    #[test]
    fn test_chunks_empty_window() -> Result {
        assert_eq!(Interval::new(at(1, 5), at(1, 5)).chunks(TimeDelta::hours(36))?.count(), 0);
        Ok(())
    }

    #[test]
    fn test_chunks_non_positive_width() {
        let interval = Interval::new(at(1, 0), at(2, 12));
        assert!(matches!(interval.chunks(TimeDelta::zero()), Err(Error::Validation(_))));
        assert!(matches!(interval.chunks(TimeDelta::hours(-1)), Err(Error::Validation(_))));
    }

    #[test]
    fn test_try_new() {
        assert!(Interval::try_new(at(1, 0), at(1, 0)).is_ok());
        assert!(Interval::try_new(at(1, 0), at(1, 5)).is_ok());
        assert!(matches!(Interval::try_new(at(1, 5), at(1, 0)), Err(Error::Validation(_))));
    }

    #[test]
    fn test_to_utc() {
        let zone = chrono_tz::Europe::Amsterdam;
        let interval = Interval::new(at(1, 0).with_timezone(&zone), at(1, 5).with_timezone(&zone));
        assert_eq!(interval.to_utc(), Interval::new(at(1, 0), at(1, 5)));
    }

    #[test]
    fn test_contains() {
        let interval = Interval::new(at(1, 0), at(1, 5));
        assert!(interval.contains(at(1, 0)));
        assert!(interval.contains(at(1, 4)));
        assert!(!interval.contains(at(1, 5)));
        assert_eq!(interval.len(), TimeDelta::hours(5));
    }
}
