use std::ops::Sub;

use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use itertools::Itertools;
use serde::Serialize;

use crate::prelude::*;

pub const CHARGE_PRICE: &str = "charge_price";
pub const DISCHARGE_PRICE: &str = "discharge_price";

/// Prices of a single 15-minute interval, identified by its start.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Tz>,

    /// Missing when the source did not cover the interval.
    pub charge_price: Option<f64>,

    pub discharge_price: Option<f64>,
}

impl PricePoint {
    /// Both directions priced from the single series.
    #[must_use]
    pub const fn from_single(timestamp: DateTime<Tz>, price: Option<f64>) -> Self {
        Self { timestamp, charge_price: price, discharge_price: price }
    }
}

/// Chronologically ordered price points with unique timestamps.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, derive_more::Deref, derive_more::IntoIterator)]
pub struct PriceTable(#[into_iterator(owned, ref)] Vec<PricePoint>);

impl PriceTable {
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Wrap the points, requiring them to be strictly ordered by timestamp.
    pub fn try_new(points: Vec<PricePoint>) -> Result<Self> {
        let this = Self(points);
        this.validate()?;
        Ok(this)
    }

    /// Concatenate the tables, order the points, and keep the last occurrence of each timestamp.
    ///
    /// Order among equal timestamps follows the concatenation order,
    /// so later tables override earlier ones.
    pub fn merge(tables: impl IntoIterator<Item = Self>) -> Self {
        let mut points = tables.into_iter().flatten().collect_vec();
        points.sort_by_key(|point| point.timestamp);

        let mut merged: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match merged.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => merged.push(point),
            }
        }
        Self(merged)
    }

    /// Check the schema: the index must be sorted and free of duplicates.
    pub fn validate(&self) -> Result {
        if let Some((index, (lhs, rhs))) = self
            .0
            .iter()
            .tuple_windows()
            .find_position(|(lhs, rhs)| lhs.timestamp >= rhs.timestamp)
        {
            return Err(Error::Validation(format!(
                "timestamps are not strictly increasing at row {}: `{}` followed by `{}`",
                index + 1,
                lhs.timestamp,
                rhs.timestamp,
            )));
        }
        Ok(())
    }
}

/// Number of 15-minute intervals in `[start, end)`.
///
/// Partial intervals are not counted, reversed windows yield zero.
#[must_use]
pub fn expected_length<T>(start: T, end: T) -> usize
where
    T: Sub<Output = TimeDelta>,
{
    usize::try_from((end - start).num_seconds() / 900).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Europe;

    use super::*;

    fn at(minutes: i64) -> DateTime<Tz> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap().with_timezone(&Europe::Amsterdam)
            + TimeDelta::minutes(minutes)
    }

    fn table(points: &[(i64, f64)]) -> PriceTable {
        PriceTable(
            points
                .iter()
                .map(|(minutes, price)| PricePoint::from_single(at(*minutes), Some(*price)))
                .collect(),
        )
    }

    #[test]
    fn test_merge_keeps_last() {
        let merged = PriceTable::merge([
            table(&[(0, 1.0), (15, 2.0), (30, 3.0)]),
            table(&[(30, 30.0), (45, 40.0)]),
        ]);
        assert_eq!(merged, table(&[(0, 1.0), (15, 2.0), (30, 30.0), (45, 40.0)]));
    }

    #[test]
    fn test_merge_sorts_out_of_order_tables() {
        let merged =
            PriceTable::merge([table(&[(30, 30.0), (45, 40.0)]), table(&[(0, 1.0), (30, 3.0)])]);
        assert_eq!(merged, table(&[(0, 1.0), (30, 3.0), (45, 40.0)]));
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn test_merge_empty() {
        assert!(PriceTable::merge([PriceTable::empty(), PriceTable::empty()]).is_empty());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let result = PriceTable::try_new(table(&[(0, 1.0), (0, 2.0)]).0);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_unsorted() {
        assert!(table(&[(15, 1.0), (0, 2.0)]).validate().is_err());
    }

    #[test]
    fn test_expected_length() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(expected_length(start, start + TimeDelta::seconds(3600)), 4);
        assert_eq!(expected_length(start, start), 0);
        assert_eq!(expected_length(start, start + TimeDelta::minutes(29)), 1);
        assert_eq!(expected_length(start + TimeDelta::hours(1), start), 0);
    }

    #[test]
    fn test_expected_length_across_dst() {
        // The spring-forward day is only 23 hours long.
        let start = Europe::Amsterdam.with_ymd_and_hms(2025, 3, 30, 0, 0, 0).unwrap();
        let end = Europe::Amsterdam.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap();
        assert_eq!(expected_length(start, end), 92);
    }
}
