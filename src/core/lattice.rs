use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::ops::Interval;

pub const STEP: TimeDelta = TimeDelta::minutes(15);

/// Re-index the observations onto a uniform 15-minute UTC lattice.
///
/// Each observation is keyed by the start of the interval it prices. The lattice starts at
/// the earliest start and ends, exclusively, at the latest interval end. So an hourly
/// observation keeps its trailing quarters, while quarter-hourly ones end at `max + 15 min`.
/// Lattice slots without an observation hold [`None`], observations off the lattice are
/// dropped. Among duplicate starts the later observation wins.
pub fn regrid<I>(observations: I) -> Vec<(DateTime<Utc>, Option<f64>)>
where
    I: IntoIterator<Item = (Interval, f64)>,
{
    let mut by_timestamp = BTreeMap::new();
    let mut end = None;
    for (interval, value) in observations {
        by_timestamp.insert(interval.start, value);
        end = end.max(Some(interval.end));
    }
    let (Some((&first, _)), Some(end)) = (by_timestamp.first_key_value(), end) else {
        return Vec::new();
    };
    std::iter::successors(Some(first), |timestamp| Some(*timestamp + STEP))
        .take_while(|timestamp| *timestamp < end)
        .map(|timestamp| (timestamp, by_timestamp.get(&timestamp).copied()))
        .collect()
}
