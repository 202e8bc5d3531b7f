use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{
    core::{PricePoint, PriceTable},
    prelude::*,
    reconciler::PriceStore,
};

/// Price table as it is written to disk.
#[derive(Serialize, Deserialize)]
pub struct Cache {
    pub time_zone: String,

    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Serialize, Deserialize)]
pub struct Row {
    pub timestamp: DateTime<FixedOffset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_price: Option<f64>,
}

impl Cache {
    pub fn new(table: &PriceTable) -> Self {
        let time_zone = table.first().map_or(Tz::UTC, |point| point.timestamp.timezone());
        let rows = table
            .iter()
            .map(|point| Row {
                timestamp: point.timestamp.fixed_offset(),
                charge_price: point.charge_price,
                discharge_price: point.discharge_price,
            })
            .collect();
        Self { time_zone: time_zone.name().to_string(), rows }
    }

    #[instrument(name = "reading the cache…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        Ok(toml::from_slice(&fs::read(path)?)?)
    }

    #[instrument(skip(self), name = "writing the cache…")]
    pub fn write_to<P: AsRef<Path> + Debug>(&self, path: P) -> Result {
        fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }

    /// Restore the table in its stored time zone.
    pub fn into_table(self) -> Result<PriceTable> {
        let time_zone =
            Tz::from_str(&self.time_zone).map_err(|_| Error::UnknownTimeZone(self.time_zone))?;
        let points = self
            .rows
            .into_iter()
            .map(|row| PricePoint {
                timestamp: row.timestamp.with_timezone(&time_zone),
                charge_price: row.charge_price,
                discharge_price: row.discharge_price,
            })
            .collect();
        PriceTable::try_new(points)
    }
}

/// Keeps the latest stored table in a TOML file.
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<PriceTable> {
        Cache::read_from(&self.path)?.into_table()
    }
}

impl PriceStore for CacheFile {
    fn store(&self, table: &PriceTable) -> anyhow::Result<()> {
        Cache::new(table).write_to(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Europe;

    use super::*;

    #[test]
    fn test_store_and_load() -> anyhow::Result<()> {
        // Crosses the autumn transition, so the offsets differ between the rows.
        let start = Europe::Amsterdam.with_ymd_and_hms(2025, 10, 26, 1, 30, 0).unwrap();
        let prices = [Some(100.0), Some(101.5), None, Some(-3.25), Some(0.0), Some(7.0)];
        let table = PriceTable::try_new(
            (0..)
                .zip(prices)
                .map(|(i, charge_price)| PricePoint {
                    timestamp: start + TimeDelta::minutes(30 * i),
                    charge_price,
                    discharge_price: Some(-1.5),
                })
                .collect(),
        )?;

        let path = std::env::temp_dir().join(format!("imbalance-prices-{}.toml", std::process::id()));
        let cache_file = CacheFile::new(&path);
        cache_file.store(&table)?;
        let loaded = cache_file.load();
        fs::remove_file(&path)?;

        let loaded = loaded?;
        assert_eq!(loaded, table);
        assert_eq!(loaded[0].timestamp.timezone(), Europe::Amsterdam);
        Ok(())
    }

    #[test]
    fn test_unknown_time_zone() {
        let cache = Cache { time_zone: "Mars/Olympus_Mons".to_string(), rows: Vec::new() };
        assert!(matches!(cache.into_table(), Err(Error::UnknownTimeZone(_))));
    }

    #[test]
    fn test_empty_table_round_trips() -> Result {
        let cache = Cache::new(&PriceTable::empty());
        assert_eq!(cache.time_zone, "UTC");
        assert!(cache.into_table()?.is_empty());
        Ok(())
    }
}
