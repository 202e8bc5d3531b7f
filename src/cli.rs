use std::{path::PathBuf, time::Duration};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, ParseError, TimeDelta};
use clap::{Parser, Subcommand};
use imbalance_prices::{Area, core::Localize, expected_length, prelude::Result as LibResult};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the imbalance prices and print them.
    #[clap(name = "fetch")]
    Fetch(Box<FetchArgs>),

    /// Print the previously stored prices.
    #[clap(name = "show")]
    Show(ShowArgs),
}

#[derive(Parser)]
pub struct FetchArgs {
    /// ENTSO-E Transparency Platform security token.
    ///
    /// Without it, the direct API is skipped altogether.
    #[clap(long = "entsoe-api-key", env = "ENTSOE_API_KEY", hide_env_values = true)]
    pub security_token: Option<String>,

    #[clap(long, env = "AREA", default_value = "NL")]
    pub area: Area,

    /// Local wall-clock start of the window, inclusive. For example: `2025-01-01T00:00`.
    #[clap(long, value_parser = parse_local_time)]
    pub start: NaiveDateTime,

    /// Local wall-clock end of the window, exclusive.
    #[clap(long, value_parser = parse_local_time)]
    pub end: NaiveDateTime,

    /// Maximum width of a single request.
    #[clap(
        long = "chunk-hours",
        env = "CHUNK_HOURS",
        default_value = "36",
        value_parser = clap::value_parser!(u16).range(1..),
    )]
    pub chunk_hours: u16,

    #[clap(long = "timeout-secs", env = "TIMEOUT_SECS", default_value = "60")]
    pub timeout_secs: u64,

    /// Store the fetched prices in the cache file.
    #[clap(long)]
    pub persist: bool,

    #[clap(flatten)]
    pub cache: CacheArgs,

    /// Print JSON instead of the table.
    #[clap(long)]
    pub json: bool,
}

impl FetchArgs {
    pub fn chunk_width(&self) -> TimeDelta {
        TimeDelta::hours(self.chunk_hours.into())
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Number of quarters in the window, counted on the bounds localized in the area.
    pub fn n_expected_rows(&self) -> LibResult<usize> {
        let time_zone = self.area.time_zone();
        Ok(expected_length(self.start.localize(time_zone)?, self.end.localize(time_zone)?))
    }
}

#[derive(Parser)]
pub struct ShowArgs {
    #[clap(flatten)]
    pub cache: CacheArgs,

    #[clap(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct CacheArgs {
    #[clap(long = "cache-path", env = "CACHE_PATH", default_value = "imbalance_prices.toml")]
    pub path: PathBuf,
}

/// Accept a wall-clock timestamp with or without seconds, or a bare date meaning its midnight.
fn parse_local_time(value: &str) -> Result<NaiveDateTime, ParseError> {
    let parsed = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok());
    match parsed {
        Some(timestamp) => Ok(timestamp),
        None => Ok(NaiveDate::parse_from_str(value, "%Y-%m-%d")?.and_time(NaiveTime::MIN)),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_local_time() {
        let midnight = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(parse_local_time("2025-01-01").unwrap(), midnight);
        assert_eq!(parse_local_time("2025-01-01T00:00").unwrap(), midnight);
        assert_eq!(parse_local_time("2025-01-01 00:00:00").unwrap(), midnight);
        assert!(parse_local_time("tomorrow").is_err());
    }

    #[test]
    fn test_fetch_defaults() {
        let args = Args::try_parse_from([
            "imbalance-prices",
            "fetch",
            "--entsoe-api-key=token",
            "--start=2025-01-01",
            "--end=2025-01-02",
        ])
        .unwrap();
        let Command::Fetch(args) = args.command else { panic!("expected `fetch`") };
        assert_eq!(args.area, Area::Nl);
        assert_eq!(args.chunk_width(), TimeDelta::hours(36));
        assert_eq!(args.timeout(), Duration::from_secs(60));
        assert_eq!(args.cache.path, PathBuf::from("imbalance_prices.toml"));
        assert!(!args.persist);
    }

    #[test]
    fn test_n_expected_rows_on_dst_days() -> LibResult {
        for (start, end, n_expected_rows) in
            [("2025-03-30", "2025-03-31", 92), ("2025-10-26", "2025-10-27", 100)]
        {
            let start = format!("--start={start}");
            let end = format!("--end={end}");
            let args =
                Args::try_parse_from(["imbalance-prices", "fetch", start.as_str(), end.as_str()])
                    .unwrap();
            let Command::Fetch(args) = args.command else { panic!("expected `fetch`") };
            assert_eq!(args.n_expected_rows()?, n_expected_rows);
        }
        Ok(())
    }

    #[test]
    fn test_zero_chunk_hours_is_refused() {
        let result = Args::try_parse_from([
            "imbalance-prices",
            "fetch",
            "--start=2025-01-01",
            "--end=2025-01-02",
            "--chunk-hours=0",
        ]);
        assert!(result.is_err());
    }
}
