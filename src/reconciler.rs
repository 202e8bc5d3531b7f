use chrono::{NaiveDateTime, TimeDelta};
use chrono_tz::Tz;

use crate::{
    api::entsoe::Transport,
    core::{
        Area,
        Frame,
        Localize,
        PriceTable,
        table::{CHARGE_PRICE, DISCHARGE_PRICE},
    },
    fetcher::{DEFAULT_CHUNK_WIDTH, Fetcher},
    ops::Interval,
    prelude::*,
};

/// Column names used by the fallback client for the two imbalance directions.
pub const SHORT: &str = "Short";
pub const LONG: &str = "Long";

/// Secondary source of the imbalance prices.
pub trait FallbackClient {
    fn query_imbalance_prices(
        &self,
        area: Area,
        interval: Interval<Tz>,
    ) -> anyhow::Result<Frame>;
}

/// Receives validated tables for later reuse.
pub trait PriceStore {
    fn store(&self, table: &PriceTable) -> anyhow::Result<()>;
}

/// Result of the primary retrieval.
#[must_use]
pub enum Outcome {
    Data(PriceTable),
    Empty,
    Failed(Error),
}

impl From<Result<PriceTable>> for Outcome {
    fn from(result: Result<PriceTable>) -> Self {
        match result {
            Ok(table) if table.is_empty() => Self::Empty,
            Ok(table) => Self::Data(table),
            Err(error) => Self::Failed(error),
        }
    }
}

/// Prefers the direct API and falls back to the secondary client when it yields nothing.
#[derive(bon::Builder)]
pub struct Reconciler<T> {
    transport: T,

    /// Without the token, the direct API is not queried at all.
    security_token: Option<String>,

    #[builder(default = DEFAULT_CHUNK_WIDTH)]
    chunk_width: TimeDelta,

    store: Option<Box<dyn PriceStore + Send + Sync>>,
}

impl<T: Transport> Reconciler<T> {
    /// Retrieve the validated price table for the `[start, end)` wall-clock window of the area.
    #[instrument(skip_all, fields(area = ?area, start = %start, end = %end))]
    pub fn fetch(
        &self,
        area: Area,
        start: NaiveDateTime,
        end: NaiveDateTime,
        fallback: Option<&dyn FallbackClient>,
        persist: bool,
    ) -> Result<PriceTable> {
        let time_zone = area.time_zone();
        let window = Interval::try_new(start.localize(time_zone)?, end.localize(time_zone)?)?;

        let table = match self.fetch_primary(area, window) {
            Outcome::Data(table) => table,
            Outcome::Empty => Self::fetch_fallback(fallback, area, window)?,
            Outcome::Failed(error) => return Err(error),
        };
        table.validate()?;

        if persist {
            self.persist(&table);
        }
        Ok(table)
    }

    fn fetch_primary(&self, area: Area, window: Interval<Tz>) -> Outcome {
        let Some(security_token) = &self.security_token else {
            info!("no security token, skipping the direct API");
            return Outcome::Empty;
        };
        Fetcher::builder()
            .transport(&self.transport)
            .security_token(security_token)
            .control_area_domain(area.code())
            .time_zone(window.start.timezone())
            .chunk_width(self.chunk_width)
            .build()
            .fetch(window.start, window.end)
            .into()
    }

    fn fetch_fallback(
        fallback: Option<&dyn FallbackClient>,
        area: Area,
        window: Interval<Tz>,
    ) -> Result<PriceTable> {
        let Some(fallback) = fallback else {
            return Err(Error::Connectivity("no fallback client provided"));
        };
        warn!("the direct API yielded nothing, falling back…");
        let frame = fallback.query_imbalance_prices(area, window).map_err(Error::Fallback)?;
        if frame.is_empty() {
            warn!("the fallback yielded nothing either");
        } else {
            info!(n_rows = frame.index.len(), "fetched from the fallback");
        }
        PriceTable::try_from(frame.rename(&[(SHORT, CHARGE_PRICE), (LONG, DISCHARGE_PRICE)]))
    }

    fn persist(&self, table: &PriceTable) {
        let Some(store) = &self.store else {
            warn!("persisting is requested, but there is no store");
            return;
        };
        match store.store(table) {
            Ok(()) => info!(n_rows = table.len(), "stored"),
            Err(error) => error!("failed to store the prices: {error:#}"),
        }
    }
}
