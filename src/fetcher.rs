use chrono::TimeDelta;
use chrono_tz::Tz;

use crate::{
    api::entsoe::{IMBALANCE_PRICES, Query, Transport, document},
    core::{Localize, PriceTable},
    ops::Interval,
    prelude::*,
};

pub const DEFAULT_CHUNK_WIDTH: TimeDelta = TimeDelta::hours(36);

/// Retrieves imbalance prices in bounded chunks and merges them into one table.
///
/// The upstream API rejects overly long periods, so the window is split into chunks which
/// are requested one after another. Any failed request fails the whole retrieval.
#[derive(bon::Builder)]
pub struct Fetcher<'a, T> {
    transport: &'a T,

    security_token: &'a str,

    control_area_domain: &'a str,

    /// Presentation zone, also used to localize naive bounds.
    time_zone: Tz,

    #[builder(default = DEFAULT_CHUNK_WIDTH)]
    chunk_width: TimeDelta,
}

impl<T: Transport> Fetcher<'_, T> {
    #[instrument(skip_all, fields(control_area_domain = self.control_area_domain))]
    pub fn fetch(&self, start: impl Localize, end: impl Localize) -> Result<PriceTable> {
        let window =
            Interval::try_new(start.localize(self.time_zone)?, end.localize(self.time_zone)?)?
                .to_utc();
        info!(?window, chunk_width = %self.chunk_width, "fetching…");

        let mut tables = Vec::new();
        for period in window.chunks(self.chunk_width)? {
            let query = Query {
                security_token: self.security_token,
                document_type: IMBALANCE_PRICES,
                control_area_domain: self.control_area_domain,
                period,
            };
            let documents = self.transport.get(&query)?.into_documents()?;
            for xml in documents {
                let table = document::parse(&xml, self.time_zone)?;
                debug!(?period, n_rows = table.len(), "parsed a chunk");
                tables.push(table);
            }
        }

        let table = PriceTable::merge(tables);
        info!(n_rows = table.len(), "fetched");
        Ok(table)
    }
}
