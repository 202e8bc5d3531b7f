use std::collections::BTreeMap;

use chrono::DateTime;
use chrono_tz::Tz;
use itertools::{Itertools, izip};

use crate::{
    core::table::{CHARGE_PRICE, DISCHARGE_PRICE, PricePoint, PriceTable},
    prelude::*,
};

/// Loosely-typed table of named price columns over a time index.
///
/// This is the shape produced by third-party clients, before it is checked against
/// the [`PriceTable`] schema.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, bon::Builder)]
pub struct Frame {
    #[builder(default)]
    pub index: Vec<DateTime<Tz>>,

    #[builder(default)]
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl Frame {
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.columns.insert(name.into(), values);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Rename the columns according to the `(from, to)` pairs, leaving unmatched ones intact.
    pub fn rename(mut self, mapping: &[(&str, &str)]) -> Self {
        for (from, to) in mapping {
            if let Some(values) = self.columns.remove(*from) {
                self.columns.insert((*to).to_string(), values);
            }
        }
        self
    }

    fn take_column(&mut self, name: &str) -> Result<Vec<Option<f64>>> {
        let values = self.columns.remove(name).ok_or_else(|| {
            Error::Validation(format!(
                "missing column `{name}`, available: [{}]",
                self.columns.keys().join(", ")
            ))
        })?;
        if values.len() != self.index.len() {
            return Err(Error::Validation(format!(
                "column `{name}` has {} values for {} timestamps",
                values.len(),
                self.index.len(),
            )));
        }
        Ok(values)
    }
}

impl TryFrom<Frame> for PriceTable {
    type Error = Error;

    /// Pick the price columns, ignoring any other ones, and validate the result.
    fn try_from(mut frame: Frame) -> Result<Self> {
        let charge_prices = frame.take_column(CHARGE_PRICE)?;
        let discharge_prices = frame.take_column(DISCHARGE_PRICE)?;
        let points = izip!(frame.index, charge_prices, discharge_prices)
            .map(|(timestamp, charge_price, discharge_price)| PricePoint {
                timestamp,
                charge_price,
                discharge_price,
            })
            .collect();
        Self::try_new(points)
    }
}
