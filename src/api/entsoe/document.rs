//! Balancing market document parser.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use roxmltree::{Document, Node};

use crate::{
    core::{PricePoint, PriceTable, Resolution, lattice},
    ops::Interval,
    prelude::*,
};

/// Parse the document into a gap-free 15-minute table in the presentation time zone.
///
/// The document carries a single price series, so both price columns get the same values.
/// Periods without a start or without usable points are skipped, and a document without
/// any usable period produces an empty table.
#[instrument(skip_all, fields(len = xml.len()))]
pub fn parse(xml: &[u8], time_zone: Tz) -> Result<PriceTable> {
    let text = std::str::from_utf8(xml)?.trim_start_matches('\u{feff}');
    let document = Document::parse(text)?;
    let root = document.root_element();
    let scope = Scope { namespace: root.tag_name().namespace() };

    if root.tag_name().name() == "Acknowledgement_MarketDocument" {
        let reason = scope.text(root, &["Reason", "text"]).unwrap_or_default();
        warn!(reason, "the document is an acknowledgement");
    }

    let mut observations = Vec::new();
    for period in root.descendants().filter(|node| scope.is(*node, "Period")) {
        observations.extend(scope.parse_period(period));
    }
    debug!(n_observations = observations.len(), "parsed");

    let points = lattice::regrid(observations)
        .into_iter()
        .map(|(timestamp, price)| {
            PricePoint::from_single(timestamp.with_timezone(&time_zone), price)
        })
        .collect();
    PriceTable::try_new(points)
}

/// Element lookups qualified with the namespace of the root element.
struct Scope<'a> {
    namespace: Option<&'a str>,
}

impl Scope<'_> {
    fn is(&self, node: Node<'_, '_>, name: &str) -> bool {
        node.is_element()
            && (node.tag_name().name() == name)
            && (node.tag_name().namespace() == self.namespace)
    }

    fn child<'d, 'i>(&self, node: Node<'d, 'i>, name: &str) -> Option<Node<'d, 'i>> {
        node.children().find(|child| self.is(*child, name))
    }

    /// Trimmed non-empty text of the descendant at the path.
    fn text<'d>(&self, node: Node<'d, '_>, path: &[&str]) -> Option<&'d str> {
        path.iter()
            .try_fold(node, |node, name| self.child(node, name))?
            .text()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Observations of the period, each along with the interval it prices.
    fn parse_period(&self, period: Node<'_, '_>) -> Vec<(Interval, f64)> {
        let Some(start) = self.text(period, &["timeInterval", "start"]) else {
            debug!("skipped a period without start");
            return Vec::new();
        };
        let Some(start) = parse_timestamp(start) else {
            warn!(start, "skipped a period with unparseable start");
            return Vec::new();
        };
        let step = self
            .text(period, &["resolution"])
            .map_or_else(Resolution::default, Resolution::from_iso8601)
            .step();

        let mut timestamp = start;
        let mut observations = Vec::new();
        for point in period.children().filter(|node| self.is(*node, "Point")) {
            let Some(value) = self
                .text(point, &["imbalance_Price.amount"])
                .or_else(|| self.text(point, &["price.amount"]))
            else {
                continue;
            };
            match value.parse::<f64>() {
                Ok(value) => {
                    observations.push((Interval::new(timestamp, timestamp + step), value));
                    timestamp += step;
                }
                Err(error) => {
                    warn!(value, %error, "skipped a point with unparseable price");
                }
            }
        }
        if observations.is_empty() {
            debug!(%start, "skipped a period without points");
        }
        observations
    }
}

/// Parse the start literal, treating one without an offset as UTC.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    const NAIVE_FORMATS: [&str; 3] =
        ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M:%S%:z"];

    let parse_naive = |text: &str| {
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|timestamp| timestamp.and_utc())
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Utc));
    }
    if let Some(text) = text.strip_suffix('Z') {
        return parse_naive(text);
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(text, format).ok())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .or_else(|| parse_naive(text))
}
