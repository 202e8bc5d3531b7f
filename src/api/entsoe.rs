//! [ENTSO-E Transparency Platform](https://transparency.entsoe.eu) RESTful API.

pub mod document;
mod payload;

use std::time::Duration;

use chrono::{DateTime, Utc};
use http::header::CONTENT_TYPE;
use ureq::Agent;

pub use self::payload::Payload;
use crate::{ops::Interval, prelude::*};

pub const BASE_URL: &str = "https://web-api.tp.entsoe.eu/api";

/// Imbalance prices, also known as A85.
pub const IMBALANCE_PRICES: &str = "A85";

/// Responses beyond this size are refused.
const MAX_BODY_SIZE: u64 = 64 * 1024 * 1024;

/// Keep only this much of a failed response in the error.
const MAX_EXCERPT_LEN: usize = 512;

/// Retrieves one document payload per query.
pub trait Transport {
    fn get(&self, query: &Query<'_>) -> Result<Payload>;
}

/// Parameters of a single document request.
#[derive(Copy, Clone)]
pub struct Query<'a> {
    pub security_token: &'a str,
    pub document_type: &'static str,
    pub control_area_domain: &'a str,
    pub period: Interval,
}

impl Query<'_> {
    #[must_use]
    pub fn period_start(&self) -> String {
        format_timestamp(self.period.start)
    }

    #[must_use]
    pub fn period_end(&self) -> String {
        format_timestamp(self.period.end)
    }

    #[must_use]
    pub fn pairs(&self) -> [(&'static str, String); 5] {
        [
            ("securityToken", self.security_token.to_string()),
            ("documentType", self.document_type.to_string()),
            ("controlArea_Domain", self.control_area_domain.to_string()),
            ("periodStart", self.period_start()),
            ("periodEnd", self.period_end()),
        ]
    }
}

/// Format the timestamp as the API wants it: `yyyyMMddHHmm` in UTC.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y%m%d%H%M").to_string()
}

/// Blocking HTTP transport.
pub struct Api {
    client: Agent,
    base_url: String,
}

impl Api {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { client, base_url: base_url.into() }
    }
}

impl Transport for Api {
    #[instrument(
        skip_all,
        fields(period_start = %query.period_start(), period_end = %query.period_end()),
    )]
    fn get(&self, query: &Query<'_>) -> Result<Payload> {
        debug!("requesting…");
        let mut response = query
            .pairs()
            .into_iter()
            .fold(self.client.get(self.base_url.as_str()), |request, (key, value)| {
                request.query(key, value)
            })
            .call()?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response.body_mut().with_config().limit(MAX_BODY_SIZE).read_to_vec()?;

        if !status.is_success() {
            let excerpt: String =
                String::from_utf8_lossy(&body).chars().take(MAX_EXCERPT_LEN).collect();
            return Err(Error::Status {
                status,
                period: format!("{:?}", query.period),
                excerpt,
            });
        }

        debug!(?content_type, len = body.len(), "received");
        Ok(Payload { content_type, body })
    }
}
