use chrono::NaiveDateTime;
use chrono_tz::Tz;
use http::StatusCode;

/// Failure of a single price retrieval, tagged by the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("the transport responded with `{status}` for {period}: {excerpt}")]
    Status { status: StatusCode, period: String, excerpt: String },

    #[error("failed to call the transport")]
    Request(#[from] ureq::Error),

    #[error("failed to unpack the archive")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O failed")]
    Io(#[from] std::io::Error),

    #[error("failed to parse the document: {0}")]
    Document(String),

    #[error("connectivity error: {0}")]
    Connectivity(&'static str),

    #[error("the fallback client failed: {0:#}")]
    Fallback(anyhow::Error),

    #[error("the price table failed validation: {0}")]
    Validation(String),

    #[error("`{0}` does not exist in `{1}`")]
    NonExistentLocalTime(NaiveDateTime, Tz),

    #[error("unknown time zone `{0}`")]
    UnknownTimeZone(String),

    #[error("failed to read the cache")]
    CacheRead(#[from] toml::de::Error),

    #[error("failed to write the cache")]
    CacheWrite(#[from] toml::ser::Error),
}

impl From<roxmltree::Error> for Error {
    fn from(error: roxmltree::Error) -> Self {
        Self::Document(error.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(error: std::str::Utf8Error) -> Self {
        Self::Document(error.to_string())
    }
}
