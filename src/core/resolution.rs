use chrono::TimeDelta;

/// Declared spacing of the points within a period.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Resolution {
    #[default]
    Quarterly,

    Hourly,
}

impl Resolution {
    /// Parse the ISO 8601 duration, falling back to quarterly for anything unrecognized.
    #[must_use]
    pub fn from_iso8601(text: &str) -> Self {
        match text.trim() {
            "PT60M" => Self::Hourly,
            _ => Self::Quarterly,
        }
    }

    #[must_use]
    pub const fn step(self) -> TimeDelta {
        match self {
            Self::Quarterly => TimeDelta::minutes(15),
            Self::Hourly => TimeDelta::minutes(60),
        }
    }
}
