use chrono::{DateTime, MappedLocalTime, NaiveDateTime, TimeZone};
use chrono_tz::{Europe, Tz};

use crate::prelude::*;

/// Control area for which the imbalance prices are settled.
#[derive(
    Copy, Clone, Debug, Hash, Eq, PartialEq, clap::ValueEnum, serde::Serialize, serde::Deserialize,
)]
pub enum Area {
    /// Netherlands, TenneT NL.
    #[serde(rename = "NL")]
    #[value(name = "NL")]
    Nl,

    /// Belgium, Elia.
    #[serde(rename = "BE")]
    #[value(name = "BE")]
    Be,

    /// France, RTE.
    #[serde(rename = "FR")]
    #[value(name = "FR")]
    Fr,

    /// Austria, APG.
    #[serde(rename = "AT")]
    #[value(name = "AT")]
    At,

    /// Switzerland, Swissgrid.
    #[serde(rename = "CH")]
    #[value(name = "CH")]
    Ch,

    /// Czech Republic, CEPS.
    #[serde(rename = "CZ")]
    #[value(name = "CZ")]
    Cz,

    /// Poland, PSE.
    #[serde(rename = "PL")]
    #[value(name = "PL")]
    Pl,

    /// Spain, REE.
    #[serde(rename = "ES")]
    #[value(name = "ES")]
    Es,

    /// Portugal, REN.
    #[serde(rename = "PT")]
    #[value(name = "PT")]
    Pt,

    /// Western Denmark, Energinet.
    #[serde(rename = "DK_1")]
    #[value(name = "DK_1")]
    Dk1,

    /// Eastern Denmark, Energinet.
    #[serde(rename = "DK_2")]
    #[value(name = "DK_2")]
    Dk2,

    /// Germany, 50Hertz.
    #[serde(rename = "DE_50HZ")]
    #[value(name = "DE_50HZ")]
    De50Hertz,

    /// Germany, Amprion.
    #[serde(rename = "DE_AMPRION")]
    #[value(name = "DE_AMPRION")]
    DeAmprion,

    /// Germany, TenneT DE.
    #[serde(rename = "DE_TENNET")]
    #[value(name = "DE_TENNET")]
    DeTennet,

    /// Germany, TransnetBW.
    #[serde(rename = "DE_TRANSNET")]
    #[value(name = "DE_TRANSNET")]
    DeTransnet,
}

impl Area {
    /// EIC code of the control area domain.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Nl => "10YNL----------L",
            Self::Be => "10YBE----------2",
            Self::Fr => "10YFR-RTE------C",
            Self::At => "10YAT-APG------L",
            Self::Ch => "10YCH-SWISSGRIDZ",
            Self::Cz => "10YCZ-CEPS-----N",
            Self::Pl => "10YPL-AREA-----S",
            Self::Es => "10YES-REE------0",
            Self::Pt => "10YPT-REN------W",
            Self::Dk1 => "10YDK-1--------W",
            Self::Dk2 => "10YDK-2--------M",
            Self::De50Hertz => "10YDE-VE-------2",
            Self::DeAmprion => "10YDE-RWENET---I",
            Self::DeTennet => "10YDE-EON------1",
            Self::DeTransnet => "10YDE-ENBW-----N",
        }
    }

    #[must_use]
    pub const fn time_zone(self) -> Tz {
        match self {
            Self::Nl => Europe::Amsterdam,
            Self::Be => Europe::Brussels,
            Self::Fr => Europe::Paris,
            Self::At => Europe::Vienna,
            Self::Ch => Europe::Zurich,
            Self::Cz => Europe::Prague,
            Self::Pl => Europe::Warsaw,
            Self::Es => Europe::Madrid,
            Self::Pt => Europe::Lisbon,
            Self::Dk1 | Self::Dk2 => Europe::Copenhagen,
            Self::De50Hertz | Self::DeAmprion | Self::DeTennet | Self::DeTransnet => {
                Europe::Berlin
            }
        }
    }
}

/// Something that can be pinned to an instant in the given time zone.
pub trait Localize {
    fn localize(self, time_zone: Tz) -> Result<DateTime<Tz>>;
}

impl Localize for NaiveDateTime {
    /// Interpret the wall-clock time in the zone.
    ///
    /// Ambiguous times resolve to the earliest instant, times skipped by a DST jump fail.
    fn localize(self, time_zone: Tz) -> Result<DateTime<Tz>> {
        match time_zone.from_local_datetime(&self) {
            MappedLocalTime::Single(timestamp) | MappedLocalTime::Ambiguous(timestamp, _) => {
                Ok(timestamp)
            }
            MappedLocalTime::None => Err(Error::NonExistentLocalTime(self, time_zone)),
        }
    }
}

impl<Z: TimeZone> Localize for DateTime<Z> {
    fn localize(self, time_zone: Tz) -> Result<DateTime<Tz>> {
        Ok(self.with_timezone(&time_zone))
    }
}
