//! Conductor lengths and the units they are tabulated in.

use core::fmt;
use core::str::FromStr;

use uom::si::f64::Length as UomLength;

use crate::FfError;

pub type Length = UomLength;

pub fn to_km(l: Length) -> f64 {
    use uom::si::length::kilometer;
    l.get::<kilometer>()
}

/// Length units accepted in conductor tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LengthUnit {
    Meter,
    Kilometer,
    Foot,
    KiloFoot,
    Mile,
    /// Per-unit impedances with no length scaling.
    None,
}

impl LengthUnit {
    pub fn length(self, value: f64) -> Length {
        use uom::si::length::{foot, kilometer, meter, mile};
        match self {
            LengthUnit::Meter | LengthUnit::None => Length::new::<meter>(value),
            LengthUnit::Kilometer => Length::new::<kilometer>(value),
            LengthUnit::Foot => Length::new::<foot>(value),
            LengthUnit::KiloFoot => Length::new::<foot>(value * 1000.0),
            LengthUnit::Mile => Length::new::<mile>(value),
        }
    }

    /// Keyword the solver expects in `units=` properties.
    pub fn keyword(self) -> &'static str {
        match self {
            LengthUnit::Meter => "m",
            LengthUnit::Kilometer => "km",
            LengthUnit::Foot => "ft",
            LengthUnit::KiloFoot => "kft",
            LengthUnit::Mile => "mi",
            LengthUnit::None => "none",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = FfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "meter" | "meters" | "metre" => Ok(LengthUnit::Meter),
            "km" | "kilometer" | "kilometers" => Ok(LengthUnit::Kilometer),
            "ft" | "feet" => Ok(LengthUnit::Foot),
            "kft" => Ok(LengthUnit::KiloFoot),
            "mi" | "mile" | "miles" => Ok(LengthUnit::Mile),
            "none" | "" => Ok(LengthUnit::None),
            _ => Err(FfError::Parse {
                what: "length unit",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
