//! Half-hour resolution of the simulated day.

use core::fmt;

use crate::{FfError, FfResult};

pub const INTERVALS_PER_DAY: usize = 48;
pub const INTERVAL_MINUTES: u32 = 30;

/// One of the 48 half-hour intervals of a day, indexed from midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HalfHour(u8);

impl HalfHour {
    pub const MIDNIGHT: HalfHour = HalfHour(0);

    pub fn from_index(index: usize) -> FfResult<Self> {
        if index < INTERVALS_PER_DAY {
            Ok(Self(index as u8))
        } else {
            Err(FfError::IndexOob {
                what: "half-hour interval",
                index,
                len: INTERVALS_PER_DAY,
            })
        }
    }

    /// Parse `HH:MM` and round down to the enclosing half-hour boundary.
    pub fn parse_round_down(input: &str) -> FfResult<Self> {
        let bad = || FfError::Parse {
            what: "time of day (HH:MM)",
            value: input.to_string(),
        };
        let (h, m) = input.trim().split_once(':').ok_or_else(bad)?;
        let hour: u32 = h.trim().parse().map_err(|_| bad())?;
        let minute: u32 = m.trim().parse().map_err(|_| bad())?;
        if hour >= 24 || minute >= 60 {
            return Err(bad());
        }
        let index = hour * 2 + minute / INTERVAL_MINUTES;
        Ok(Self(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0) / 2
    }

    pub fn minute(self) -> u32 {
        (u32::from(self.0) % 2) * INTERVAL_MINUTES
    }

    /// Seconds past the hour, as solvers take time-of-day as (hour, seconds).
    pub fn seconds_past_hour(self) -> u32 {
        self.minute() * 60
    }

    pub fn all() -> impl Iterator<Item = HalfHour> {
        (0..INTERVALS_PER_DAY as u8).map(HalfHour)
    }
}

impl fmt::Display for HalfHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_down_to_half_hour() {
        assert_eq!(HalfHour::parse_round_down("15:43").unwrap().to_string(), "15:30");
        assert_eq!(HalfHour::parse_round_down("00:07").unwrap().to_string(), "00:00");
        assert_eq!(HalfHour::parse_round_down("23:59").unwrap().index(), 47);
        assert_eq!(HalfHour::parse_round_down("7:30").unwrap().to_string(), "07:30");
    }

    #[test]
    fn rejects_bad_times() {
        for input in ["24:00", "12:60", "noon", "12", "-1:10", ""] {
            assert!(HalfHour::parse_round_down(input).is_err(), "{input}");
        }
    }

    #[test]
    fn solver_time_components() {
        let t = HalfHour::from_index(31).unwrap();
        assert_eq!(t.hour(), 15);
        assert_eq!(t.seconds_past_hour(), 1800);
        assert!(HalfHour::from_index(48).is_err());
        assert_eq!(HalfHour::all().count(), INTERVALS_PER_DAY);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rounding_never_moves_forward(h in 0u32..24, m in 0u32..60) {
            let t = HalfHour::parse_round_down(&format!("{h:02}:{m:02}")).unwrap();
            let input_minutes = h * 60 + m;
            let slot_minutes = t.hour() * 60 + t.minute();
            prop_assert!(slot_minutes <= input_minutes);
            prop_assert!(input_minutes - slot_minutes < INTERVAL_MINUTES);
        }
    }
}
