//! Day-of-year handling for the profile pool.

use core::fmt;

use chrono::NaiveDate;

use crate::error::{ProfileError, ProfileResult};

/// Profiles follow a non-leap reference year.
const REFERENCE_YEAR: i32 = 2021;
pub const DAYS_PER_YEAR: u16 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct DayOfYear(u16);

impl DayOfYear {
    pub fn new(day: u16) -> ProfileResult<Self> {
        if (1..=DAYS_PER_YEAR).contains(&day) {
            Ok(Self(day))
        } else {
            Err(ProfileError::InvalidDay { day })
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn date(self) -> Option<NaiveDate> {
        NaiveDate::from_yo_opt(REFERENCE_YEAR, u32::from(self.0))
    }

    /// `January 05` style label.
    pub fn date_label(self) -> String {
        self.date()
            .map(|d| d.format("%B %d").to_string())
            .unwrap_or_else(|| format!("day {}", self.0))
    }

    /// Southern-hemisphere season.
    pub fn season(self) -> Season {
        match self.0 {
            d if d >= 355 || d <= 78 => Season::Summer,
            79..=170 => Season::Autumn,
            171..=263 => Season::Winter,
            _ => Season::Spring,
        }
    }
}

impl fmt::Display for DayOfYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `Month DD` label and season for a day of the year.
pub fn date_and_season(day: DayOfYear) -> (String, Season) {
    (day.date_label(), day.season())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Season {
    Summer,
    Autumn,
    Winter,
    Spring,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
            Season::Spring => "Spring",
        };
        f.write_str(name)
    }
}
