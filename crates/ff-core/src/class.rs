use core::fmt;

/// Customer class of a load, which selects the profile pool it draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CustomerClass {
    Residential,
    Commercial,
}

impl CustomerClass {
    /// Single-phase connections are residential customers, everything else commercial.
    pub fn from_phase_count(phases: u8) -> Self {
        if phases == 1 {
            Self::Residential
        } else {
            Self::Commercial
        }
    }

    /// Parse the `RES` / `COM` codes carried by distribution transformers.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "RES" => Some(Self::Residential),
            "COM" => Some(Self::Commercial),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Residential => "RES",
            Self::Commercial => "COM",
        }
    }

    /// Short tag used in solver element names.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Residential => "res",
            Self::Commercial => "com",
        }
    }
}

impl fmt::Display for CustomerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Residential => write!(f, "residential"),
            Self::Commercial => write!(f, "commercial"),
        }
    }
}
