//! ff-profiles: half-hourly demand profiles and their assignment to loads.

pub mod assign;
pub mod calendar;
pub mod error;
pub mod pool;

pub use assign::{AssignSettings, AssignedProfile, DayAssignment, LoadDemand, assign_day, resolve_day};
pub use calendar::{DAYS_PER_YEAR, DayOfYear, Season, date_and_season};
pub use error::{ProfileError, ProfileResult};
pub use pool::{COMMERCIAL_POOL_FILE, Profile, ProfilePool, RESIDENTIAL_POOL_FILE, Sample, pool_file};
