//! ff-core: shared foundation for feederflow.
//!
//! Contains:
//! - ids (compact ids for compiled network entities)
//! - numeric (rounding for solver scripts)
//! - phases (phase sets, terminal suffixes, R/W/B connection codes)
//! - time (half-hour intervals of the simulated day)
//! - units (uom SI types + conductor length units)
//! - class (customer classes shared by loads and profiles)
//! - error (shared error types)

pub mod class;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod phases;
pub mod time;
pub mod units;

pub use class::CustomerClass;
pub use error::{FfError, FfResult};
pub use ids::*;
pub use numeric::*;
pub use phases::{Phase, PhaseConfig, PhaseSet};
pub use time::{HalfHour, INTERVALS_PER_DAY, INTERVAL_MINUTES};
pub use units::*;
