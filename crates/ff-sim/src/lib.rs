//! ff-sim: snapshot and daily execution over a built circuit.

pub mod daily;
pub mod error;
pub mod probes;
pub mod snapshot;

pub use daily::{DailyOutcome, solve_daily, solve_daily_with_progress};
pub use error::{SimError, SimResult};
pub use probes::{LineProbe, LoadProbe, Probes, TransformerProbe};
pub use snapshot::solve_snapshot;
