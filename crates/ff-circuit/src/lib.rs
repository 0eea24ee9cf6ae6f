//! ff-circuit: turning a compiled network into solver commands, and the
//! session abstraction those commands are sent through.

pub mod builder;
pub mod command;
pub mod element;
pub mod error;
pub mod plan;
pub mod process;
pub mod recording;
pub mod session;
pub mod settings;

pub use builder::{BuiltCircuit, apply, build};
pub use command::{Command, Stage};
pub use element::{BusRef, ElementClass, ElementRef};
pub use error::{CircuitError, CircuitResult};
pub use plan::{CircuitPlan, PlannedCommand, load_demands, plan};
pub use process::ProcessSession;
pub use recording::RecordingSession;
pub use session::{NodeVoltage, SolverSession};
pub use settings::{CircuitSettings, RegulatorSettings, SourceSettings};
