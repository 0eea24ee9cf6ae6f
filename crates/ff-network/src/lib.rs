//! ff-network: tabular network input, entity catalog and the model compiler.
//!
//! A network arrives as one CSV file per sheet. `load_tables` reads them into
//! row structs, `compile` resolves every reference and freezes the result into
//! an immutable `NetworkModel`, and `GeoModel` / `NetworkSummary` are derived
//! views over that model.

pub mod catalog;
pub mod compile;
pub mod error;
#[cfg(feature = "fixtures")]
pub mod fixtures;
pub mod geo;
pub mod model;
pub mod schema;
pub mod summary;
pub mod tables;
pub(crate) mod topology;
pub(crate) mod validate;

pub use catalog::{Capacitor, Generator, Linecode, LinecodeCatalog, Load, Winding};
pub use compile::compile;
pub use error::{NetworkError, NetworkResult};
pub use geo::{GeoKind, GeoLine, GeoModel, GeoPoint};
pub use model::{
    Bus, BusLevel, DistributionLayout, Line, LineLevel, NetworkId, NetworkModel, Terminal,
    Transformer, TransformerKind,
};
pub use summary::NetworkSummary;
pub use tables::{NetworkTables, Sheet, load_tables};
