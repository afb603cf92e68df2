//! The simulation configuration: a JSON document describing what to simulate,
//! plus a stackup document describing the board's layers.
//!
//! Start with [`SimulationConfiguration::from_document`]. Every field is read
//! through [`resolver::FieldResolver`], which substitutes defaults for optional
//! fields (recording a [`LoadWarning`]) and returns a [`ConfigurationError`]
//! for missing or mistyped mandatory ones.

pub mod configuration;
pub mod directories;
pub mod document;
pub mod error;
pub mod layer;
pub mod pair;
pub mod port;
pub mod registry;
pub mod resolver;
pub mod version;

pub use configuration::SimulationConfiguration;
pub use directories::{InvocationOptions, WorkingDirectories};
pub use error::{ConfigurationError, LoadWarning};
pub use layer::{LayerConfig, LayerKind};
pub use pair::{DifferentialPairConfig, TraceConfig};
pub use port::PortConfig;
pub use version::{FormatVersion, SUPPORTED_FORMAT_VERSION};


/// Size of one simulation unit in metres (micrometres).
pub const UNIT: f64 = 1e-6;
