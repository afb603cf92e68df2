use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use super::resolver::{ExpectedType, FieldPath, ValueKind};


/// Errors that make a simulation configuration unusable.
///
/// None of these are recovered from inside the crate: they are returned up
/// to the caller, which normally reports them and exits.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigurationError {
    #[error("No field {path} found in config")]
    #[diagnostic(
        code(ems_config::missing_field),
        help("This field has no default value and must be present in the document.")
    )]
    MissingField { path: FieldPath },

    #[error("Field {path} found in config has incorrect type {actual} (correct is {expected})")]
    #[diagnostic(code(ems_config::incorrect_type))]
    IncorrectType {
        path: FieldPath,
        actual: ValueKind,
        expected: ExpectedType,
    },

    #[error("Field {path} has invalid value {value}: {reason}")]
    #[diagnostic(code(ems_config::invalid_value))]
    InvalidValue {
        path: FieldPath,
        value: String,
        reason: &'static str,
    },

    #[error("Config format ({found}) is not supported (supported: {supported})")]
    #[diagnostic(
        code(ems_config::unsupported_version),
        help("The major version must match exactly and the minor version must be at least the supported one.")
    )]
    UnsupportedVersion {
        found: String,
        supported: &'static str,
    },

    #[error("Configuration hasn't been installed yet")]
    #[diagnostic(
        code(ems_config::not_installed),
        help("Build a SimulationConfiguration and pass it to registry::install first.")
    )]
    NotInstalled,

    #[error("Failed to read document at {}", .path.display())]
    #[diagnostic(code(ems_config::read_document))]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document at {} is not valid JSON", .path.display())]
    #[diagnostic(code(ems_config::parse_document))]
    ParseDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Filesystem operation failed on {}", .path.display())]
    #[diagnostic(code(ems_config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}


/// Which kind of entity referenced a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencingEntity {
    DifferentialPair,
    Trace,
}

impl std::fmt::Display for ReferencingEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferencingEntity::DifferentialPair => write!(f, "Differential pair"),
            ReferencingEntity::Trace => write!(f, "Trace"),
        }
    }
}


/// Problems found while loading that did not stop the load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadWarning {
    #[error("No field {path} found in config. Using default: {default}")]
    DefaultUsed { path: FieldPath, default: String },

    #[error(
        "Field {path} found in config has incorrect type {actual} (correct is {expected}). \
         Using default: {default}"
    )]
    DefaultUsedForIncorrectType {
        path: FieldPath,
        actual: ValueKind,
        expected: ExpectedType,
        default: String,
    },

    #[error("Field {path} has invalid value {value}: {reason}. Using default: {default}")]
    DefaultUsedForInvalidValue {
        path: FieldPath,
        value: String,
        reason: &'static str,
        default: String,
    },

    #[error("{entity} {name} is defined to use not existing port number {index} as {role}")]
    InvalidPortReference {
        entity: ReferencingEntity,
        name: String,
        index: i64,
        role: &'static str,
    },

    #[error("Layer {index} has unsupported type {layer_type:?}, ignoring it")]
    LayerIgnored { index: usize, layer_type: String },
}

impl LoadWarning {
    /// Path of the field the warning is about, if it concerns a single field.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            LoadWarning::DefaultUsed { path, .. }
            | LoadWarning::DefaultUsedForIncorrectType { path, .. }
            | LoadWarning::DefaultUsedForInvalidValue { path, .. } => Some(path),
            _ => None,
        }
    }
}
