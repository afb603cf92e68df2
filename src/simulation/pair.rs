//! Differential pairs and traces: entities that connect already declared ports.

use serde::Serialize;
use serde_json::Value;

use super::{
    error::{ConfigurationError, LoadWarning, ReferencingEntity},
    resolver::{Fallback, FieldPath, FieldResolver},
};
use crate::traits::ResolvableConfigurationWithContext;


/// Checks `index` against the number of known ports, recording a warning if it is invalid.
fn check_port_reference(
    resolver: &mut FieldResolver,
    entity: ReferencingEntity,
    name: &str,
    role: &'static str,
    index: i64,
    port_count: usize,
) -> bool {
    let in_range = usize::try_from(index).is_ok_and(|index| index < port_count);

    if !in_range {
        resolver.record_warning(LoadWarning::InvalidPortReference {
            entity,
            name: name.to_owned(),
            index,
            role,
        });
    }

    in_range
}


/// A differential pair entry of the configuration document, located at `path`.
pub(crate) struct UnresolvedDifferentialPair<'d, 'r> {
    pub(crate) document: &'d Value,
    pub(crate) path: FieldPath,
    pub(crate) resolver: &'r mut FieldResolver,
}

/// Two ports driving the positive line and two driving the negative one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DifferentialPairConfig {
    pub start_p: i64,
    pub stop_p: i64,
    pub start_n: i64,
    pub stop_n: i64,

    pub name: String,

    /// `false` if any of the port indices does not exist. Such pairs are kept
    /// but must not be used.
    pub correct: bool,
}

impl ResolvableConfigurationWithContext for UnresolvedDifferentialPair<'_, '_> {
    /// Number of ports declared in the document.
    type Context = usize;
    type Resolved = DifferentialPairConfig;
    type Error = ConfigurationError;

    fn resolve(self, port_count: Self::Context) -> Result<Self::Resolved, Self::Error> {
        let Self {
            document,
            path,
            resolver,
        } = self;

        let start_p: i64 = resolver.require(document, &path.join("start_p"))?;
        let stop_p: i64 = resolver.require(document, &path.join("stop_p"))?;
        let start_n: i64 = resolver.require(document, &path.join("start_n"))?;
        let stop_n: i64 = resolver.require(document, &path.join("stop_n"))?;

        let name = resolver.resolve(
            document,
            &path.join("name"),
            Fallback::Default(format!("{start_p}{stop_p}{start_n}{stop_n}")),
        )?;

        let mut correct = true;
        for (role, index) in [
            ("start_p", start_p),
            ("stop_p", stop_p),
            ("start_n", start_n),
            ("stop_n", stop_n),
        ] {
            correct &= check_port_reference(
                resolver,
                ReferencingEntity::DifferentialPair,
                &name,
                role,
                index,
                port_count,
            );
        }

        Ok(DifferentialPairConfig {
            start_p,
            stop_p,
            start_n,
            stop_n,
            name,
            correct,
        })
    }
}


/// A trace entry of the configuration document, located at `path`.
pub(crate) struct UnresolvedTrace<'d, 'r> {
    pub(crate) document: &'d Value,
    pub(crate) path: FieldPath,
    pub(crate) resolver: &'r mut FieldResolver,
}

/// A single-ended trace between two ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceConfig {
    pub start: i64,
    pub stop: i64,

    pub name: String,

    /// `false` if either port index does not exist.
    pub correct: bool,
}

impl ResolvableConfigurationWithContext for UnresolvedTrace<'_, '_> {
    /// Number of ports declared in the document.
    type Context = usize;
    type Resolved = TraceConfig;
    type Error = ConfigurationError;

    fn resolve(self, port_count: Self::Context) -> Result<Self::Resolved, Self::Error> {
        let Self {
            document,
            path,
            resolver,
        } = self;

        let start: i64 = resolver.require(document, &path.join("start"))?;
        let stop: i64 = resolver.require(document, &path.join("stop"))?;

        let name = resolver.resolve(
            document,
            &path.join("name"),
            Fallback::Default(format!("{start}{stop}")),
        )?;

        let mut correct = true;
        for (role, index) in [("start", start), ("stop", stop)] {
            correct &= check_port_reference(
                resolver,
                ReferencingEntity::Trace,
                &name,
                role,
                index,
                port_count,
            );
        }

        Ok(TraceConfig {
            start,
            stop,
            name,
            correct,
        })
    }
}
