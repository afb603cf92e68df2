use serde::Serialize;
use serde_json::Value;

use super::{
    error::ConfigurationError,
    resolver::{Fallback, FieldPath, FieldResolver},
    UNIT,
};
use crate::traits::ResolvableConfiguration;


/// Kind of a stackup layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LayerKind {
    Substrate,
    Metal,
    /// Anything the simulation does not model (solder mask, silkscreen, ...).
    Other,
}

impl LayerKind {
    /// Classifies a stackup `type` string.
    pub fn classify(layer_type: &str) -> Self {
        match layer_type {
            "core" | "prepreg" => LayerKind::Substrate,
            "copper" => LayerKind::Metal,
            _ => LayerKind::Other,
        }
    }

    /// Whether layers of this kind take part in the simulation.
    pub fn is_simulated(&self) -> bool {
        matches!(self, LayerKind::Substrate | LayerKind::Metal)
    }
}


/// Converts a thickness in millimetres into simulation units.
pub fn millimetres_to_units(millimetres: f64) -> f64 {
    millimetres / 1000.0 / UNIT
}

/// Turns a layer name such as `F.Cu` into something usable as a file name (`F_Cu`).
pub fn file_safe_layer_name(name: &str) -> String {
    name.replace('.', "_")
}


/// A layer entry of the stackup document, located at `path`.
pub(crate) struct UnresolvedLayer<'d, 'r> {
    pub(crate) document: &'d Value,
    pub(crate) path: FieldPath,
    pub(crate) resolver: &'r mut FieldResolver,
}

/// A resolved stackup layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerConfig {
    pub kind: LayerKind,

    /// The raw `type` string from the stackup.
    pub layer_type: String,

    /// Thickness in simulation units, zero if the stackup leaves it unset.
    pub thickness: f64,

    /// File-safe layer name, only set for metal layers.
    pub file: Option<String>,

    /// Dielectric constant, only set for substrate layers.
    pub epsilon: Option<f64>,
}

impl ResolvableConfiguration for UnresolvedLayer<'_, '_> {
    type Resolved = LayerConfig;
    type Error = ConfigurationError;

    fn resolve(self) -> Result<Self::Resolved, Self::Error> {
        let Self {
            document,
            path,
            resolver,
        } = self;

        let layer_type: String = resolver.require(document, &path.join("type"))?;
        let kind = LayerKind::classify(&layer_type);

        let thickness = resolver
            .resolve::<Option<f64>>(document, &path.join("thickness"), Fallback::Default(None))?
            .map(millimetres_to_units)
            .unwrap_or(0.0);

        let (file, epsilon) = match kind {
            LayerKind::Metal => {
                let name: &str = resolver.require(document, &path.join("name"))?;
                (Some(file_safe_layer_name(name)), None)
            }
            LayerKind::Substrate => {
                let epsilon: f64 = resolver.require(document, &path.join("epsilon"))?;
                (None, Some(epsilon))
            }
            LayerKind::Other => (None, None),
        };

        Ok(LayerConfig {
            kind,
            layer_type,
            thickness,
            file,
            epsilon,
        })
    }
}
