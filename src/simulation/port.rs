use nalgebra::Point2;
use serde::Serialize;
use serde_json::Value;

use super::{
    error::ConfigurationError,
    resolver::{FieldPath, FieldResolver},
};
use crate::traits::ResolvableConfiguration;


pub const DEFAULT_PORT_NAME: &str = "Unnamed";
pub const DEFAULT_PORT_LENGTH: f64 = 1000.0;
pub const DEFAULT_PORT_IMPEDANCE: f64 = 50.0;
pub const DEFAULT_PORT_DB_MARGIN: f64 = -15.0;


/// A port entry of the configuration document, located at `path`.
pub(crate) struct UnresolvedPort<'d, 'r> {
    pub(crate) document: &'d Value,
    pub(crate) path: FieldPath,
    pub(crate) resolver: &'r mut FieldResolver,
}

/// A simulation port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortConfig {
    pub name: String,

    /// Filled in by the geometry stage.
    pub position: Option<Point2<f64>>,

    /// Filled in by the geometry stage.
    pub direction: Option<f64>,

    pub width: f64,

    pub length: f64,

    pub impedance: f64,

    /// Index of the metal layer the port lies on.
    pub layer: i64,

    /// Index of the metal layer used as the reference plane.
    pub plane: i64,

    /// Suppression margin in dB.
    pub db_margin: f64,

    pub excite: bool,
}

impl ResolvableConfiguration for UnresolvedPort<'_, '_> {
    type Resolved = PortConfig;
    type Error = ConfigurationError;

    fn resolve(self) -> Result<Self::Resolved, Self::Error> {
        let Self {
            document,
            path,
            resolver,
        } = self;

        let name = resolver.or_default(document, &path.join("name"), DEFAULT_PORT_NAME.to_owned());

        let width_path = path.join("width");
        let width: f64 = resolver.require(document, &width_path)?;
        if width <= 0.0 {
            return Err(ConfigurationError::InvalidValue {
                path: width_path,
                value: width.to_string(),
                reason: "port width must be positive",
            });
        }

        let length = resolver.or_default(document, &path.join("length"), DEFAULT_PORT_LENGTH);
        let impedance = resolver.or_default(document, &path.join("impedance"), DEFAULT_PORT_IMPEDANCE);
        let layer = resolver.require(document, &path.join("layer"))?;
        let plane = resolver.require(document, &path.join("plane"))?;
        let db_margin = resolver.or_default(document, &path.join("dB_margin"), DEFAULT_PORT_DB_MARGIN);
        let excite = resolver.or_default(document, &path.join("excite"), false);

        Ok(PortConfig {
            name,
            position: None,
            direction: None,
            width,
            length,
            impedance,
            layer,
            plane,
            db_margin,
            excite,
        })
    }
}

impl PortConfig {
    /// Returns `true` once the geometry stage has placed the port.
    pub fn is_placed(&self) -> bool {
        self.position.is_some() && self.direction.is_some()
    }
}
