use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{
    directories::{InvocationOptions, WorkingDirectories},
    document::load_json_document,
    error::{ConfigurationError, LoadWarning},
    layer::{LayerConfig, LayerKind, UnresolvedLayer},
    pair::{DifferentialPairConfig, TraceConfig, UnresolvedDifferentialPair, UnresolvedTrace},
    port::{PortConfig, UnresolvedPort},
    resolver::{Fallback, FieldResolver},
    version::{check_format_version, FormatVersion},
};
use crate::{
    field_path,
    traits::{ResolvableConfiguration, ResolvableConfigurationWithContext},
};


/// The validated configuration of one simulation run.
///
/// Built in three steps, in this order:
/// 1. [`SimulationConfiguration::from_document`] reads the configuration document,
/// 2. [`SimulationConfiguration::create_default_directories`] prepares the working directories,
/// 3. [`SimulationConfiguration::load_stackup`] adds the board layers.
///
/// Steps 2 and 3 are independent of each other. Once built, the configuration
/// is only read (see [`crate::simulation::registry`]).
#[derive(Debug, Clone, Serialize)]
pub struct SimulationConfiguration {
    pub format_version: FormatVersion,

    /// In Hz.
    pub start_frequency: i64,

    /// In Hz.
    pub stop_frequency: i64,

    /// Upper bound on solver time steps, `None` for no limit.
    pub max_steps: Option<i64>,

    /// Filled in by the geometry stage.
    pub pcb_width: Option<i64>,

    /// Filled in by the geometry stage.
    pub pcb_height: Option<i64>,

    pub pcb_mesh_xy: i64,

    /// Mesh lines between two neighbouring copper layers.
    pub inter_copper_layers: i64,

    pub margin_xy: i64,
    pub margin_z: i64,
    pub margin_mesh_xy: i64,
    pub margin_mesh_z: i64,

    pub via_plating: i64,
    pub via_filling_epsilon: f64,

    pub ports: Vec<PortConfig>,
    pub diff_pairs: Vec<DifferentialPairConfig>,
    pub traces: Vec<TraceConfig>,

    /// Metal and substrate layers in stackup order, empty until a stackup is loaded.
    pub layers: Vec<LayerConfig>,

    pub directories: WorkingDirectories,
    pub arguments: InvocationOptions,

    #[serde(skip)]
    warnings: Vec<LoadWarning>,
}

impl SimulationConfiguration {
    /// Resolves a configuration document, with working directories under
    /// the current directory.
    pub fn from_document(
        document: &Value,
        arguments: InvocationOptions,
    ) -> Result<Self, ConfigurationError> {
        Self::from_document_in(
            document,
            arguments,
            WorkingDirectories::under_current_directory()?,
        )
    }

    /// Resolves a configuration document, with the given working directories.
    pub fn from_document_in(
        document: &Value,
        arguments: InvocationOptions,
        directories: WorkingDirectories,
    ) -> Result<Self, ConfigurationError> {
        info!("Parsing config");
        let mut resolver = FieldResolver::new();

        let version: &str = resolver.require(document, &field_path!["format_version"])?;
        let format_version = check_format_version(version)?;

        let start_frequency =
            resolver.or_default(document, &field_path!["frequency", "start"], 500e3) as i64;
        let stop_frequency =
            resolver.or_default(document, &field_path!["frequency", "stop"], 10e6) as i64;
        let max_steps = resolver
            .resolve::<Option<f64>>(document, &field_path!["max_steps"], Fallback::Default(None))?
            .map(|max_steps| max_steps as i64);
        let pcb_mesh_xy = resolver.or_default(document, &field_path!["mesh", "xy"], 50.0) as i64;
        let inter_copper_layers =
            resolver.or_default(document, &field_path!["mesh", "inter_layers"], 5_i64);
        let margin_xy = resolver.or_default(document, &field_path!["margin", "xy"], 3000.0) as i64;
        let margin_z = resolver.or_default(document, &field_path!["margin", "z"], 3000.0) as i64;
        let margin_mesh_xy =
            resolver.or_default(document, &field_path!["mesh", "margin", "xy"], 200.0) as i64;
        let margin_mesh_z =
            resolver.or_default(document, &field_path!["mesh", "margin", "z"], 200.0) as i64;
        let via_plating =
            resolver.or_default(document, &field_path!["via", "plating_thickness"], 50.0) as i64;
        let via_filling_epsilon =
            resolver.or_default(document, &field_path!["via", "filling_epsilon"], 1.0);

        let port_entries: &[Value] = resolver.require(document, &field_path!["ports"])?;
        let ports = (0..port_entries.len())
            .map(|index| {
                UnresolvedPort {
                    document,
                    path: field_path!["ports", index],
                    resolver: &mut resolver,
                }
                .resolve()
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Found {} ports", ports.len());

        let pair_count = resolver
            .or_default::<&[Value]>(document, &field_path!["differential_pairs"], &[])
            .len();
        let diff_pairs = (0..pair_count)
            .map(|index| {
                UnresolvedDifferentialPair {
                    document,
                    path: field_path!["differential_pairs", index],
                    resolver: &mut resolver,
                }
                .resolve(ports.len())
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Found {} differential pairs", diff_pairs.len());

        let trace_count = resolver
            .or_default::<&[Value]>(document, &field_path!["traces"], &[])
            .len();
        let traces = (0..trace_count)
            .map(|index| {
                UnresolvedTrace {
                    document,
                    path: field_path!["traces", index],
                    resolver: &mut resolver,
                }
                .resolve(ports.len())
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Found {} traces", traces.len());

        Ok(Self {
            format_version,
            start_frequency,
            stop_frequency,
            max_steps,
            pcb_width: None,
            pcb_height: None,
            pcb_mesh_xy,
            inter_copper_layers,
            margin_xy,
            margin_z,
            margin_mesh_xy,
            margin_mesh_z,
            via_plating,
            via_filling_epsilon,
            ports,
            diff_pairs,
            traces,
            layers: Vec::new(),
            directories,
            arguments,
            warnings: resolver.into_warnings(),
        })
    }

    /// Reads a configuration document from disk and resolves it.
    pub fn load_from_path<P: AsRef<Path>>(
        path: P,
        arguments: InvocationOptions,
    ) -> Result<Self, ConfigurationError> {
        let document = load_json_document(path)?;
        Self::from_document(&document, arguments)
    }

    /// Creates the working directories of the phases requested in [`Self::arguments`].
    ///
    /// Requested phase directories are emptied, each at most once per
    /// configuration value, so calling this again does not lose any output.
    pub fn create_default_directories(&mut self) -> Result<(), ConfigurationError> {
        self.directories.materialize(&self.arguments)
    }

    /// Replaces the layer list with the metal and substrate layers of `stackup`.
    pub fn load_stackup(&mut self, stackup: &Value) -> Result<(), ConfigurationError> {
        let mut resolver = FieldResolver::new();

        let layer_entries: &[Value] = resolver.require(stackup, &field_path!["layers"])?;

        let mut layers = Vec::with_capacity(layer_entries.len());
        for index in 0..layer_entries.len() {
            let layer = UnresolvedLayer {
                document: stackup,
                path: field_path!["layers", index],
                resolver: &mut resolver,
            }
            .resolve()?;

            if layer.kind.is_simulated() {
                layers.push(layer);
            } else {
                resolver.record_warning(LoadWarning::LayerIgnored {
                    index,
                    layer_type: layer.layer_type,
                });
            }
        }
        debug!("Found {} simulated layers", layers.len());

        self.layers = layers;
        self.warnings.extend(resolver.into_warnings());

        Ok(())
    }

    /// Reads a stackup document from disk and loads it, see [`Self::load_stackup`].
    pub fn load_stackup_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigurationError> {
        let stackup = load_json_document(path)?;
        self.load_stackup(&stackup)
    }

    /// Default stackup location, inside the fabrication directory.
    pub fn default_stackup_path(&self) -> PathBuf {
        self.directories.stackup_file_path()
    }

    fn layers_of_kind(&self, kind: LayerKind) -> Vec<&LayerConfig> {
        self.layers.iter().filter(|layer| layer.kind == kind).collect()
    }

    /// Substrate layers, in stackup order.
    pub fn substrates(&self) -> Vec<&LayerConfig> {
        self.layers_of_kind(LayerKind::Substrate)
    }

    /// Metal layers, in stackup order.
    pub fn metals(&self) -> Vec<&LayerConfig> {
        self.layers_of_kind(LayerKind::Metal)
    }

    /// Differential pairs whose ports all exist.
    pub fn valid_differential_pairs(&self) -> impl Iterator<Item = &DifferentialPairConfig> {
        self.diff_pairs.iter().filter(|pair| pair.correct)
    }

    /// Traces whose ports both exist.
    pub fn valid_traces(&self) -> impl Iterator<Item = &TraceConfig> {
        self.traces.iter().filter(|trace| trace.correct)
    }

    pub fn excited_ports(&self) -> impl Iterator<Item = (usize, &PortConfig)> {
        self.ports.iter().enumerate().filter(|(_, port)| port.excite)
    }

    /// Everything that was defaulted, ignored or marked incorrect while loading.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }
}
