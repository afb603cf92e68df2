use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::error::ConfigurationError;


pub const BASE_DIR: &str = "ems";
pub const GEOMETRY_DIR: &str = "ems/geometry";
pub const RESULTS_DIR: &str = "ems/results";
pub const SIMULATION_DIR: &str = "ems/simulation";
pub const FAB_DIR: &str = "fab";

/// File name of the stackup inside the fabrication directory.
pub const STACKUP_FILE_NAME: &str = "stackup.json";


/// Which pipeline phases the current invocation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InvocationOptions {
    pub geometry: bool,
    pub simulate: bool,
    pub postprocess: bool,
    pub all: bool,
}

impl InvocationOptions {
    pub fn runs_geometry(&self) -> bool {
        self.geometry || self.all
    }

    pub fn runs_simulation(&self) -> bool {
        self.simulate || self.all
    }

    pub fn runs_postprocessing(&self) -> bool {
        self.postprocess || self.all
    }

    pub fn runs_anything(&self) -> bool {
        self.runs_geometry() || self.runs_simulation() || self.runs_postprocessing()
    }
}


/// Working directories of the pipeline, all relative to one root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingDirectories {
    pub root: PathBuf,
    pub base: PathBuf,
    pub geometry: PathBuf,
    pub results: PathBuf,
    pub simulation: PathBuf,
    /// Produced by the fabrication export, never created or cleaned here.
    pub fab: PathBuf,

    #[serde(skip)]
    prepared: PreparedDirectories,
}


/// Directories [`WorkingDirectories::materialize`] has already created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct PreparedDirectories {
    base: bool,
    geometry: bool,
    results: bool,
    simulation: bool,
}

impl PreparedDirectories {
    fn covers(&self, options: &InvocationOptions) -> bool {
        self.base
            && (self.geometry || !options.runs_geometry())
            && (self.results || !options.runs_postprocessing())
            && (self.simulation || !options.runs_simulation())
    }
}

impl WorkingDirectories {
    pub fn under<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();

        Self {
            base: root.join(BASE_DIR),
            geometry: root.join(GEOMETRY_DIR),
            results: root.join(RESULTS_DIR),
            simulation: root.join(SIMULATION_DIR),
            fab: root.join(FAB_DIR),
            root,
            prepared: PreparedDirectories::default(),
        }
    }

    pub fn under_current_directory() -> Result<Self, ConfigurationError> {
        let current_directory =
            std::env::current_dir().map_err(|source| ConfigurationError::Io {
                path: PathBuf::from("."),
                source,
            })?;

        Ok(Self::under(current_directory))
    }

    /// Default location of the stackup document.
    pub fn stackup_file_path(&self) -> PathBuf {
        self.fab.join(STACKUP_FILE_NAME)
    }

    /// Creates the base directory and, for every requested phase, recreates
    /// that phase's directory from scratch. Directories of phases that are
    /// not requested are left untouched.
    ///
    /// Each phase directory is wiped at most once: after a failure, calling
    /// this again only handles the directories that were not created yet.
    pub fn materialize(&mut self, options: &InvocationOptions) -> Result<(), ConfigurationError> {
        if self.prepared.covers(options) {
            warn!("Working directories have already been created. Skipping");
            return Ok(());
        }

        if !self.prepared.base {
            self.base = create_directory(&self.base, false)?;
            self.prepared.base = true;
        }

        if options.runs_geometry() {
            recreate_once(&mut self.geometry, &mut self.prepared.geometry)?;
        }
        if options.runs_postprocessing() {
            recreate_once(&mut self.results, &mut self.prepared.results)?;
        }
        if options.runs_simulation() {
            recreate_once(&mut self.simulation, &mut self.prepared.simulation)?;
        }

        Ok(())
    }
}


fn recreate_once(path: &mut PathBuf, prepared: &mut bool) -> Result<(), ConfigurationError> {
    if *prepared {
        debug!("{} has already been recreated, keeping it.", path.display());
        return Ok(());
    }

    *path = create_directory(path, true)?;
    *prepared = true;

    Ok(())
}

/// Creates `path` if it does not exist, removing it first if `cleanup` is set.
/// Returns the canonical path of the directory.
fn create_directory(path: &Path, cleanup: bool) -> Result<PathBuf, ConfigurationError> {
    let io_error = |source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    };

    if cleanup && path.exists() {
        debug!("Removing {}.", path.display());
        fs::remove_dir_all(path).map_err(io_error)?;
    }

    if !path.is_dir() {
        debug!("Creating {}.", path.display());
        fs::create_dir_all(path).map_err(io_error)?;
    }

    dunce::canonicalize(path).map_err(io_error)
}
