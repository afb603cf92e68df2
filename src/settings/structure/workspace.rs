use std::collections::HashMap;
use std::path::PathBuf;

use miette::{miette, Context, IntoDiagnostic, Result};
use serde::Deserialize;

use crate::{simulation::WorkingDirectories, traits::ResolvableConfiguration};


/// The `[workspace]` table.
#[derive(Deserialize, Debug)]
#[serde(default)]
pub(super) struct UnresolvedWorkspaceSettings {
    /// Directory holding the `ems/` working directories and the `fab/` export.
    /// Relative paths are taken from the current directory.
    root_directory: String,

    /// Stackup document to use when none is given on the command line.
    /// Relative paths are taken from the root directory.
    stackup_file: Option<String>,
}

impl Default for UnresolvedWorkspaceSettings {
    fn default() -> Self {
        Self {
            root_directory: String::from("."),
            stackup_file: None,
        }
    }
}


/// Where the pipeline keeps its files.
#[derive(Debug, Clone)]
pub struct WorkspaceSettings {
    /// Canonical path of the workspace root.
    pub root_directory: PathBuf,

    /// Explicitly configured stackup document, if any.
    pub stackup_file_path: Option<PathBuf>,
}

impl ResolvableConfiguration for UnresolvedWorkspaceSettings {
    type Resolved = WorkspaceSettings;
    type Error = miette::Report;

    fn resolve(self) -> Result<Self::Resolved> {
        let root_directory = PathBuf::from(self.root_directory);

        // The root is a project directory, so a missing one is a typo rather
        // than something to create.
        if !root_directory.is_dir() {
            return Err(miette!(
                "Workspace root {} does not exist or is not a directory.",
                root_directory.display()
            ));
        }

        let root_directory = dunce::canonicalize(root_directory)
            .into_diagnostic()
            .wrap_err("Failed to canonicalize workspace root.")?;

        let stackup_file_path = self
            .stackup_file
            .map(|stackup_file| root_directory.join(stackup_file));


        Ok(WorkspaceSettings {
            root_directory,
            stackup_file_path,
        })
    }
}

impl WorkspaceSettings {
    /// Working directories of the simulation pipeline under this root.
    pub fn working_directories(&self) -> WorkingDirectories {
        WorkingDirectories::under(&self.root_directory)
    }

    /// Values of the `{WORKSPACE}` and `{EMS_DIRECTORY}` path placeholders.
    pub(super) fn placeholders(&self) -> HashMap<&'static str, String> {
        let directories = self.working_directories();

        HashMap::from([
            ("{WORKSPACE}", directories.root.to_string_lossy().to_string()),
            ("{EMS_DIRECTORY}", directories.base.to_string_lossy().to_string()),
        ])
    }
}
