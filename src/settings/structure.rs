use std::fs;
use std::path::{Path, PathBuf};

use miette::{miette, Context, IntoDiagnostic, Result};
use serde::Deserialize;
use tracing::debug;

pub use self::logging::LoggingSettings;
use self::logging::UnresolvedLoggingSettings;
pub use self::workspace::WorkspaceSettings;
use self::workspace::UnresolvedWorkspaceSettings;
use super::utilities::get_default_settings_file_path;
use crate::traits::{ResolvableConfiguration, ResolvableConfigurationWithContext};

mod logging;
mod workspace;



#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(crate) struct UnresolvedSettings {
    /// Workspace layout.
    workspace: UnresolvedWorkspaceSettings,

    /// Logging-related settings.
    logging: UnresolvedLoggingSettings,
}


/// All settings of the tool.
#[derive(Debug, Clone)]
pub struct Settings {
    /// The file these settings were loaded from, if any.
    pub file_path: Option<PathBuf>,

    /// Workspace layout.
    pub workspace: WorkspaceSettings,

    /// Logging-related settings.
    pub logging: LoggingSettings,
}


impl ResolvableConfigurationWithContext for UnresolvedSettings {
    type Resolved = Settings;
    type Context = Option<PathBuf>;
    type Error = miette::Report;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved> {
        let workspace = self
            .workspace
            .resolve()
            .wrap_err("Failed to resolve workspace table.")?;

        let logging = self
            .logging
            .resolve(workspace.placeholders())
            .wrap_err("Failed to resolve logging table.")?;


        Ok(Settings {
            file_path: context,
            workspace,
            logging,
        })
    }
}


impl Settings {
    /// Load the settings from a specific file path.
    pub fn load_from_path<S: AsRef<Path>>(settings_file_path: S) -> Result<Self> {
        let settings_string = fs::read_to_string(settings_file_path.as_ref())
            .into_diagnostic()
            .wrap_err_with(|| {
                miette!(
                    "Could not read settings file at {}.",
                    settings_file_path.as_ref().display()
                )
            })?;

        let unresolved_settings = toml::from_str::<UnresolvedSettings>(&settings_string)
            .into_diagnostic()
            .wrap_err("Could not parse settings file!")?;


        let settings_file_path = dunce::canonicalize(settings_file_path)
            .into_diagnostic()
            .wrap_err("Could not canonicalize settings file path!")?;

        unresolved_settings
            .resolve(Some(settings_file_path))
            .wrap_err("Failed to resolve settings.")
    }

    /// Load the settings from the default path (`./ems-config.toml`).
    /// If there is no file there, built-in defaults are used.
    pub fn load_from_default_path() -> Result<Self> {
        let default_path = get_default_settings_file_path()?;

        if default_path.is_file() {
            return Settings::load_from_path(default_path);
        }

        debug!(
            "No settings file at {}, using built-in defaults.",
            default_path.display()
        );

        UnresolvedSettings::default()
            .resolve(None)
            .wrap_err("Failed to resolve default settings.")
    }
}
