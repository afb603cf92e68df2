use std::collections::HashMap;
use std::path::{Path, PathBuf};

use miette::{miette, Context, IntoDiagnostic, Result};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::{
    settings::utilities::replace_placeholders_in_path,
    traits::ResolvableConfigurationWithContext,
};

/// Directive added to the console filter by the `--debug` flag.
const DEBUG_DIRECTIVE: &str = "ems_config=debug";


/// The `[logging]` table.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub(super) struct UnresolvedLoggingSettings {
    console_level: String,

    file_level: String,

    /// May contain `{WORKSPACE}` and `{EMS_DIRECTORY}`.
    log_directory: String,

    log_file_name: String,
}

impl Default for UnresolvedLoggingSettings {
    fn default() -> Self {
        Self {
            console_level: String::from("info"),
            file_level: String::from("debug"),
            log_directory: String::from("{EMS_DIRECTORY}/logs"),
            log_file_name: String::from("ems-config.log"),
        }
    }
}


#[derive(Clone, Debug)]
pub struct LoggingSettings {
    /// `EnvFilter` directives for the console, already validated.
    pub console_level: String,

    /// `EnvFilter` directives for the log file, already validated.
    pub file_level: String,

    pub log_directory: PathBuf,

    pub log_file_name: String,
}

impl ResolvableConfigurationWithContext for UnresolvedLoggingSettings {
    type Resolved = LoggingSettings;
    /// Path placeholders of the workspace.
    type Context = HashMap<&'static str, String>;
    type Error = miette::Report;

    fn resolve(self, context: Self::Context) -> Result<Self::Resolved> {
        EnvFilter::try_new(&self.console_level)
            .into_diagnostic()
            .wrap_err("Failed to parse field console_level.")?;

        EnvFilter::try_new(&self.file_level)
            .into_diagnostic()
            .wrap_err("Failed to parse field file_level.")?;

        let is_plain_file_name = Path::new(&self.log_file_name)
            .file_name()
            .is_some_and(|file_name| file_name == self.log_file_name.as_str());
        if !is_plain_file_name {
            return Err(miette!(
                "Field log_file_name must be a file name, got {:?}.",
                self.log_file_name
            ));
        }


        Ok(Self::Resolved {
            console_level: self.console_level,
            file_level: self.file_level,
            log_directory: replace_placeholders_in_path(self.log_directory, context),
            log_file_name: self.log_file_name,
        })
    }
}

impl LoggingSettings {
    /// Console filter. With `debug` (the `--debug` flag), this crate's own
    /// messages are shown down to debug level regardless of `console_level`.
    pub fn console_filter(&self, debug: bool) -> EnvFilter {
        if !debug {
            return EnvFilter::builder().parse_lossy(&self.console_level);
        }

        let directives = match self.console_level.trim() {
            "" => DEBUG_DIRECTIVE.to_owned(),
            level => format!("{level},{DEBUG_DIRECTIVE}"),
        };

        EnvFilter::builder().parse_lossy(directives)
    }

    pub fn file_filter(&self) -> EnvFilter {
        EnvFilter::builder().parse_lossy(&self.file_level)
    }
}
