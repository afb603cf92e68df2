//! Command-line interface definitions for the `ems-config` binary.

use std::path::PathBuf;

use clap::Parser;
use ems_config::simulation::InvocationOptions;



/// Command-line arguments.
#[derive(Parser)]
#[command(
    name = "ems-config",
    author,
    about = "Loads and validates the configuration of a PCB electromagnetic simulation.",
    version
)]
pub struct CLIArgs {
    /// Path to the simulation configuration document.
    #[arg(
        short = 'c',
        long = "config",
        default_value = "simulation.json",
        help = "Simulation configuration file (JSON). Defaults to ./simulation.json"
    )]
    pub configuration_file_path: PathBuf,

    #[arg(
        long = "stackup",
        help = "Stackup file (JSON). Defaults to the workspace's stackup_file setting, \
                then to fab/stackup.json under the workspace root, which is only loaded if it exists."
    )]
    pub stackup_file_path: Option<PathBuf>,

    /// Path to the settings file of the tool itself.
    /// If unspecified, `./ems-config.toml` is used when present.
    #[arg(
        long = "settings-file-path",
        help = "Path to the settings file to use. Defaults to ./ems-config.toml"
    )]
    pub settings_file_path: Option<PathBuf>,

    #[arg(short = 'g', long = "geometry", help = "Prepare the geometry working directory.")]
    pub geometry: bool,

    #[arg(short = 's', long = "simulate", help = "Prepare the simulation working directory.")]
    pub simulate: bool,

    #[arg(short = 'p', long = "postprocess", help = "Prepare the results working directory.")]
    pub postprocess: bool,

    #[arg(short = 'a', long = "all", help = "Prepare the working directories of every phase.")]
    pub all: bool,

    #[arg(
        long = "print-resolved",
        help = "Print the resolved configuration as JSON after loading it."
    )]
    pub print_resolved: bool,

    #[arg(short = 'd', long = "debug", help = "Log debug messages to the console.")]
    pub debug: bool,
}

impl CLIArgs {
    pub fn invocation_options(&self) -> InvocationOptions {
        InvocationOptions {
            geometry: self.geometry,
            simulate: self.simulate,
            postprocess: self.postprocess,
            all: self.all,
        }
    }
}
