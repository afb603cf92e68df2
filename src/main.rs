use clap::Parser;
use ems_config::{
    logging::initialize_tracing,
    settings::Settings,
    simulation::{document::load_json_document, registry, SimulationConfiguration},
};
use miette::{Context, IntoDiagnostic, Result};
use tracing::{info, warn};

use crate::cli::CLIArgs;

mod cli;


fn main() -> Result<()> {
    let cli_args = CLIArgs::parse();

    // Load settings.
    let settings = match cli_args.settings_file_path.as_ref() {
        Some(path) => {
            println!("Loading settings: {}", path.display());
            Settings::load_from_path(path)
        }
        None => Settings::load_from_default_path(),
    }
    .wrap_err("Failed to load settings file.")?;


    let logging_raii_guard = initialize_tracing(
        settings.logging.console_filter(cli_args.debug),
        settings.logging.file_filter(),
        &settings.logging.log_directory,
        &settings.logging.log_file_name,
    )
    .wrap_err("Failed to initialize tracing.")?;

    info!("Tracing initialized.");


    info!(
        "Workspace root: {}",
        settings.workspace.root_directory.display()
    );

    let mut configuration = load_json_document(&cli_args.configuration_file_path)
        .and_then(|document| {
            SimulationConfiguration::from_document_in(
                &document,
                cli_args.invocation_options(),
                settings.workspace.working_directories(),
            )
        })
        .wrap_err_with(|| {
            format!(
                "Failed to load simulation configuration from {}.",
                cli_args.configuration_file_path.display()
            )
        })?;

    if configuration.arguments.runs_anything() {
        configuration
            .create_default_directories()
            .wrap_err("Failed to create working directories.")?;
    }

    // An explicitly named stackup must load; the default one is optional.
    let explicit_stackup_file_path = cli_args
        .stackup_file_path
        .clone()
        .or_else(|| settings.workspace.stackup_file_path.clone());
    let stackup_file_path = explicit_stackup_file_path
        .clone()
        .unwrap_or_else(|| configuration.default_stackup_path());

    if explicit_stackup_file_path.is_some() || stackup_file_path.is_file() {
        configuration
            .load_stackup_from_path(&stackup_file_path)
            .wrap_err_with(|| {
                format!("Failed to load stackup from {}.", stackup_file_path.display())
            })?;
    } else {
        warn!(
            "No stackup found at {}, continuing without layers.",
            stackup_file_path.display()
        );
    }


    let configuration = registry::install(configuration);

    info!(
        "Configuration loaded: {} ports ({} excited), {} differential pairs ({} valid), \
         {} traces ({} valid), {} metal and {} substrate layers, {} warnings.",
        configuration.ports.len(),
        configuration.excited_ports().count(),
        configuration.diff_pairs.len(),
        configuration.valid_differential_pairs().count(),
        configuration.traces.len(),
        configuration.valid_traces().count(),
        configuration.metals().len(),
        configuration.substrates().len(),
        configuration.warnings().len(),
    );

    if cli_args.print_resolved {
        let resolved = serde_json::to_string_pretty(configuration.as_ref())
            .into_diagnostic()
            .wrap_err("Failed to serialize resolved configuration.")?;
        println!("{resolved}");
    }


    drop(logging_raii_guard);
    Ok(())
}
