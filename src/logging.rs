use std::path::Path;

use miette::{miette, Context, IntoDiagnostic, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
    Registry,
};


/// Sets up console and file logging.
///
/// The returned guard flushes the file writer when dropped, so keep it alive
/// until the program exits.
pub fn initialize_tracing<P: AsRef<Path>>(
    console_level_filter: EnvFilter,
    log_file_level_filter: EnvFilter,
    log_directory: P,
    log_file_name: &str,
) -> Result<WorkerGuard> {
    let log_directory = log_directory.as_ref();

    std::fs::create_dir_all(log_directory)
        .into_diagnostic()
        .wrap_err_with(|| {
            miette!(
                "Failed to create log file output directory at {}.",
                log_directory.display()
            )
        })?;


    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_level_filter);

    let file_appender = tracing_appender::rolling::never(log_directory, log_file_name);
    let (non_blocking_file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(non_blocking_file_writer)
        .with_filter(log_file_level_filter);


    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .into_diagnostic()
        .wrap_err("Failed to initialize tracing subscriber.")?;

    Ok(guard)
}
