//! Process-wide access to the finished configuration.
//!
//! Passing the [`SimulationConfiguration`] around explicitly is preferred.
//! The registry exists for pipeline stages that are invoked without one and
//! only hands out shared, read-only references.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use super::{configuration::SimulationConfiguration, error::ConfigurationError};


static INSTANCE: RwLock<Option<Arc<SimulationConfiguration>>> = parking_lot::const_rwlock(None);


/// Makes `configuration` globally available.
///
/// Only the first installation counts: later ones are ignored with a warning
/// and the already installed configuration is returned.
pub fn install(configuration: SimulationConfiguration) -> Arc<SimulationConfiguration> {
    let mut instance = INSTANCE.write();

    if let Some(existing) = instance.as_ref() {
        warn!("Config has already been instantiated. Use registry::get() to get the instance. Skipping");
        return Arc::clone(existing);
    }

    let configuration = Arc::new(configuration);
    *instance = Some(Arc::clone(&configuration));

    configuration
}

/// Returns the installed configuration.
pub fn get() -> Result<Arc<SimulationConfiguration>, ConfigurationError> {
    INSTANCE
        .read()
        .as_ref()
        .map(Arc::clone)
        .ok_or(ConfigurationError::NotInstalled)
}

pub fn is_installed() -> bool {
    INSTANCE.read().is_some()
}
