//! Built-in defaults applied beneath every other configuration layer.

use crate::slot::SLOT_PREFIX;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Default number of transitive resolution passes.
pub const DEFAULT_MAX_RESOLVE_DEPTH: usize = 16;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("registry.slot_prefix", SLOT_PREFIX)?
        .set_default("registry.max_resolve_depth", DEFAULT_MAX_RESOLVE_DEPTH as u64)?
        .set_default("logging.level", "info")
}
