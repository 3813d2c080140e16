use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Installs the global fmt subscriber. Fails if one is already installed.
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("invalid log filter {:?}", config.filter))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.with_target(false).json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("install tracing subscriber: {e}"))
}
