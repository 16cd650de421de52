mod database;
mod logging;

pub use database::init_store;
pub use logging::init_logging;

use ferrous_names_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)?;
    config.validate()?;
    if let Some(source) = path.map(str::to_string).or_else(Config::get_config_path) {
        info!(path = %source, "Configuration loaded");
    }
    Ok(config)
}
