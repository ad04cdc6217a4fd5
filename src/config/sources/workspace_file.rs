//! Workspace config file source: config/config.toml and config/{env}.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::{File, FileFormat};
use std::path::Path;
use tracing::debug;

pub const ENV_PROFILE_VAR: &str = "EKLAVYA_ENV";
const DEFAULT_PROFILE: &str = "development";

/// Add workspace config files to builder.
/// Precedence: config/config.toml (base) then config/{EKLAVYA_ENV}.toml (env-specific).
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let config_dir = workspace_root.join("config");
    let env_name = std::env::var(ENV_PROFILE_VAR).unwrap_or_else(|_| DEFAULT_PROFILE.to_string());

    let mut builder = builder;
    for path in [
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", env_name)),
    ] {
        if path.exists() {
            debug!(config_path = %path.display(), "Loading workspace configuration");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }
    }

    Ok(builder)
}
