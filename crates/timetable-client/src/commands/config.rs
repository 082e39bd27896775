//! Configuration commands.

use crate::config::{ClientConfig, ConfigError};
use crate::error::ClientResult;

/// Dump the current configuration to stdout, inline passwords masked.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted()).map_err(ConfigError::from)?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate()?;

    match config.resolve_credentials(None, None)? {
        Some(creds) => println!("Account: {}", creds.username()),
        None => println!("Account: not configured"),
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    println!("config: {}", ClientConfig::default_path().display());
    Ok(())
}
