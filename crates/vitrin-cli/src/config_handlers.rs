//! `vitrin config` commands.
//!
//! `get` and `export` work on the effective configuration: the file with
//! the `VITRIN_*` overlay applied. `get page_url` reports the page URL the
//! renderer would use, derived from the source when none is configured.

use std::path::{Path, PathBuf};

use vitrin_core::{Error, Result};

use crate::cli::ConfigAction;
use crate::config::{VitrinConfig, env_var_name};

/// Handle a config action.
///
/// Takes the raw `--config` path because `path` and `init` run before a
/// config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = VitrinConfig::resolve_config_path(config_path)
                .ok_or_else(|| Error::config("no config directory on this platform"))?;
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("(not created yet; run `vitrin config init`)");
            }
            Ok(())
        }
        ConfigAction::Get { key } => {
            let config = VitrinConfig::load(config_path)?;
            println!("{}", effective_value(&config, &key)?);
            let var = env_var_name(&key);
            if std::env::var_os(&var).is_some() {
                eprintln!("(from {var})");
            }
            Ok(())
        }
        ConfigAction::Init {
            file,
            source,
            force,
        } => {
            let path = match file {
                Some(p) => PathBuf::from(p),
                None => VitrinConfig::default_config_path()
                    .ok_or_else(|| Error::config("no config directory on this platform"))?,
            };
            write_initial_config(&path, source.as_deref(), force)?;
            println!("Config file created at {}", path.display());
            Ok(())
        }
        ConfigAction::Export => {
            let config = VitrinConfig::load(config_path)?;
            for (key, value) in config.to_env_vars()? {
                println!("{key}={value}");
            }
            Ok(())
        }
    }
}

/// The effective value of a dotted setting.
///
/// Only leaf settings are accepted; anything else lists the known keys.
pub fn effective_value(config: &VitrinConfig, key: &str) -> Result<String> {
    if key == "page_url" {
        return Ok(config.resolve_page_url()?.to_string());
    }
    let settings = config.settings()?;
    settings
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.clone())
        .ok_or_else(|| {
            let known: Vec<&str> = settings
                .iter()
                .map(|(name, _)| name.as_str())
                .filter(|name| *name != "page_url")
                .chain(std::iter::once("page_url"))
                .collect();
            Error::config(format!(
                "unknown setting '{key}'; known settings: {}",
                known.join(", ")
            ))
        })
}

/// Write a default config, pointed at `source` when given.
pub fn write_initial_config(path: &Path, source: Option<&str>, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }

    let mut config = VitrinConfig::default();
    if let Some(source) = source {
        config.source.url = source.to_string();
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    std::fs::write(path, config.to_toml_string()?).map_err(|e| Error::io_with_path(e, path))
}
