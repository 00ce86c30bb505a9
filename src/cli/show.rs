//! Show subcommand for ccfg
//!
//! Prints a component's configuration with several environments layered:
//! the first `--environment` has the highest precedence.

use super::{resolve_environment, subcomponent_path};
use crate::config::{ComponentConfig, ConfigStore, Serialization};
use crate::error::ConfigError;
use anyhow::{Result, anyhow};
use clap::Args;
use std::path::Path;

/// Arguments for the show subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ShowArgs {
    /// Environments to layer, highest precedence first (default: common)
    #[arg(long = "environment", value_name = "NAME")]
    pub environments: Vec<String>,

    /// Dot-delimited subcomponent path to print instead of the whole component
    #[arg(long, value_name = "PATH")]
    pub subcomponent: Option<String>,

    /// Output format: yaml (default) or json
    #[arg(long, default_value = "yaml", value_name = "FORMAT")]
    pub format: String,
}

/// Load and merge the requested environments, returning the rendered result.
pub fn run_show(store: &dyn ConfigStore, dir: &Path, args: &ShowArgs) -> Result<String> {
    let format = Serialization::from_str(&args.format).ok_or_else(|| {
        anyhow!(
            "Invalid format '{}'. Valid options: yaml, json",
            args.format
        )
    })?;

    let environments = if args.environments.is_empty() {
        vec![resolve_environment(None)]
    } else {
        args.environments.clone()
    };

    let mut config = ComponentConfig::new(dir);
    config.load(store, &environments[0])?;
    for environment in &environments[1..] {
        config.merge_config_file(store, dir, environment)?;
    }

    let path = subcomponent_path(args.subcomponent.as_deref());
    let mut selected = &config;
    for (depth, name) in path.iter().enumerate() {
        selected = selected.subcomponents.get(name).ok_or_else(|| {
            ConfigError::subcomponent_not_found(name, &path[..=depth].join("."), &path.join("."))
        })?;
    }

    let bytes = format.encode(selected)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
