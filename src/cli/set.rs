//! Set subcommand for ccfg
//!
//! Sets config values on a component or one of its subcomponents for a
//! single environment, then writes the environment file back.

use super::{resolve_environment, subcomponent_path};
use crate::config::{ComponentConfig, ConfigStore, KeyPath, SettingValue, SettingsTree};
use crate::error::ConfigError;
use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the set subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct SetArgs {
    /// Environment to write to (default: common)
    #[arg(long, value_name = "NAME")]
    pub environment: Option<String>,

    /// Dot-delimited subcomponent path, e.g. `myapp.mysubcomponent`
    #[arg(long, value_name = "PATH")]
    pub subcomponent: Option<String>,

    /// Only update keys that already exist
    #[arg(long)]
    pub no_new_config_keys: bool,

    /// YAML file whose settings are applied as if passed on the command line
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Assignments of the form `data.replicas=3`
    #[arg(value_name = "KEY=VALUE")]
    pub values: Vec<String>,
}

/// Split `key=value` on the first `=`.
pub fn parse_assignment(raw: &str) -> Result<(KeyPath, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("'{}' is not a KEY=VALUE assignment", raw);
    };
    Ok((KeyPath::parse(key)?, value.to_string()))
}

/// Read a YAML settings file into (path, value) assignments. Values keep
/// the type they have in the file; lists are assigned whole.
pub fn read_assignments_file(path: &Path) -> Result<Vec<(KeyPath, SettingValue)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let tree: SettingsTree = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse settings from {}", path.display()))?;
    Ok(tree.flatten())
}

/// Run the set command against the component in `dir`.
pub fn run_set(store: &dyn ConfigStore, dir: &Path, args: &SetArgs) -> Result<()> {
    let environment = resolve_environment(args.environment.as_deref());
    let subcomponent = subcomponent_path(args.subcomponent.as_deref());

    let mut assignments = Vec::new();
    if let Some(ref file) = args.file {
        assignments.extend(read_assignments_file(file)?);
    }
    for raw in &args.values {
        let (path, value) = parse_assignment(raw)?;
        assignments.push((path, SettingValue::from(value)));
    }
    if assignments.is_empty() {
        bail!("'set' takes one or more KEY=VALUE assignments or a --file");
    }

    let mut config = ComponentConfig::new(dir);
    config.load(store, &environment)?;

    for (path, value) in &assignments {
        if args.no_new_config_keys && !config.has_value(&subcomponent, path) {
            return Err(ConfigError::key_not_allowed(
                &path.to_string(),
                &subcomponent.join("."),
            )
            .into());
        }
        config.set_value(&subcomponent, path, value.clone())?;
    }

    config.write(store, &environment)?;
    Ok(())
}
