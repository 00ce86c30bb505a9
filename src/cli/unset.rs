//! Unset subcommand for ccfg
//!
//! Deletes config keys from a component or subcomponent for one environment,
//! or removes a subcomponent's configuration entirely.

use super::{resolve_environment, subcomponent_path};
use crate::config::{ComponentConfig, ConfigStore, KeyPath};
use anyhow::{Result, bail};
use clap::Args;
use std::path::Path;

/// Arguments for the unset subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct UnsetArgs {
    /// Environment to remove from (default: common)
    #[arg(long, value_name = "NAME")]
    pub environment: Option<String>,

    /// Dot-delimited subcomponent path, e.g. `myapp.mysubcomponent`
    #[arg(long, value_name = "PATH")]
    pub subcomponent: Option<String>,

    /// Remove the configuration of the subcomponent named by --subcomponent
    #[arg(long, conflicts_with = "keys")]
    pub remove_component: bool,

    /// Keys to remove, e.g. `data.replicas`
    #[arg(value_name = "KEY")]
    pub keys: Vec<String>,
}

/// Run the unset command against the component in `dir`.
///
/// Keys are removed in order; the first failure aborts the command and
/// nothing is written.
pub fn run_unset(store: &dyn ConfigStore, dir: &Path, args: &UnsetArgs) -> Result<()> {
    let environment = resolve_environment(args.environment.as_deref());

    let mut config = ComponentConfig::new(dir);

    if args.remove_component {
        if !args.keys.is_empty() {
            bail!(
                "--remove-component removes the whole subcomponent and does not take keys: {}",
                args.keys.join(", ")
            );
        }
        let Some(target) = KeyPath::from_segments(subcomponent_path(args.subcomponent.as_deref()))
        else {
            bail!("--remove-component requires a --subcomponent to remove");
        };
        config.load(store, &environment)?;
        config.remove_subcomponent(&target)?;
    } else {
        if args.keys.is_empty() {
            bail!("'unset' takes one or more keys to remove");
        }
        let keys = args
            .keys
            .iter()
            .map(|raw| KeyPath::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let subcomponent = subcomponent_path(args.subcomponent.as_deref());

        config.load(store, &environment)?;
        for key in &keys {
            config.unset_value(&subcomponent, key)?;
        }
    }

    config.write(store, &environment)?;
    Ok(())
}
