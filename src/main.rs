//! ccfg
//!
//! Command-line front end for reading and editing per-environment component
//! configuration files.

use anyhow::Result;
use clap::Parser;
use component_config::cli::set::run_set;
use component_config::cli::show::run_show;
use component_config::cli::unset::run_unset;
use component_config::cli::{Cli, Command};
use component_config::config::FsStore;
use component_config::logging;
use tracing::debug;

fn main() -> Result<()> {
    let mut cli = Cli::parse();
    cli.apply_env_overrides();

    logging::init(cli.log_target(), cli.verbose)?;

    let dir = cli.component_dir();
    debug!(dir = %dir.display(), "Using component directory");
    let store = FsStore;

    match cli.command {
        Command::Set(ref args) => run_set(&store, &dir, args)?,
        Command::Unset(ref args) => run_unset(&store, &dir, args)?,
        Command::Show(ref args) => print!("{}", run_show(&store, &dir, args)?),
    }

    Ok(())
}
