//! CLI command definitions for ccfg
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.
//!
//! ## Environment Variables
//! - `CCFG_DIR` - Component directory when `--dir` is not given
//! - `CCFG_ENVIRONMENT` - Environment when `--environment` is not given
//! - `CCFG_LOG` - Log target when `--log` is not given

pub mod set;
pub mod show;
pub mod unset;

use crate::config::split_path;
use clap::{Parser, Subcommand};
use set::SetArgs;
use show::ShowArgs;
use std::path::PathBuf;
use unset::UnsetArgs;

/// Environment used when neither a flag nor `CCFG_ENVIRONMENT` names one.
pub const DEFAULT_ENVIRONMENT: &str = "common";

/// Default log target (stderr).
pub const DEFAULT_LOG: &str = "2";

/// Manage per-environment configuration of a component and its subcomponents
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Component directory holding `config/<environment>.yaml` (default: .)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Set config values for a component or subcomponent
    Set(SetArgs),

    /// Remove config keys, or a whole subcomponent, from an environment
    Unset(UnsetArgs),

    /// Print the merged configuration of one or more environments
    Show(ShowArgs),
}

impl Cli {
    /// Fill options that were not given on the command line from the
    /// environment.
    pub fn apply_env_overrides(&mut self) {
        if self.dir.is_none() {
            if let Ok(dir) = std::env::var("CCFG_DIR") {
                self.dir = Some(PathBuf::from(dir));
            }
        }

        if self.log.is_none() {
            if let Ok(log) = std::env::var("CCFG_LOG") {
                self.log = Some(log);
            }
        }
    }

    pub fn component_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn log_target(&self) -> &str {
        self.log.as_deref().unwrap_or(DEFAULT_LOG)
    }
}

/// The environment named by a flag, else `CCFG_ENVIRONMENT`, else `common`.
pub fn resolve_environment(flag: Option<&str>) -> String {
    if let Some(environment) = flag {
        return environment.to_string();
    }
    std::env::var("CCFG_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string())
}

/// Subcomponent path from the `--subcomponent` flag; absent means the
/// component itself.
pub fn subcomponent_path(flag: Option<&str>) -> Vec<String> {
    flag.map(split_path).unwrap_or_default()
}
