//! Component Config Library
//!
//! This module exports the configuration model, its storage backends, and
//! the command runners used by the `ccfg` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
