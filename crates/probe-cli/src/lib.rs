//! Shopprobe CLI Library
//!
//! Command-line runner for the Swag Labs acceptance suites.

#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, DriverArg, FormatArg, RunArgs, SuiteArg};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;
pub use runner::{executor_config, load_app_config, run_suites};
