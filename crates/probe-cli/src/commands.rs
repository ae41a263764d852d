//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shopprobe: acceptance tests for the Swag Labs storefront
#[derive(Parser, Debug)]
#[command(name = "shopprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run acceptance suites
    Run(RunArgs),

    /// List suites and their scenarios
    List,

    /// Show the effective application configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Suite to run
    #[arg(short, long, value_enum, default_value = "all")]
    pub suite: SuiteArg,

    /// Run the rows of each scenario concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Fail a row that runs longer than this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Application config file (YAML or JSON)
    #[arg(short, long, env = "SHOPPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Page driver
    #[arg(short, long, value_enum, default_value = "mock")]
    pub driver: DriverArg,

    /// Show the browser window (chromium driver only)
    #[arg(long)]
    pub headed: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Print the configuration as YAML
    #[arg(long)]
    pub show: bool,

    /// Application config file (YAML or JSON)
    #[arg(short, long, env = "SHOPPROBE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Suite selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuiteArg {
    /// Logging on
    Login,
    /// Browsing the catalog
    Catalog,
    /// Adding items to the cart
    Cart,
    /// Every suite
    #[default]
    All,
}

impl SuiteArg {
    /// Name understood by `shopprobe::suites::by_name`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Catalog => "catalog",
            Self::Cart => "cart",
            Self::All => "all",
        }
    }
}

/// Report format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
}

/// Page driver selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverArg {
    /// In-memory storefront
    #[default]
    Mock,
    /// Real chromium over CDP
    Chromium,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
