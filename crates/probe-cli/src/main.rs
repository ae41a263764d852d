//! Shopprobe CLI: run the Swag Labs acceptance suites
//!
//! ## Usage
//!
//! ```bash
//! shopprobe run                          # Every suite on the in-memory storefront
//! shopprobe run --suite cart --parallel  # Cart rows concurrently
//! shopprobe run --format json            # Machine-readable report
//! shopprobe list                         # Suites and scenarios
//! shopprobe config --show                # Effective application config
//! ```

use clap::Parser;
use shopprobe::{init_tracing, suites, LogFormat};
use shopprobe_cli::{
    load_app_config, run_suites, Cli, CliConfig, CliError, CliResult, Commands, ConfigArgs,
    FormatArg, Reporter, RunArgs, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into());

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(config.verbosity.log_level(), format);

    match cli.command {
        Commands::Run(args) => run_command(&config, &args),
        Commands::List => list_suites(),
        Commands::Config(args) => show_config(&args),
    }
}

fn run_command(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let app = load_app_config(args.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(run_suites(args, app))?;

    let reporter = Reporter::new(config);
    match args.format {
        FormatArg::Text => reporter.text(&report)?,
        FormatArg::Json => reporter.json(&report)?,
    }

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::test_execution(format!(
            "{} of {} row(s) failed, {} scenario(s) could not run",
            report.failed_rows(),
            report.total_rows(),
            report.errors.len()
        )))
    }
}

fn list_suites() -> CliResult<()> {
    for suite in suites::all()? {
        println!("{}", suite.name());
        for scenario in suite.scenarios() {
            let rows = scenario.rows()?.len();
            println!("  {} ({rows} row(s))", scenario.name());
        }
    }
    Ok(())
}

fn show_config(args: &ConfigArgs) -> CliResult<()> {
    let app = load_app_config(args.config.as_deref())?;
    if args.show {
        print!("{}", app.to_yaml()?);
    } else {
        println!("Base URL: {}", app.base_url);
        println!("Standard user: {}", app.standard_user.username);
        println!("Use --show for the full configuration.");
    }
    Ok(())
}
