//! Suite execution for the `run` command

use crate::commands::{DriverArg, RunArgs};
use crate::error::{CliError, CliResult};
use shopprobe::mock::MockSessions;
use shopprobe::{suites, AppConfig, ExecutorConfig, ScenarioExecutor, SessionFactory, SuiteReport};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Load the application config from `path` (or defaults), then apply
/// environment overrides and validate
pub fn load_app_config(path: Option<&Path>) -> CliResult<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Executor settings from command-line flags
#[must_use]
pub fn executor_config(args: &RunArgs) -> ExecutorConfig {
    let config = ExecutorConfig::new().parallel(args.parallel);
    match args.timeout_ms {
        Some(ms) => config.row_timeout(Duration::from_millis(ms)),
        None => config,
    }
}

/// Run the selected suites and merge their reports
pub async fn run_suites(args: &RunArgs, app: AppConfig) -> CliResult<SuiteReport> {
    let selected = suites::by_name(args.suite.as_str())?;
    let sessions = open_sessions(args).await?;
    let executor =
        ScenarioExecutor::new(sessions, Arc::new(app)).with_config(executor_config(args));

    let mut report = SuiteReport::new(args.suite.as_str());
    for suite in &selected {
        info!(suite = suite.name(), "running suite");
        report.merge(executor.run_suite(suite).await);
    }
    Ok(report)
}

#[cfg(feature = "browser")]
async fn open_sessions(args: &RunArgs) -> CliResult<Arc<dyn SessionFactory>> {
    match args.driver {
        DriverArg::Mock => Ok(Arc::new(MockSessions::new())),
        DriverArg::Chromium => {
            let config = shopprobe::DriverConfig::new().headless(!args.headed);
            Ok(Arc::new(shopprobe::ChromiumSessions::launch(config).await?))
        }
    }
}

#[cfg(not(feature = "browser"))]
async fn open_sessions(args: &RunArgs) -> CliResult<Arc<dyn SessionFactory>> {
    match args.driver {
        DriverArg::Mock if args.headed => Err(CliError::invalid_argument(
            "--headed requires the chromium driver",
        )),
        DriverArg::Mock => Ok(Arc::new(MockSessions::new())),
        DriverArg::Chromium => Err(CliError::config(
            "chromium driver not enabled. Rebuild with --features browser",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{FormatArg, SuiteArg};
    use std::io::Write;

    fn args(suite: SuiteArg) -> RunArgs {
        RunArgs {
            suite,
            parallel: false,
            timeout_ms: None,
            format: FormatArg::Text,
            config: None,
            driver: DriverArg::Mock,
            headed: false,
        }
    }

    #[test]
    fn test_executor_config_from_flags() {
        let mut run = args(SuiteArg::All);
        run.parallel = true;
        run.timeout_ms = Some(250);
        let config = executor_config(&run);
        assert!(config.parallel);
        assert_eq!(config.row_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_load_yaml_config_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "base_url: http://localhost:3000/").unwrap();
        let config = load_app_config(Some(file.path())).unwrap();
        assert!(config.login_url().starts_with("http"));
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let err = load_app_config(Some(Path::new("/nonexistent/shopprobe.yaml"))).unwrap_err();
        assert!(matches!(err, CliError::Probe(_)));
    }

    #[tokio::test]
    async fn test_run_cart_suite_on_mock() {
        let report = run_suites(&args(SuiteArg::Cart), AppConfig::default())
            .await
            .unwrap();
        assert!(report.all_passed(), "{report}");
        assert_eq!(report.suite, "cart");
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_chromium_without_feature_is_config_error() {
        let mut run = args(SuiteArg::Login);
        run.driver = DriverArg::Chromium;
        let err = run_suites(&run, AppConfig::default()).await.unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }
}
