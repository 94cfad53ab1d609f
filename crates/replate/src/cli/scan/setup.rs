//! Scanner setup: flag overrides, provider creation, output format.

use chrono::NaiveDate;
use replate_core::{Config, OutputFormat as CoreOutputFormat, ProviderFactory, ScanOptions, Scanner};

use super::types::OutputFormat;
use super::{ScanArgs, ScanContext};

/// Validate input and build the scanner from the already loaded config.
pub fn setup_scanner(
    args: &ScanArgs,
    today: Option<NaiveDate>,
    config: Config,
) -> anyhow::Result<ScanContext> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    let provider = ProviderFactory::create(
        &config.llm.provider,
        &config.llm,
        args.llm_model.as_deref(),
        args.api_key.as_deref(),
    )?;
    tracing::info!("Using {} vision provider", provider.name());

    let options = scan_options(args, &config, today);
    tracing::debug!(
        "Reference date {}, critical window {} day(s), {} worker(s)",
        options.today,
        options.critical_window_days,
        options.parallel
    );

    Ok(ScanContext {
        scanner: Scanner::new(provider, options),
        output_format: output_format(args.format, &config),
        pretty: config.output.pretty,
        config,
    })
}

fn scan_options(args: &ScanArgs, config: &Config, today: Option<NaiveDate>) -> ScanOptions {
    let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut options = ScanOptions::from_config(config, today);
    if let Some(parallel) = args.parallel {
        options.parallel = parallel.max(1);
    }
    options
}

/// `--format` wins over `output.format`.
fn output_format(flag: Option<OutputFormat>, config: &Config) -> CoreOutputFormat {
    flag.map(CoreOutputFormat::from)
        .or_else(|| CoreOutputFormat::parse(&config.output.format))
        .unwrap_or(CoreOutputFormat::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_input_has_hint() {
        let args = ScanArgs {
            input: PathBuf::from("/nonexistent/shelf"),
            ..ScanArgs::default()
        };
        let err = setup_scanner(&args, None, Config::default()).err().unwrap();
        assert!(err.to_string().contains("Hint"));
    }

    #[test]
    fn test_uses_passed_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.output.format = "jsonl".to_string();
        config.output.pretty = true;
        let args = ScanArgs {
            input: dir.path().to_path_buf(),
            api_key: Some("test-key".to_string()),
            ..ScanArgs::default()
        };

        let ctx = setup_scanner(&args, None, config).unwrap();
        assert_eq!(ctx.output_format, CoreOutputFormat::JsonLines);
        assert!(ctx.pretty);
        assert_eq!(ctx.config.output.format, "jsonl");
    }

    #[test]
    fn test_scan_options_overrides() {
        let config = Config::default();
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        let args = ScanArgs {
            parallel: Some(0),
            ..ScanArgs::default()
        };
        let options = scan_options(&args, &config, Some(today));
        assert_eq!(options.parallel, 1);
        assert_eq!(options.today, today);
        assert_eq!(options.critical_window_days, 5);

        let options = scan_options(&ScanArgs::default(), &config, Some(today));
        assert_eq!(options.parallel, 4);
    }

    #[test]
    fn test_output_format_resolution() {
        let mut config = Config::default();
        assert_eq!(output_format(None, &config), CoreOutputFormat::Json);

        config.output.format = "jsonl".to_string();
        assert_eq!(output_format(None, &config), CoreOutputFormat::JsonLines);
        assert_eq!(
            output_format(Some(OutputFormat::Json), &config),
            CoreOutputFormat::Json
        );
    }
}
