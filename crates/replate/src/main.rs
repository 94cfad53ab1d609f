//! Re-plate CLI - read expiry dates and judge food freshness from photos.
//!
//! Each image is sent to a hosted vision model; the reply is parsed into a
//! structured report and written as JSON or JSON Lines.
//!
//! # Usage
//!
//! ```bash
//! # Read the expiry date on a package
//! replate expiry yogurt.jpg
//!
//! # Classify every photo in a directory, streaming JSONL
//! replate classify ./donations/ --format jsonl --output results.jsonl
//!
//! # View configuration
//! replate config show
//! ```

use clap::{Parser, Subcommand};
use replate_core::ScanKind;

mod cli;
mod logging;

/// Re-plate - expiry-date and food-freshness scanning with hosted vision models.
#[derive(Parser, Debug)]
#[command(name = "replate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Read printed expiry dates and bucket them as Expired, Critical or Good
    Expiry(cli::scan::ExpiryArgs),

    /// Classify food name, condition and type
    Classify(cli::scan::ScanArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API keys may live in a .env file next to the photos
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Logging isn't up yet, so config problems go straight to stderr. The
    // same config is handed to the scan commands.
    let config = match replate_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `replate config path`."
            );
            replate_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Re-plate v{}", replate_core::VERSION);

    match cli.command {
        Commands::Expiry(args) => {
            cli::scan::execute(ScanKind::Expiry, args.scan, args.today, config).await
        }
        Commands::Classify(args) => {
            cli::scan::execute(ScanKind::Classify, args, None, config).await
        }
        Commands::Config(args) => cli::config::execute(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_expiry_with_today() {
        let cli = Cli::try_parse_from([
            "replate",
            "-v",
            "expiry",
            "label.jpg",
            "--today",
            "2026-10-16",
            "--llm-model",
            "gemini-2.5-flash",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Expiry(args) => {
                assert_eq!(args.today, NaiveDate::from_ymd_opt(2026, 10, 16));
                assert_eq!(args.scan.input, std::path::PathBuf::from("label.jpg"));
                assert_eq!(args.scan.llm_model.as_deref(), Some("gemini-2.5-flash"));
            }
            other => panic!("expected expiry command, got {other:?}"),
        }
    }

    #[test]
    fn test_llm_provider_flag_removed() {
        let result = Cli::try_parse_from(["replate", "classify", "a.jpg", "--llm", "ollama"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_classify_rejects_today_flag() {
        let result = Cli::try_parse_from(["replate", "classify", "a.jpg", "--today", "2026-10-16"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_today_rejected() {
        let result = Cli::try_parse_from(["replate", "expiry", "a.jpg", "--today", "16/10/2026"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_classify_jsonl() {
        let cli = Cli::try_parse_from([
            "replate", "--json-logs", "classify", "./photos", "-f", "jsonl", "-p", "2",
        ])
        .unwrap();
        assert!(cli.json_logs);
        match cli.command {
            Commands::Classify(args) => {
                assert!(matches!(args.format, Some(cli::scan::OutputFormat::Jsonl)));
                assert_eq!(args.parallel, Some(2));
            }
            other => panic!("expected classify command, got {other:?}"),
        }
    }
}
