//! The `replate expiry` and `replate classify` commands.

mod batch;
mod setup;
pub mod types;

pub use types::OutputFormat;

use chrono::NaiveDate;
use clap::Args;
use replate_core::pipeline::FileDiscovery;
use replate_core::{Config, OutputFormat as CoreOutputFormat, ScanKind, ScanRecord, Scanner};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use batch::scan_batch;
use setup::setup_scanner;

/// Arguments shared by both scan commands.
#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// Image file or directory to scan
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to `output.format` from config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of images scanned concurrently (defaults to config)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Gemini model name (defaults to `llm.gemini.model` from config)
    #[arg(long)]
    pub llm_model: Option<String>,

    /// API key for the selected provider, overriding config and env
    #[arg(long, env = "REPLATE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Arguments for the `expiry` command.
#[derive(Args, Debug)]
pub struct ExpiryArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Reference date for bucketing, YYYY-MM-DD (defaults to today)
    #[arg(long, value_parser = parse_today)]
    pub today: Option<NaiveDate>,
}

fn parse_today(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// Everything a scan run needs, assembled by `setup_scanner()`.
pub(crate) struct ScanContext {
    pub scanner: Scanner,
    pub output_format: CoreOutputFormat,
    pub pretty: bool,
    pub config: Config,
}

pub async fn execute(
    kind: ScanKind,
    args: ScanArgs,
    today: Option<NaiveDate>,
    config: Config,
) -> anyhow::Result<()> {
    let ctx = setup_scanner(&args, today, config)?;

    let files = FileDiscovery::new(ctx.config.processing.clone()).discover(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) for {kind}", files.len());

    if args.input.is_file() {
        scan_single(ctx, kind, &args).await
    } else {
        scan_batch(ctx, kind, &args, files).await
    }
}

async fn scan_single(ctx: ScanContext, kind: ScanKind, args: &ScanArgs) -> anyhow::Result<()> {
    let record = match kind {
        ScanKind::Expiry => ScanRecord::Expiry(ctx.scanner.scan_expiry(&args.input).await?),
        ScanKind::Classify => ScanRecord::Food(ctx.scanner.classify_food(&args.input).await?),
    };

    let mut writer = replate_core::OutputWriter::new(
        open_output(args.output.as_deref())?,
        ctx.output_format,
        ctx.pretty,
    );
    writer.write(&record)?;
    writer.flush()?;

    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }
    Ok(())
}

/// A buffered file when `path` is given, stdout otherwise.
pub(crate) fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write + Send>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    })
}
