//! Directory scans: bounded-concurrency batch with progress and streaming output.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use replate_core::{OutputWriter, ScanKind, ScanRecord, ScanResult};

use super::{open_output, ScanArgs, ScanContext};

/// Scan every discovered image, writing reports as they complete (JSONL) or
/// as one sorted array at the end (JSON).
///
/// Fails after writing output if any image could not be scanned.
pub async fn scan_batch(
    ctx: ScanContext,
    kind: ScanKind,
    args: &ScanArgs,
    files: Vec<PathBuf>,
) -> anyhow::Result<()> {
    let total = files.len();
    let progress = create_progress_bar(total as u64);
    let start_time = Instant::now();

    let streaming = ctx.output_format.is_streaming();
    let mut writer = OutputWriter::new(
        open_output(args.output.as_deref())?,
        ctx.output_format,
        ctx.pretty,
    );

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ScanResult>();
    let scanner = ctx.scanner;
    let handle = tokio::spawn(async move {
        scanner
            .scan_batch(kind, &files, move |result| {
                let _ = tx.send(result);
            })
            .await
    });

    let mut collected = Vec::new();
    let mut tally = StatusTally::default();
    let mut done = 0usize;

    while let Some(result) = rx.recv().await {
        match result {
            ScanResult::Success(record) => {
                tally.add(&record);
                if streaming {
                    writer.write(&record)?;
                } else {
                    collected.push(record);
                }
            }
            ScanResult::Failure(path, msg) => {
                tracing::error!("Failed: {:?} - {}", path, msg);
            }
        }

        done += 1;
        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            progress.set_message(format!("{:.1} img/sec", done as f64 / elapsed));
        }
    }

    let (succeeded, failed) = handle.await?;

    if !streaming {
        collected.sort_by(|a, b| a.file_path().cmp(b.file_path()));
        writer.write_all(&collected)?;
    }
    writer.flush()?;
    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }

    progress.finish_and_clear();
    print_summary(kind, succeeded, failed, &tally, start_time.elapsed());

    if failed > 0 {
        anyhow::bail!("{failed} of {total} image(s) could not be scanned");
    }
    Ok(())
}

/// Count of reports per status label.
#[derive(Debug, Default)]
struct StatusTally {
    counts: BTreeMap<&'static str, usize>,
}

impl StatusTally {
    fn add(&mut self, record: &ScanRecord) {
        *self.counts.entry(status_label(record)).or_default() += 1;
    }
}

/// Expiry bucket, or dashboard status for food.
fn status_label(record: &ScanRecord) -> &'static str {
    use replate_core::ExpiryStatus;

    match record {
        ScanRecord::Expiry(report) => match report.status {
            Some(ExpiryStatus::Expired) => "Expired",
            Some(ExpiryStatus::Critical) => "Critical",
            Some(ExpiryStatus::Good) => "Good",
            None => "No date",
        },
        ScanRecord::Food(report) => report.dashboard_status.unwrap_or("Unclassified"),
    }
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    )
    .map(|style| style.progress_chars("##-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

fn print_summary(
    kind: ScanKind,
    succeeded: usize,
    failed: usize,
    tally: &StatusTally,
    elapsed: Duration,
) {
    let total = succeeded + failed;
    let rate = if elapsed.as_secs_f64() > 0.0 {
        total as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("           {:^14}", format!("{kind} summary"));
    eprintln!("  ====================================");
    for (label, count) in &tally.counts {
        eprintln!("    {:<14}{:>8}", format!("{label}:"), count);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Succeeded:    {:>8}", succeeded);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}
