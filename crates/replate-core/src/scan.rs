//! Scan orchestration: validate, load, ask the model, parse the reply.
//!
//! A [`Scanner`] runs either flow on a single image, or on a batch of images
//! with bounded concurrency (semaphore). Batch results are delivered through
//! a callback as they complete so the CLI can stream JSONL.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::{Config, LimitsConfig};
use crate::error::PipelineError;
use crate::expiry::{ExpiryReport, EXPIRY_PROMPT};
use crate::food::{self, FoodReport};
use crate::llm::{self, RetryPolicy, VisionProvider, VisionRequest, VisionResponse};
use crate::pipeline::{ImageLoader, Validator};

/// Settings for a scan run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum concurrent model calls in batch mode
    pub parallel: usize,
    /// Timeout and retry policy per model call
    pub retry: RetryPolicy,
    /// File size and upload dimension limits
    pub limits: LimitsConfig,
    /// Days ahead of `today` that still count as `Critical`
    pub critical_window_days: u32,
    /// Reference date for expiry bucketing
    pub today: NaiveDate,
}

impl ScanOptions {
    pub fn from_config(config: &Config, today: NaiveDate) -> Self {
        Self {
            parallel: config.processing.parallel_workers,
            retry: RetryPolicy {
                timeout_ms: config.limits.llm_timeout_ms,
                retry_attempts: config.pipeline.retry_attempts,
                retry_delay_ms: config.pipeline.retry_delay_ms,
            },
            limits: config.limits.clone(),
            critical_window_days: config.expiry.critical_window_days,
            today,
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from_config(&Config::default(), chrono::Local::now().date_naive())
    }
}

/// Which flow to run on an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// Read the printed expiry date
    Expiry,
    /// Classify food name, condition and type
    Classify,
}

impl fmt::Display for ScanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanKind::Expiry => write!(f, "expiry"),
            ScanKind::Classify => write!(f, "classify"),
        }
    }
}

/// Output record of either flow.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScanRecord {
    Expiry(ExpiryReport),
    Food(FoodReport),
}

impl ScanRecord {
    pub fn file_path(&self) -> &Path {
        match self {
            ScanRecord::Expiry(report) => &report.file_path,
            ScanRecord::Food(report) => &report.file_path,
        }
    }
}

/// Result of scanning a single image in a batch.
#[derive(Debug)]
pub enum ScanResult {
    Success(ScanRecord),
    Failure(PathBuf, String),
}

/// Runs the expiry and classification flows against a vision provider.
pub struct Scanner {
    provider: Arc<dyn VisionProvider>,
    options: ScanOptions,
}

impl Scanner {
    pub fn new(provider: Box<dyn VisionProvider>, options: ScanOptions) -> Self {
        Self {
            provider: Arc::from(provider),
            options,
        }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Read and bucket the expiry date printed on a package.
    pub async fn scan_expiry(&self, path: &Path) -> Result<ExpiryReport, PipelineError> {
        scan_expiry(self.provider.as_ref(), &self.options, path).await
    }

    /// Classify the food item in an image.
    pub async fn classify_food(&self, path: &Path) -> Result<FoodReport, PipelineError> {
        classify_food(self.provider.as_ref(), &self.options, path).await
    }

    /// Run one flow over many images.
    ///
    /// Spawns one tokio task per image, bounded by a semaphore. Calls
    /// `on_result` for each completed scan.
    ///
    /// Returns `(succeeded, failed)` counts.
    pub async fn scan_batch<F>(&self, kind: ScanKind, files: &[PathBuf], on_result: F) -> (usize, usize)
    where
        F: Fn(ScanResult) + Send + Sync + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.options.parallel.max(1)));
        let on_result = Arc::new(on_result);
        let mut handles = Vec::with_capacity(files.len());

        for path in files {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                tracing::warn!("Scan semaphore closed unexpectedly, stopping batch");
                break;
            };

            let provider = self.provider.clone();
            let options = self.options.clone();
            let on_result = on_result.clone();
            let path = path.clone();

            let handle = tokio::spawn(async move {
                let result = match scan_one(provider.as_ref(), &options, kind, &path).await {
                    Ok(record) => ScanResult::Success(record),
                    Err(e) => ScanResult::Failure(path, e.to_string()),
                };
                let success = matches!(&result, ScanResult::Success(_));
                drop(permit);
                on_result(result);
                success
            });

            handles.push(handle);
        }

        let mut succeeded = 0usize;
        let mut failed = 0usize;

        for handle in handles {
            match handle.await {
                Ok(true) => succeeded += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    tracing::error!("Scan task panicked: {e}");
                    failed += 1;
                }
            }
        }

        (succeeded, failed)
    }
}

async fn scan_one(
    provider: &dyn VisionProvider,
    options: &ScanOptions,
    kind: ScanKind,
    path: &Path,
) -> Result<ScanRecord, PipelineError> {
    match kind {
        ScanKind::Expiry => scan_expiry(provider, options, path).await.map(ScanRecord::Expiry),
        ScanKind::Classify => classify_food(provider, options, path).await.map(ScanRecord::Food),
    }
}

async fn scan_expiry(
    provider: &dyn VisionProvider,
    options: &ScanOptions,
    path: &Path,
) -> Result<ExpiryReport, PipelineError> {
    let response = ask_about(provider, options, path, EXPIRY_PROMPT.to_string()).await?;
    Ok(ExpiryReport::from_reply(
        path.to_path_buf(),
        &response.text,
        &response.model,
        options.today,
        options.critical_window_days,
    ))
}

async fn classify_food(
    provider: &dyn VisionProvider,
    options: &ScanOptions,
    path: &Path,
) -> Result<FoodReport, PipelineError> {
    let response = ask_about(provider, options, path, food::build_prompt()).await?;
    Ok(FoodReport::from_reply(
        path.to_path_buf(),
        &response.text,
        &response.model,
    ))
}

async fn ask_about(
    provider: &dyn VisionProvider,
    options: &ScanOptions,
    path: &Path,
    prompt: String,
) -> Result<VisionResponse, PipelineError> {
    Validator::new(options.limits.clone()).validate(path)?;
    let image = ImageLoader::new(options.limits.max_upload_dimension)
        .load(path)
        .await?;

    let request = VisionRequest::new(image, prompt);
    let response = llm::ask(provider, &request, &options.retry, path).await?;
    tracing::debug!("Raw reply for {:?}: {}", path, response.text);
    Ok(response)
}
