//! Re-plate Core - expiry-date and food-freshness scanning.
//!
//! Re-plate sends a photo to a hosted vision model and turns the model's
//! free-text reply into structured data: either a printed expiry date
//! bucketed against today, or a food item's name, condition and type.
//!
//! # Architecture
//!
//! ```text
//! Image → Validate → Load/Downscale → Vision model → Parse reply → JSON
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use replate_core::{Config, ProviderFactory, ScanOptions, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let provider = ProviderFactory::create(&config.llm.provider, &config.llm, None, None)?;
//!     let today = chrono::Local::now().date_naive();
//!     let scanner = Scanner::new(provider, ScanOptions::from_config(&config, today));
//!
//!     let report = scanner.scan_expiry("./yogurt.jpg".as_ref()).await?;
//!     println!("{:?} {:?}", report.expiry_date, report.status);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod expiry;
pub mod food;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod scan;

pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, ReplateError, Result};
pub use expiry::{ExpiryReport, ExpiryStatus};
pub use food::{FoodClassification, FoodReport};
pub use llm::{ProviderFactory, VisionProvider};
pub use output::{OutputFormat, OutputWriter};
pub use scan::{ScanKind, ScanOptions, ScanRecord, ScanResult, Scanner};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
