//! CMIG Core
//!
//! The orchestrator: runs the pure stages of `cmig-engine` for each job,
//! assembles fingerprinted [`ConversionResult`]s, converts batches in
//! parallel and writes directory conversions to disk. This is the only
//! crate in the workspace that touches the filesystem.
//!
//! ```rust,ignore
//! let config = ConverterConfig::from_path("cmig.toml")?;
//! let converter = Converter::new(config.rule_table()?, config.clone());
//! let summary = converter.convert_dir(input, &config.output_dir, Some(&config.renderer()?))?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod converter;
mod error;
mod result;

/// Directory conversion
pub mod batch;

pub use batch::{BatchSummary, FileOutcome, FileStatus};
pub use config::ConverterConfig;
pub use converter::{Conversion, Converter};
pub use error::{BatchError, ConfigError, ConversionError, ErrorReason};
pub use result::ConversionResult;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
