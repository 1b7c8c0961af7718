//! Error types for CMIG Core
//!
//! Job-level failures are [`ConversionError`] values: they end one job and
//! serialize as `{ "error": ..., "detail": ... }`. Setup and filesystem
//! failures are [`ConfigError`] and [`BatchError`].

use cmig_engine::BuildError;
use cmig_render::RenderError;
use cmig_rules::RuleTableError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// Why a job produced no result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ErrorReason {
    /// Input is missing something the pipeline needs
    MalformedInput,
    /// No usable rule table
    RuleTableUnavailable,
    /// Stopped at a stage boundary
    Cancelled,
}

impl ErrorReason {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedInput => "MalformedInput",
            Self::RuleTableUnavailable => "RuleTableUnavailable",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl Display for ErrorReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of one conversion job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, thiserror::Error)]
#[error("{error}: {detail}")]
pub struct ConversionError {
    pub error: ErrorReason,
    pub detail: String,
}

impl ConversionError {
    #[must_use]
    pub fn new(error: ErrorReason, detail: impl Into<String>) -> Self {
        Self {
            error,
            detail: detail.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn malformed_input(detail: impl Into<String>) -> Self {
        Self::new(ErrorReason::MalformedInput, detail)
    }

    #[inline]
    #[must_use]
    pub fn rule_table_unavailable(detail: impl Into<String>) -> Self {
        Self::new(ErrorReason::RuleTableUnavailable, detail)
    }

    /// Cancelled before `stage` started
    #[inline]
    #[must_use]
    pub fn cancelled(stage: &str) -> Self {
        Self::new(ErrorReason::Cancelled, format!("cancelled before {stage}"))
    }

    #[inline]
    #[must_use]
    pub fn reason(&self) -> ErrorReason {
        self.error
    }
}

impl From<BuildError> for ConversionError {
    fn from(e: BuildError) -> Self {
        Self::malformed_input(e.to_string())
    }
}

impl From<RuleTableError> for ConversionError {
    fn from(e: RuleTableError) -> Self {
        Self::rule_table_unavailable(e.to_string())
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::ConverterConfig`]
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Base package rejected by the renderer
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Directory conversion errors that stop the whole batch
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Reading the input or writing the output tree failed
    #[error("{action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Result could not be encoded
    #[error("cannot encode result for {unit}: {source}")]
    Encode {
        unit: String,
        #[source]
        source: serde_json::Error,
    },

    /// Rendering a converted unit failed
    #[error("cannot render {unit}: {source}")]
    Render {
        unit: String,
        #[source]
        source: RenderError,
    },
}

impl BatchError {
    pub(crate) fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}
