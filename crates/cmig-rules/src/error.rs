//! Error types for rule table loading

use cmig_model::LayerKind;
use std::path::PathBuf;

/// Errors while loading or validating a rule table
///
/// Every variant makes the table unavailable; no conversion may run
/// against a table that failed to load.
#[derive(Debug, thiserror::Error)]
pub enum RuleTableError {
    /// IO error while reading the table file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File extension does not name a supported format
    #[error("unsupported rule table format: '{0}'")]
    UnsupportedFormat(String),

    /// Document could not be parsed
    #[error("{format} syntax error: {message}")]
    Syntax {
        format: &'static str,
        message: String,
    },

    /// Document could not be written back out
    #[error("cannot serialize rule table as {format}: {message}")]
    Serialize {
        format: &'static str,
        message: String,
    },

    /// No rules at all
    #[error("rule table declares no rules")]
    Empty,

    /// Lookup would not be total
    #[error("rule table has no Generic fallback rule")]
    MissingGeneric,

    /// A shape requested a layer that is always derived
    #[error("rule #{rule} lists derived layer {layer} in its target shape")]
    DerivedLayerInShape { rule: usize, layer: LayerKind },

    /// A background-task rule with an entry point in its shape
    #[error("rule #{rule} gives background tasks an EntryPoint layer")]
    EntryPointForBackgroundTask { rule: usize },

    /// A binding or field rule with a blank name
    #[error("rule table entry {what} has an empty name")]
    EmptyName { what: String },
}

impl RuleTableError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn syntax(format: &'static str, message: impl ToString) -> Self {
        Self::Syntax {
            format,
            message: message.to_string(),
        }
    }

    pub fn empty_name(what: impl Into<String>) -> Self {
        Self::EmptyName { what: what.into() }
    }
}

pub type Result<T> = std::result::Result<T, RuleTableError>;
