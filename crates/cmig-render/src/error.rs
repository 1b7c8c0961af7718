//! Rendering errors

/// Errors while rendering an artifact set
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Base package is not a dotted list of identifiers
    #[error("invalid base package: '{0}'")]
    InvalidPackage(String),

    /// Formatting into the output buffer failed
    #[error("formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}
