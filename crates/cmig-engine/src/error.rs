//! Input model errors

/// Raw input that cannot become a [`cmig_model::CommandUnit`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Name missing or blank
    #[error("command has no name")]
    MissingName,

    /// Name is not a usable identifier after normalization
    #[error("command name '{0}' is not a valid identifier")]
    InvalidName(String),

    /// Nothing the classifier could bind to
    #[error("command '{name}' declares no invocation method")]
    MissingInvocationMethod { name: String },
}
