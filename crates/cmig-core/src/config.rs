//! Converter configuration
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! rules = "rules/acme.yaml"
//! base_package = "com.acme.shop"
//! output_dir = "migrated"
//! render = true
//! threads = 4
//! strict = false
//! ```

use crate::error::{ConfigError, ConversionError};
use cmig_render::Renderer;
use cmig_rules::{default_table, loader, RuleTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Converter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    /// Rule table file; the built-in table when unset
    pub rules: Option<PathBuf>,
    /// Java package the renderer writes under
    pub base_package: String,
    /// Where rendered files go
    pub output_dir: PathBuf,
    /// Render target sources next to the result JSON
    pub render: bool,
    /// Batch worker threads, 0 for the rayon default
    pub threads: usize,
    /// Treat `Invalid` verdicts as failures
    pub strict: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            rules: None,
            base_package: Renderer::DEFAULT_PACKAGE.to_string(),
            output_dir: PathBuf::from("migrated"),
            render: true,
            threads: 0,
            strict: false,
        }
    }
}

impl ConverterConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML config file
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    #[inline]
    #[must_use]
    pub fn with_rules(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules = Some(path.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_base_package(mut self, package: impl Into<String>) -> Self {
        self.base_package = package.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The configured rule table, or the built-in one
    ///
    /// # Errors
    ///
    /// [`ErrorReason::RuleTableUnavailable`](crate::ErrorReason) when the
    /// file cannot be loaded.
    pub fn rule_table(&self) -> Result<Arc<RuleTable>, ConversionError> {
        match &self.rules {
            Some(path) => Ok(Arc::new(loader::load(path)?)),
            None => Ok(default_table()),
        }
    }

    /// Renderer for the configured base package
    ///
    /// # Errors
    ///
    /// [`ConfigError::Render`] for an invalid package name.
    pub fn renderer(&self) -> Result<Renderer, ConfigError> {
        Ok(Renderer::new(self.base_package.as_str())?)
    }
}
