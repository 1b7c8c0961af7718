//! CMIG Render
//!
//! Thin formatter from an [`ArtifactSet`] to source files for the target
//! stack: Spring REST controller, service/DAO/facade interfaces with
//! default implementations, DTOs, Spring bean XML, ImpEx headers and a
//! markdown list of unresolved references.
//!
//! Rendering is pure. Paths in [`RenderedFile`] are relative; writing them
//! is up to the caller.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod impex;
mod java;
mod report;
mod spring;

pub use error::RenderError;

use cmig_engine::UnresolvedReference;
use cmig_model::naming::{dto_for, is_valid_identifier, upper_camel};
use cmig_model::{ArtifactBody, ArtifactSet, FieldBinding};
use serde::Serialize;
use std::path::PathBuf;

/// One output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFile {
    /// Relative to the unit's output directory
    pub path: PathBuf,
    pub content: String,
}

impl RenderedFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Per-render naming context
pub(crate) struct Context<'a> {
    base: &'a str,
    unit: &'a str,
}

impl Context<'_> {
    pub(crate) fn package(&self, sub_package: &str) -> String {
        format!("{}.{sub_package}", self.base)
    }

    pub(crate) fn java_path(&self, package: &str, class: &str) -> PathBuf {
        let mut path = PathBuf::from("src/main/java");
        for segment in package.split('.') {
            path.push(segment);
        }
        path.push(format!("{class}.java"));
        path
    }

    /// Fully qualified name of a type generated for this unit
    pub(crate) fn unit_type(&self, simple: &str) -> Option<String> {
        if simple == "ResponseDTO" {
            return Some(self.package("dto.ResponseDTO"));
        }
        let suffix = simple.strip_prefix(&upper_camel(self.unit))?;
        let sub_package = match suffix {
            "Controller" => "controller",
            "Service" => "service",
            "DAO" => "dao",
            "Facade" => "facade",
            "DTO" => "dto",
            "Model" => "model",
            _ => return None,
        };
        Some(self.package(&format!("{sub_package}.{simple}")))
    }
}

/// Renders artifact sets under a base package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    base_package: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            base_package: Self::DEFAULT_PACKAGE.to_string(),
        }
    }
}

impl Renderer {
    pub const DEFAULT_PACKAGE: &'static str = "com.example";

    /// # Errors
    ///
    /// [`RenderError::InvalidPackage`] unless `base_package` is a dotted
    /// list of identifiers.
    pub fn new(base_package: impl Into<String>) -> Result<Self, RenderError> {
        let base_package = base_package.into();
        if base_package.split('.').all(is_valid_identifier) {
            Ok(Self { base_package })
        } else {
            Err(RenderError::InvalidPackage(base_package))
        }
    }

    #[inline]
    #[must_use]
    pub fn base_package(&self) -> &str {
        &self.base_package
    }

    /// Render every artifact of the set, plus shared DTOs and the
    /// unresolved list when there is something to report
    ///
    /// # Errors
    ///
    /// [`RenderError::Format`] if writing to an output buffer fails.
    pub fn render(
        &self,
        set: &ArtifactSet,
        unresolved: &[UnresolvedReference],
    ) -> Result<Vec<RenderedFile>, RenderError> {
        let ctx = Context {
            base: &self.base_package,
            unit: &set.unit,
        };
        let mut files = Vec::new();
        let mut dto_fields: Option<Vec<FieldBinding>> = None;
        let mut needs_response = false;

        for artifact in set.iter() {
            match &artifact.body {
                ArtifactBody::EntryPoint(body) => {
                    files.push(java::controller(&ctx, artifact, body)?);
                    if body.request_dto.is_some() && dto_fields.is_none() {
                        dto_fields = Some(body.request_body.clone());
                    }
                    needs_response = true;
                }
                ArtifactBody::Service(body) => files.extend(java::service(&ctx, artifact, body)?),
                ArtifactBody::DataAccess(body) => {
                    files.extend(java::data_access(&ctx, artifact, body)?);
                }
                ArtifactBody::Facade(body) => {
                    files.extend(java::facade(&ctx, artifact, body)?);
                    if !body.fields.is_empty() {
                        dto_fields = Some(body.fields.clone());
                    }
                    needs_response = true;
                }
                ArtifactBody::Wiring(body) => files.push(spring::beans(&ctx, artifact, body)?),
                ArtifactBody::BulkData(body) => files.push(impex::initial_data(artifact, body)?),
            }
        }

        if let Some(fields) = dto_fields {
            files.push(java::dto(&ctx, &dto_for(&set.unit), &java::dto_fields(&fields))?);
        }
        if needs_response {
            files.push(java::response_dto(&ctx)?);
        }
        if !unresolved.is_empty() {
            files.push(report::unresolved(&set.unit, unresolved)?);
        }

        tracing::debug!(unit = %set.unit, files = files.len(), "rendered");
        Ok(files)
    }
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_validation() {
        assert!(Renderer::new("com.acme.shop").is_ok());
        assert!(matches!(
            Renderer::new("com..acme"),
            Err(RenderError::InvalidPackage(_))
        ));
        assert!(Renderer::new("com.1acme").is_err());
        assert_eq!(Renderer::default().base_package(), "com.example");
    }

    #[test]
    fn unit_types_resolve_to_packages() {
        let ctx = Context {
            base: "com.example",
            unit: "Order",
        };
        assert_eq!(
            ctx.unit_type("OrderDAO").as_deref(),
            Some("com.example.dao.OrderDAO")
        );
        assert_eq!(
            ctx.unit_type("ResponseDTO").as_deref(),
            Some("com.example.dto.ResponseDTO")
        );
        assert_eq!(ctx.unit_type("OrderEntry"), None);
        assert_eq!(ctx.unit_type("String"), None);
    }

    #[test]
    fn java_paths_follow_packages() {
        let ctx = Context {
            base: "com.example",
            unit: "Order",
        };
        assert_eq!(
            ctx.java_path("com.example.service.impl", "DefaultOrderService"),
            PathBuf::from("src/main/java/com/example/service/impl/DefaultOrderService.java")
        );
    }
}
