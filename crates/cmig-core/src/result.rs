//! Conversion results
//!
//! A [`ConversionResult`] is deterministic: the same unit and rule table
//! always serialize to the same bytes, and the embedded fingerprint is the
//! blake3 hash of those bytes without the fingerprint itself.

use cmig_engine::ValidationVerdict;
use cmig_model::{Artifact, Category, Fingerprint, FingerprintError};
use serde::{Deserialize, Serialize};

/// Outcome of one successful job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub input_type: Category,
    /// In generation order
    pub artifacts: Vec<Artifact>,
    /// Source names with no matching rule
    pub unresolved: Vec<String>,
    pub validation: ValidationVerdict,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
    pub fingerprint: Fingerprint,
}

/// Fingerprinted content, field for field
#[derive(Serialize)]
struct Canonical<'a> {
    input_type: Category,
    artifacts: &'a [Artifact],
    unresolved: &'a [String],
    validation: &'a ValidationVerdict,
    #[serde(skip_serializing_if = "no_diagnostics")]
    diagnostics: &'a [String],
}

fn no_diagnostics(diagnostics: &&[String]) -> bool {
    diagnostics.is_empty()
}

impl ConversionResult {
    /// Assemble a result and fingerprint it
    ///
    /// # Errors
    ///
    /// Returns error if the content cannot be serialized.
    pub fn new(
        input_type: Category,
        artifacts: Vec<Artifact>,
        unresolved: Vec<String>,
        validation: ValidationVerdict,
        diagnostics: Vec<String>,
    ) -> Result<Self, FingerprintError> {
        let fingerprint = Fingerprint::of(&Canonical {
            input_type,
            artifacts: &artifacts,
            unresolved: &unresolved,
            validation: &validation,
            diagnostics: &diagnostics,
        })?;
        Ok(Self {
            input_type,
            artifacts,
            unresolved,
            validation,
            diagnostics,
            fingerprint,
        })
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }

    /// Whether the fingerprint still matches the content
    #[must_use]
    pub fn verify(&self) -> bool {
        Fingerprint::of(&self.canonical()).is_ok_and(|fp| fp == self.fingerprint)
    }

    fn canonical(&self) -> Canonical<'_> {
        Canonical {
            input_type: self.input_type,
            artifacts: &self.artifacts,
            unresolved: &self.unresolved,
            validation: &self.validation,
            diagnostics: &self.diagnostics,
        }
    }

    /// Artifact by identifier
    #[must_use]
    pub fn artifact(&self, identifier: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.identifier == identifier)
    }
}
