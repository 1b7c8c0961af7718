//! Artifact plans
//!
//! An [`ArtifactPlan`] is the rule engine's per-unit decision record: which
//! layers to emit, where each field goes, which calls replace ambient context
//! reads, and what could not be mapped. It is created once and handed by
//! value to the generator.

use cmig_model::{
    Category, FieldBinding, FieldDestination, HttpVerb, IntegrationStub, LayerKind, LayerSet,
    ServiceCall,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// What an unresolved reference refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedKind {
    ContextAccess,
    Field,
    ExternalInterface,
}

impl UnresolvedKind {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ContextAccess => "context_access",
            Self::Field => "field",
            Self::ExternalInterface => "external_interface",
        }
    }
}

/// Something with no matching rule, surfaced for manual attention
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UnresolvedReference {
    pub kind: UnresolvedKind,
    /// Source name, verbatim
    pub name: String,
    pub reason: String,
}

impl UnresolvedReference {
    #[must_use]
    pub fn new(kind: UnresolvedKind, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl Display for UnresolvedReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.reason)
    }
}

/// Entry-point decision for request-bound units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntryPointPlan {
    pub verb: HttpVerb,
    pub path: String,
    pub source_method: String,
}

/// Per-unit plan of target layers and bindings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ArtifactPlan {
    pub unit: String,
    pub category: Category,
    pub target_layers: LayerSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<EntryPointPlan>,
    pub service_calls: Vec<ServiceCall>,
    pub field_bindings: Vec<FieldBinding>,
    pub integrations: Vec<IntegrationStub>,
    pub unresolved: Vec<UnresolvedReference>,
    /// Informational notes (classification, fallbacks)
    pub diagnostics: Vec<String>,
}

impl ArtifactPlan {
    #[inline]
    #[must_use]
    pub fn has_layer(&self, layer: LayerKind) -> bool {
        self.target_layers.contains(&layer)
    }

    /// Bindings with the given destination, in field order
    pub fn bindings_to(&self, destination: FieldDestination) -> impl Iterator<Item = &FieldBinding> {
        self.field_bindings
            .iter()
            .filter(move |b| b.destination == destination)
    }

    /// Bindings owned by the given layer, in field order
    pub fn bindings_owned_by(&self, layer: LayerKind) -> impl Iterator<Item = &FieldBinding> {
        self.field_bindings
            .iter()
            .filter(move |b| b.destination.owning_layer() == layer)
    }

    #[must_use]
    pub fn has_identifying_field(&self) -> bool {
        self.field_bindings.iter().any(|b| b.identifying)
    }

    /// Unresolved names, verbatim and in discovery order
    #[must_use]
    pub fn unresolved_names(&self) -> Vec<String> {
        self.unresolved.iter().map(|u| u.name.clone()).collect()
    }
}
