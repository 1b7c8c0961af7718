//! Generated artifact records
//!
//! An [`Artifact`] is one emitted unit of the target architecture. Its
//! [`ArtifactBody`] is a structured description (signatures, fields,
//! wiring entries) from which a renderer produces text; the engine never
//! materializes source text itself.

use crate::command::{Category, PropertyType};
use crate::layer::{LayerKind, LayerSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// Entry-point verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for HttpVerb {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a property-bag field lands in the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldDestination {
    /// Scalar request parameter on the entry point
    RequestParameter,
    /// Field of the request DTO
    RequestBody,
    /// Attribute of the persisted item type
    PersistedAttribute,
}

impl FieldDestination {
    /// Layer whose artifact owns a binding with this destination
    #[inline]
    #[must_use]
    pub const fn owning_layer(self) -> LayerKind {
        match self {
            Self::RequestParameter | Self::RequestBody => LayerKind::EntryPoint,
            Self::PersistedAttribute => LayerKind::DataAccess,
        }
    }
}

/// A property field bound to a destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldBinding {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: PropertyType,
    pub destination: FieldDestination,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub identifying: bool,
}

/// An ambient context accessor resolved to an explicit service call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceCall {
    /// Source accessor, verbatim
    pub accessor: String,
    /// Bean name of the owning target service
    pub service: String,
    /// Call expression with the service substituted
    pub expression: String,
}

/// Opaque call into an external system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IntegrationStub {
    pub interface: String,
    /// Injected client bean
    pub client: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MethodSignature {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub returns: String,
}

impl MethodSignature {
    #[must_use]
    pub fn new(name: impl Into<String>, returns: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            returns: returns.into(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(name, ty));
        self
    }
}

/// Entry-point mapping of the source invocation method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Endpoint {
    pub verb: HttpVerb,
    pub path: String,
    /// Source method this endpoint replaces
    pub source_method: String,
    pub handler: MethodSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntryPointBody {
    pub endpoint: Endpoint,
    /// Identifier of the artifact the handler delegates to
    pub delegate: String,
    #[serde(default)]
    pub parameters: Vec<FieldBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_dto: Option<String>,
    #[serde(default)]
    pub request_body: Vec<FieldBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceBody {
    pub implementation: String,
    pub methods: Vec<MethodSignature>,
    /// Bound context accessors
    #[serde(default)]
    pub context_calls: Vec<ServiceCall>,
    /// External systems called by the service
    #[serde(default)]
    pub integration: Vec<IntegrationStub>,
    /// Injected artifact identifiers
    #[serde(default)]
    pub collaborators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DataAccessBody {
    pub implementation: String,
    /// Persisted item type
    pub item_type: String,
    #[serde(default)]
    pub attributes: Vec<FieldBinding>,
    pub methods: Vec<MethodSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FacadeBody {
    pub implementation: String,
    pub dto: String,
    #[serde(default)]
    pub fields: Vec<FieldBinding>,
    pub methods: Vec<MethodSignature>,
}

/// One bean registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WiringEntry {
    pub bean_id: String,
    /// Layer of the registered implementation
    pub layer: LayerKind,
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Constructor references to other bean ids
    #[serde(default)]
    pub references: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WiringBody {
    pub entries: Vec<WiringEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BulkDataBody {
    pub item_type: String,
    pub columns: Vec<String>,
    pub unique_columns: Vec<String>,
}

/// Structured description of an artifact, one variant per layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactBody {
    EntryPoint(EntryPointBody),
    Service(ServiceBody),
    DataAccess(DataAccessBody),
    Facade(FacadeBody),
    Wiring(WiringBody),
    BulkData(BulkDataBody),
}

impl ArtifactBody {
    /// Layer this body describes
    #[must_use]
    pub const fn layer(&self) -> LayerKind {
        match self {
            Self::EntryPoint(_) => LayerKind::EntryPoint,
            Self::Service(_) => LayerKind::Service,
            Self::DataAccess(_) => LayerKind::DataAccess,
            Self::Facade(_) => LayerKind::Facade,
            Self::Wiring(_) => LayerKind::Wiring,
            Self::BulkData(_) => LayerKind::BulkData,
        }
    }

    /// Implementation class, for layers split into interface and impl
    #[must_use]
    pub fn implementation(&self) -> Option<&str> {
        match self {
            Self::Service(b) => Some(&b.implementation),
            Self::DataAccess(b) => Some(&b.implementation),
            Self::Facade(b) => Some(&b.implementation),
            Self::EntryPoint(_) | Self::Wiring(_) | Self::BulkData(_) => None,
        }
    }

    /// Field bindings carried by this body
    #[must_use]
    pub fn field_bindings(&self) -> Vec<&FieldBinding> {
        match self {
            Self::EntryPoint(b) => b.parameters.iter().chain(&b.request_body).collect(),
            Self::DataAccess(b) => b.attributes.iter().collect(),
            Self::Facade(b) => b.fields.iter().collect(),
            Self::Service(_) | Self::Wiring(_) | Self::BulkData(_) => Vec::new(),
        }
    }
}

/// One emitted unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub layer_kind: LayerKind,
    pub identifier: String,
    /// Identifiers that must exist for this artifact to be valid
    pub depends_on: BTreeSet<String>,
    pub body: ArtifactBody,
}

impl Artifact {
    #[must_use]
    pub fn new(identifier: impl Into<String>, body: ArtifactBody) -> Self {
        Self {
            layer_kind: body.layer(),
            identifier: identifier.into(),
            depends_on: BTreeSet::new(),
            body,
        }
    }

    #[must_use]
    pub fn depending_on(mut self, identifier: impl Into<String>) -> Self {
        self.depends_on.insert(identifier.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn implementation(&self) -> Option<&str> {
        self.body.implementation()
    }
}

/// Artifacts produced for one command unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ArtifactSet {
    /// Unit name the identifiers are derived from
    pub unit: String,
    pub category: Category,
    pub artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    #[must_use]
    pub fn new(unit: impl Into<String>, category: Category) -> Self {
        Self {
            unit: unit.into(),
            category,
            artifacts: Vec::new(),
        }
    }

    pub fn push(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    /// Look up an artifact by identifier
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.identifier == identifier)
    }

    /// First artifact of the given layer
    #[must_use]
    pub fn by_layer(&self, layer: LayerKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.layer_kind == layer)
    }

    #[must_use]
    pub fn layers(&self) -> LayerSet {
        self.artifacts.iter().map(|a| a.layer_kind).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    #[must_use]
    pub fn into_artifacts(self) -> Vec<Artifact> {
        self.artifacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiring() -> Artifact {
        Artifact::new(
            "orderWiring",
            ArtifactBody::Wiring(WiringBody { entries: Vec::new() }),
        )
    }

    #[test]
    fn artifact_takes_layer_from_body() {
        let artifact = wiring().depending_on("OrderService");
        assert_eq!(artifact.layer_kind, LayerKind::Wiring);
        assert!(artifact.depends_on.contains("OrderService"));
        assert_eq!(artifact.implementation(), None);
    }

    #[test]
    fn artifact_serializes_camel_case() {
        let json = serde_json::to_value(wiring()).unwrap();
        assert_eq!(json["layerKind"], "Wiring");
        assert_eq!(json["dependsOn"], serde_json::json!([]));
        assert_eq!(json["body"]["kind"], "wiring");
    }

    #[test]
    fn set_lookup() {
        let mut set = ArtifactSet::new("Order", Category::BackgroundTask);
        set.push(wiring());
        assert_eq!(set.len(), 1);
        assert!(set.get("orderWiring").is_some());
        assert!(set.by_layer(LayerKind::Service).is_none());
        assert_eq!(set.layers().into_iter().collect::<Vec<_>>(), vec![LayerKind::Wiring]);
    }

    #[test]
    fn destinations_have_owners() {
        assert_eq!(FieldDestination::RequestBody.owning_layer(), LayerKind::EntryPoint);
        assert_eq!(
            FieldDestination::PersistedAttribute.owning_layer(),
            LayerKind::DataAccess
        );
    }

    #[test]
    fn verbs_serialize_uppercase() {
        assert_eq!(serde_json::to_string(&HttpVerb::Delete).unwrap(), "\"DELETE\"");
    }
}
