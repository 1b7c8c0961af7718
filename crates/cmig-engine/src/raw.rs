//! Raw command descriptions
//!
//! This is the pre-parsed form handed over by whatever front end read the
//! legacy source. Everything is optional except the name so that partial
//! descriptions still reach the builder and fail there with a precise reason.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A property-bag entry, either a bare type or a detailed record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RawProperty {
    Type(String),
    Detailed {
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        identifying: bool,
    },
}

impl RawProperty {
    #[must_use]
    pub fn declared_type(&self) -> &str {
        match self {
            Self::Type(ty) => ty,
            Self::Detailed { ty, .. } => ty.as_deref().unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn is_identifying(&self) -> bool {
        matches!(self, Self::Detailed { identifying: true, .. })
    }
}

impl From<&str> for RawProperty {
    fn from(ty: &str) -> Self {
        Self::Type(ty.to_string())
    }
}

/// Raw description of one legacy command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RawCommand {
    #[serde(default)]
    pub name: String,
    /// Base class, as declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    /// Explicit entry method; takes precedence over `methods`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_method: Option<String>,
    /// Declared methods that may serve as invocation methods
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default)]
    pub context_accesses: Vec<String>,
    #[serde(default)]
    pub properties: IndexMap<String, RawProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_branching: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub response_writes: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl RawCommand {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_invocation_method(mut self, method: impl Into<String>) -> Self {
        self.invocation_method = Some(method.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.methods.push(method.into());
        self
    }

    #[must_use]
    pub fn extending(mut self, base: impl Into<String>) -> Self {
        self.extends = Some(base.into());
        self
    }

    #[must_use]
    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }

    #[must_use]
    pub fn with_context_access(mut self, accessor: impl Into<String>) -> Self {
        self.context_accesses.push(accessor.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, property: impl Into<RawProperty>) -> Self {
        self.properties.insert(name.into(), property.into());
        self
    }

    #[must_use]
    pub fn with_identifying_property(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.properties.insert(
            name.into(),
            RawProperty::Detailed {
                ty: Some(ty.into()),
                identifying: true,
            },
        );
        self
    }

    #[must_use]
    pub fn with_external_interface(mut self, interface: impl Into<String>) -> Self {
        self.external_interfaces.push(interface.into());
        self
    }

    #[must_use]
    pub fn with_branching(mut self) -> Self {
        self.has_branching = true;
        self
    }

    #[must_use]
    pub fn with_response_writes(mut self, writes: u32) -> Self {
        self.response_writes = writes;
        self
    }
}
