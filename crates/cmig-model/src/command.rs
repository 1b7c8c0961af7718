//! Canonical command units
//!
//! A [`CommandUnit`] is the normalized description of one legacy command:
//! which invocation methods it declares, which ambient context accessors it
//! reads, which typed properties it carries and which external systems it
//! calls. Units are built once, classified once, and never mutated after.

use indexmap::{IndexMap, IndexSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Command category assigned by the classifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
pub enum Category {
    /// Bound to a request/response lifecycle
    RequestHandler,
    /// Runs unattended
    BackgroundTask,
    /// Neither or both recognizers matched
    #[default]
    Unknown,
}

impl Category {
    /// Stable string form used in results and logs
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestHandler => "RequestHandler",
            Self::BackgroundTask => "BackgroundTask",
            Self::Unknown => "Unknown",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How sure the classifier is about a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Method and supertype signals agree
    High,
    /// Only one signal matched
    Medium,
    /// Ambiguous or unrecognized
    #[default]
    None,
}

/// Result of classification, fixed onto the unit exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Classification {
    pub category: Category,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Classification {
    #[inline]
    #[must_use]
    pub fn new(category: Category, confidence: Confidence) -> Self {
        Self {
            category,
            confidence,
            note: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Declared type of a property-bag field
///
/// Anything the parser cannot pin down becomes [`PropertyType::Untyped`]
/// so downstream layers can still emit a field with a generic type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyType {
    String,
    Integer,
    Long,
    Decimal,
    Boolean,
    Date,
    List(Box<PropertyType>),
    Map(Box<PropertyType>),
    /// Named composite type (e.g. `OrderModel`)
    Object(String),
    Untyped,
}

impl PropertyType {
    /// Parse a loosely written type name
    ///
    /// Accepts primitive spellings (`string`, `int`, `java.lang.Long`),
    /// generic collections (`List<String>`, `Map<String, Integer>`) and
    /// array suffixes (`String[]`). Never fails.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(elem) = raw.strip_suffix("[]") {
            return Self::List(Box::new(Self::parse(elem)));
        }
        if let Some((outer, args)) = split_generic(raw) {
            let outer = simple_name(outer);
            return match outer.to_ascii_lowercase().as_str() {
                "list" | "arraylist" | "set" | "hashset" | "collection" | "vector" => {
                    Self::List(Box::new(Self::parse(args)))
                }
                "map" | "hashmap" | "hashtable" | "treemap" => {
                    let value = args.rsplit_once(',').map_or(args, |(_, v)| v);
                    Self::Map(Box::new(Self::parse(value)))
                }
                _ => Self::Untyped,
            };
        }

        let name = simple_name(raw);
        match name.to_ascii_lowercase().as_str() {
            "string" | "char" | "character" => Self::String,
            "int" | "integer" | "short" | "byte" => Self::Integer,
            "long" => Self::Long,
            "double" | "float" | "bigdecimal" | "decimal" => Self::Decimal,
            "boolean" | "bool" => Self::Boolean,
            "date" | "timestamp" | "calendar" | "instant" => Self::Date,
            "list" | "arraylist" | "set" | "collection" | "vector" => {
                Self::List(Box::new(Self::Untyped))
            }
            "map" | "hashmap" | "hashtable" => Self::Map(Box::new(Self::Untyped)),
            "" | "?" | "object" | "typedproperty" | "var" | "untyped" => Self::Untyped,
            _ if is_type_name(name) => Self::Object(name.to_string()),
            _ => Self::Untyped,
        }
    }

    /// Scalars travel as request parameters; everything else needs a body
    #[inline]
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Integer | Self::Long | Self::Decimal | Self::Boolean | Self::Date
        )
    }

    #[inline]
    #[must_use]
    pub fn is_untyped(&self) -> bool {
        matches!(self, Self::Untyped)
    }

    /// Type name in the target framework
    #[must_use]
    pub fn target_name(&self) -> String {
        match self {
            Self::String => "String".to_string(),
            Self::Integer => "Integer".to_string(),
            Self::Long => "Long".to_string(),
            Self::Decimal => "BigDecimal".to_string(),
            Self::Boolean => "Boolean".to_string(),
            Self::Date => "Date".to_string(),
            Self::List(elem) => format!("List<{}>", elem.target_name()),
            Self::Map(value) => format!("Map<String, {}>", value.target_name()),
            Self::Object(name) => name.clone(),
            Self::Untyped => "Object".to_string(),
        }
    }
}

impl Display for PropertyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Untyped => f.write_str("untyped"),
            other => f.write_str(&other.target_name()),
        }
    }
}

impl From<&str> for PropertyType {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for PropertyType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl JsonSchema for PropertyType {
    fn schema_name() -> String {
        "PropertyType".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

fn split_generic(raw: &str) -> Option<(&str, &str)> {
    let open = raw.find('<')?;
    let inner = raw[open + 1..].strip_suffix('>')?;
    Some((&raw[..open], inner.trim()))
}

fn simple_name(raw: &str) -> &str {
    raw.rsplit('.').next().unwrap_or(raw).trim()
}

fn is_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// One entry of the property bag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub ty: PropertyType,
    /// Identifying/unique field; implies a new persisted record type
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub identifying: bool,
}

impl FieldSpec {
    #[inline]
    #[must_use]
    pub fn new(ty: PropertyType) -> Self {
        Self {
            ty,
            identifying: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn identifying(mut self) -> Self {
        self.identifying = true;
        self
    }
}

/// Structural hints used for the facade decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CommandTraits {
    /// The invocation body branches on request data
    #[serde(default)]
    pub has_branching: bool,
    /// Number of response properties written
    #[serde(default)]
    pub response_writes: u32,
}

/// Canonical representation of one input command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommandUnit {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    classification: Option<Classification>,
    invocation_methods: Vec<String>,
    #[serde(default)]
    supertypes: Vec<String>,
    #[serde(default)]
    context_accesses: Vec<String>,
    #[serde(default)]
    property_fields: IndexMap<String, FieldSpec>,
    #[serde(default)]
    invoked_external_interfaces: IndexSet<String>,
    #[serde(default)]
    traits: CommandTraits,
}

impl CommandUnit {
    /// Create an unclassified unit
    #[must_use]
    pub fn new(name: impl Into<String>, invocation_method: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classification: None,
            invocation_methods: vec![invocation_method.into()],
            supertypes: Vec::new(),
            context_accesses: Vec::new(),
            property_fields: IndexMap::new(),
            invoked_external_interfaces: IndexSet::new(),
            traits: CommandTraits::default(),
        }
    }

    #[must_use]
    pub fn with_invocation_method(mut self, method: impl Into<String>) -> Self {
        let method = method.into();
        if !self.invocation_methods.contains(&method) {
            self.invocation_methods.push(method);
        }
        self
    }

    #[must_use]
    pub fn with_supertype(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    #[must_use]
    pub fn with_context_access(mut self, accessor: impl Into<String>) -> Self {
        self.context_accesses.push(accessor.into());
        self
    }

    /// Add a property field; a later entry with the same name replaces the type
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.property_fields.insert(name.into(), spec);
        self
    }

    #[must_use]
    pub fn with_external_interface(mut self, interface: impl Into<String>) -> Self {
        self.invoked_external_interfaces.insert(interface.into());
        self
    }

    #[must_use]
    pub fn with_traits(mut self, traits: CommandTraits) -> Self {
        self.traits = traits;
        self
    }

    /// Fix the classification onto the unit
    ///
    /// A unit is classified exactly once. Later calls return the unit
    /// unchanged, so the category never moves after it is set.
    #[must_use]
    pub fn with_classification(mut self, classification: Classification) -> Self {
        if self.classification.is_none() {
            self.classification = Some(classification);
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category, `Unknown` until classified
    #[inline]
    #[must_use]
    pub fn category(&self) -> Category {
        self.classification
            .as_ref()
            .map_or(Category::Unknown, |c| c.category)
    }

    #[inline]
    #[must_use]
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.classification.is_some()
    }

    /// Primary invocation method (the first declared)
    #[inline]
    #[must_use]
    pub fn invocation_method(&self) -> &str {
        self.invocation_methods
            .first()
            .map_or("", String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn invocation_methods(&self) -> &[String] {
        &self.invocation_methods
    }

    #[inline]
    #[must_use]
    pub fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    #[inline]
    #[must_use]
    pub fn context_accesses(&self) -> &[String] {
        &self.context_accesses
    }

    #[inline]
    #[must_use]
    pub fn property_fields(&self) -> &IndexMap<String, FieldSpec> {
        &self.property_fields
    }

    #[inline]
    #[must_use]
    pub fn invoked_external_interfaces(&self) -> &IndexSet<String> {
        &self.invoked_external_interfaces
    }

    #[inline]
    #[must_use]
    pub fn traits(&self) -> CommandTraits {
        self.traits
    }
}
