//! Rule table types
//!
//! [`RuleTableDocument`] is the plain serialized form. [`RuleTable`] can only
//! be obtained by validating a document, so holding one proves that rule
//! lookup is total, that no shape requests a derived layer and that no
//! background-task rule asks for an entry point.

use crate::error::RuleTableError;
use cmig_model::{
    Category, CommandTraits, FieldDestination, HttpVerb, LayerKind, LayerSet,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Category selector of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum RuleMatch {
    RequestHandler,
    BackgroundTask,
    /// Fallback for every category, and the only match for `Unknown`
    Generic,
}

impl RuleMatch {
    /// Exact category match; `Generic` never matches here
    #[inline]
    #[must_use]
    pub const fn selects(self, category: Category) -> bool {
        matches!(
            (self, category),
            (Self::RequestHandler, Category::RequestHandler)
                | (Self::BackgroundTask, Category::BackgroundTask)
        )
    }
}

/// When a rule adds a `Facade` layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FacadePolicy {
    Always,
    #[default]
    Never,
    /// Branching or more than one response write
    WhenComplex,
}

impl FacadePolicy {
    #[must_use]
    pub const fn wants_facade(self, traits: CommandTraits) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::WhenComplex => traits.has_branching || traits.response_writes > 1,
        }
    }
}

/// Accessor → owning service with a call template
///
/// `call` may reference the bound service as `{service}`. Without a
/// template the accessor is invoked on the service under its own name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AccessorBinding {
    pub accessor: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<String>,
}

impl AccessorBinding {
    #[must_use]
    pub fn new(accessor: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            accessor: accessor.into(),
            service: service.into(),
            call: None,
        }
    }

    #[must_use]
    pub fn with_call(mut self, template: impl Into<String>) -> Self {
        self.call = Some(template.into());
        self
    }

    /// Call expression with the service substituted
    #[must_use]
    pub fn render_call(&self) -> String {
        match &self.call {
            Some(template) => template.replace("{service}", &self.service),
            None => format!("{}.{}()", self.service, self.accessor),
        }
    }
}

/// Source invocation method → entry-point verb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntryPointBinding {
    pub method: String,
    pub verb: HttpVerb,
}

impl EntryPointBinding {
    #[must_use]
    pub fn new(method: impl Into<String>, verb: HttpVerb) -> Self {
        Self {
            method: method.into(),
            verb,
        }
    }
}

/// One structural mapping rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MappingRule {
    #[serde(rename = "match")]
    pub match_category: RuleMatch,
    pub target_shape: Vec<LayerKind>,
    #[serde(default)]
    pub facade: FacadePolicy,
    #[serde(default)]
    pub accessor_bindings: Vec<AccessorBinding>,
    #[serde(default)]
    pub entry_point_bindings: Vec<EntryPointBinding>,
    #[serde(default = "default_verb")]
    pub default_verb: HttpVerb,
}

fn default_verb() -> HttpVerb {
    HttpVerb::Post
}

impl MappingRule {
    #[must_use]
    pub fn new(match_category: RuleMatch, target_shape: impl IntoIterator<Item = LayerKind>) -> Self {
        Self {
            match_category,
            target_shape: target_shape.into_iter().collect(),
            facade: FacadePolicy::default(),
            accessor_bindings: Vec::new(),
            entry_point_bindings: Vec::new(),
            default_verb: default_verb(),
        }
    }

    #[must_use]
    pub fn with_facade(mut self, policy: FacadePolicy) -> Self {
        self.facade = policy;
        self
    }

    #[must_use]
    pub fn with_accessors(mut self, bindings: impl IntoIterator<Item = AccessorBinding>) -> Self {
        self.accessor_bindings.extend(bindings);
        self
    }

    #[must_use]
    pub fn with_entry_points(
        mut self,
        bindings: impl IntoIterator<Item = EntryPointBinding>,
    ) -> Self {
        self.entry_point_bindings.extend(bindings);
        self
    }

    /// Target shape as an ordered set
    #[must_use]
    pub fn shape(&self) -> LayerSet {
        self.target_shape.iter().copied().collect()
    }

    #[inline]
    #[must_use]
    pub fn has_entry_point(&self) -> bool {
        self.target_shape.contains(&LayerKind::EntryPoint)
    }

    /// First registered binding for `accessor`
    #[must_use]
    pub fn accessor(&self, accessor: &str) -> Option<&AccessorBinding> {
        self.accessor_bindings.iter().find(|b| b.accessor == accessor)
    }

    /// Verb bound to a source method, if any
    #[must_use]
    pub fn verb_for(&self, method: &str) -> Option<HttpVerb> {
        self.entry_point_bindings
            .iter()
            .find(|b| b.method == method)
            .map(|b| b.verb)
    }
}

/// Per-field override
///
/// `name` is matched exactly, or as a pattern when it contains `*`
/// (any run of characters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldRule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<FieldDestination>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub identifying: bool,
    /// Needs manual attention; the field is reported unresolved
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub manual: bool,
}

impl FieldRule {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            destination: None,
            identifying: false,
            manual: false,
        }
    }

    #[must_use]
    pub fn identifying(mut self) -> Self {
        self.identifying = true;
        self
    }

    #[must_use]
    pub fn manual(mut self) -> Self {
        self.manual = true;
        self
    }

    #[must_use]
    pub fn with_destination(mut self, destination: FieldDestination) -> Self {
        self.destination = Some(destination);
        self
    }

    #[must_use]
    pub fn matches(&self, field: &str) -> bool {
        glob_match(&self.name, field)
    }
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(head) = parts.next() else {
        return pattern == text;
    };
    let Some(mut rest) = text.strip_prefix(head) else {
        return false;
    };
    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}

/// Serialized form of a rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RuleTableDocument {
    pub version: String,
    pub rules: Vec<MappingRule>,
    #[serde(default)]
    pub field_rules: Vec<FieldRule>,
}

/// Validated, immutable rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleTableDocument", into = "RuleTableDocument")]
pub struct RuleTable {
    version: String,
    rules: Vec<MappingRule>,
    field_rules: Vec<FieldRule>,
    /// Index of the first `Generic` rule
    generic: usize,
}

impl RuleTable {
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    #[inline]
    #[must_use]
    pub fn field_rules(&self) -> &[FieldRule] {
        &self.field_rules
    }

    /// Rule for a category; always succeeds
    ///
    /// The first rule whose selector matches wins; otherwise the first
    /// `Generic` rule applies. `Unknown` always gets the `Generic` rule.
    #[must_use]
    pub fn rule_for(&self, category: Category) -> &MappingRule {
        self.rules
            .iter()
            .find(|r| r.match_category.selects(category))
            .unwrap_or(&self.rules[self.generic])
    }

    /// First field rule matching `field`
    #[must_use]
    pub fn field_rule(&self, field: &str) -> Option<&FieldRule> {
        self.field_rules.iter().find(|r| r.matches(field))
    }

    #[must_use]
    pub fn to_document(&self) -> RuleTableDocument {
        self.clone().into()
    }
}

impl TryFrom<RuleTableDocument> for RuleTable {
    type Error = RuleTableError;

    fn try_from(doc: RuleTableDocument) -> Result<Self, Self::Error> {
        if doc.rules.is_empty() {
            return Err(RuleTableError::Empty);
        }
        let generic = doc
            .rules
            .iter()
            .position(|r| r.match_category == RuleMatch::Generic)
            .ok_or(RuleTableError::MissingGeneric)?;

        for (idx, rule) in doc.rules.iter().enumerate() {
            if let Some(layer) = rule.target_shape.iter().find(|l| l.is_derived()) {
                return Err(RuleTableError::DerivedLayerInShape {
                    rule: idx,
                    layer: *layer,
                });
            }
            if rule.match_category == RuleMatch::BackgroundTask && rule.has_entry_point() {
                return Err(RuleTableError::EntryPointForBackgroundTask { rule: idx });
            }
            for binding in &rule.accessor_bindings {
                if binding.accessor.trim().is_empty() || binding.service.trim().is_empty() {
                    return Err(RuleTableError::empty_name(format!(
                        "rule #{idx} accessor binding"
                    )));
                }
            }
            if rule.entry_point_bindings.iter().any(|b| b.method.trim().is_empty()) {
                return Err(RuleTableError::empty_name(format!(
                    "rule #{idx} entry point binding"
                )));
            }
        }
        if let Some(idx) = doc.field_rules.iter().position(|r| r.name.trim().is_empty()) {
            return Err(RuleTableError::empty_name(format!("field rule #{idx}")));
        }

        Ok(Self {
            version: doc.version,
            rules: doc.rules,
            field_rules: doc.field_rules,
            generic,
        })
    }
}

impl From<RuleTable> for RuleTableDocument {
    fn from(table: RuleTable) -> Self {
        Self {
            version: table.version,
            rules: table.rules,
            field_rules: table.field_rules,
        }
    }
}
