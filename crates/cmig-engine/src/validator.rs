//! Consistency validator
//!
//! Structural checks over one unit's artifact set. Every check runs and
//! reports independently; the verdict is `Valid` only when none fired.

use cmig_model::naming::{identifier_for, implementation_for, is_valid_identifier};
use cmig_model::{ArtifactSet, Category, LayerKind, LayerSet};
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Violation {
    /// `artifact` depends on an identifier not in the set
    DanglingDependency { artifact: String, missing: String },
    /// Artifacts forming a dependency cycle, in traversal order
    DependencyCycle { path: Vec<String> },
    /// A layer the category requires is absent
    IncompleteLayering { missing_layer: LayerKind },
    /// A layer the category must not have is present
    ForbiddenLayer { layer: LayerKind },
    /// Identifier or implementation name breaks the naming convention
    NamingViolation { artifact: String },
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingDependency { artifact, missing } => {
                write!(f, "{artifact} depends on missing {missing}")
            }
            Self::DependencyCycle { path } => write!(f, "cycle: {}", path.join(" -> ")),
            Self::IncompleteLayering { missing_layer } => {
                write!(f, "required layer {missing_layer} is missing")
            }
            Self::ForbiddenLayer { layer } => write!(f, "layer {layer} is not allowed here"),
            Self::NamingViolation { artifact } => write!(f, "{artifact} breaks naming rules"),
        }
    }
}

/// Outcome of validation
///
/// Serializes as `"Valid"` or `{"Invalid": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ValidationVerdict {
    Valid,
    Invalid(Vec<Violation>),
}

impl ValidationVerdict {
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(v) => v,
        }
    }
}

impl From<Vec<Violation>> for ValidationVerdict {
    fn from(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(violations)
        }
    }
}

/// Layers a category cannot do without
#[must_use]
pub fn required_layers(category: Category) -> LayerSet {
    let layers: &[LayerKind] = match category {
        Category::RequestHandler => &[LayerKind::EntryPoint, LayerKind::Service, LayerKind::Wiring],
        Category::BackgroundTask | Category::Unknown => &[LayerKind::Service, LayerKind::Wiring],
    };
    layers.iter().copied().collect()
}

/// Layers a category must not have
#[must_use]
pub fn forbidden_layers(category: Category) -> LayerSet {
    match category {
        Category::BackgroundTask => LayerSet::from([LayerKind::EntryPoint]),
        Category::RequestHandler | Category::Unknown => LayerSet::new(),
    }
}

/// Run every check over the set
#[must_use]
pub fn validate(set: &ArtifactSet) -> ValidationVerdict {
    let mut violations = Vec::new();
    check_naming(set, &mut violations);
    check_dangling(set, &mut violations);
    check_cycles(set, &mut violations);
    check_layering(set, &mut violations);

    let verdict = ValidationVerdict::from(violations);
    if let ValidationVerdict::Invalid(found) = &verdict {
        tracing::debug!(unit = %set.unit, violations = found.len(), "artifact set invalid");
    }
    verdict
}

fn check_naming(set: &ArtifactSet, out: &mut Vec<Violation>) {
    for artifact in set.iter() {
        let expected = identifier_for(artifact.layer_kind, &set.unit);
        let identifier_ok =
            artifact.identifier == expected && is_valid_identifier(&artifact.identifier);
        let implementation_ok = artifact.implementation().map(str::to_string)
            == implementation_for(artifact.layer_kind, &set.unit);
        let layer_ok = artifact.body.layer() == artifact.layer_kind;
        if !(identifier_ok && implementation_ok && layer_ok) {
            out.push(Violation::NamingViolation {
                artifact: artifact.identifier.clone(),
            });
        }
    }
}

fn check_dangling(set: &ArtifactSet, out: &mut Vec<Violation>) {
    for artifact in set.iter() {
        for dep in &artifact.depends_on {
            if set.get(dep).is_none() {
                out.push(Violation::DanglingDependency {
                    artifact: artifact.identifier.clone(),
                    missing: dep.clone(),
                });
            }
        }
    }
}

fn check_cycles(set: &ArtifactSet, out: &mut Vec<Violation>) {
    let mut graph = DiGraphMap::<&str, ()>::new();
    for artifact in set.iter() {
        graph.add_node(artifact.identifier.as_str());
    }
    for artifact in set.iter() {
        for dep in &artifact.depends_on {
            if graph.contains_node(dep.as_str()) {
                graph.add_edge(artifact.identifier.as_str(), dep.as_str(), ());
            }
        }
    }
    if toposort(&graph, None).is_ok() {
        return;
    }

    for component in tarjan_scc(&graph) {
        let cyclic = component.len() > 1
            || component
                .first()
                .is_some_and(|n| graph.contains_edge(*n, *n));
        if cyclic {
            out.push(Violation::DependencyCycle {
                path: cycle_path(&graph, &component),
            });
        }
    }
}

/// Walk a strongly connected component from its smallest member back to itself
fn cycle_path(graph: &DiGraphMap<&str, ()>, component: &[&str]) -> Vec<String> {
    let Some(start) = component.iter().min().copied() else {
        return Vec::new();
    };
    let mut path = vec![start];
    let mut current = start;
    loop {
        let mut next: Vec<&str> = graph
            .neighbors(current)
            .filter(|n| component.contains(n))
            .collect();
        next.sort_unstable();
        let step = next
            .iter()
            .copied()
            .find(|n| *n == start)
            .or_else(|| next.iter().copied().find(|n| !path.contains(n)));
        match step {
            Some(n) if n == start => {
                path.push(start);
                break;
            }
            Some(n) => {
                path.push(n);
                current = n;
            }
            None => break,
        }
    }
    path.into_iter().map(str::to_string).collect()
}

fn check_layering(set: &ArtifactSet, out: &mut Vec<Violation>) {
    let present = set.layers();
    for layer in required_layers(set.category) {
        if !present.contains(&layer) {
            out.push(Violation::IncompleteLayering {
                missing_layer: layer,
            });
        }
    }
    for layer in forbidden_layers(set.category).intersection(&present) {
        out.push(Violation::ForbiddenLayer { layer: *layer });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmig_model::{
        Artifact, ArtifactBody, EntryPointBody, Endpoint, HttpVerb, MethodSignature, ServiceBody,
        WiringBody,
    };
    use pretty_assertions::assert_eq;

    fn service(unit: &str) -> Artifact {
        Artifact::new(
            format!("{unit}Service"),
            ArtifactBody::Service(ServiceBody {
                implementation: format!("Default{unit}Service"),
                methods: Vec::new(),
                context_calls: Vec::new(),
                integration: Vec::new(),
                collaborators: Vec::new(),
            }),
        )
    }

    fn wiring(id: &str) -> Artifact {
        Artifact::new(id, ArtifactBody::Wiring(WiringBody { entries: Vec::new() }))
    }

    fn controller(unit: &str) -> Artifact {
        Artifact::new(
            format!("{unit}Controller"),
            ArtifactBody::EntryPoint(EntryPointBody {
                endpoint: Endpoint {
                    verb: HttpVerb::Get,
                    path: "/api/x".into(),
                    source_method: "doGet".into(),
                    handler: MethodSignature::new("x", "void"),
                },
                delegate: format!("{unit}Service"),
                parameters: Vec::new(),
                request_dto: None,
                request_body: Vec::new(),
            }),
        )
    }

    fn set(category: Category, artifacts: Vec<Artifact>) -> ArtifactSet {
        let mut s = ArtifactSet::new("Order", category);
        for a in artifacts {
            s.push(a);
        }
        s
    }

    #[test]
    fn minimal_task_is_valid() {
        let s = set(
            Category::BackgroundTask,
            vec![service("Order"), wiring("orderWiring").depending_on("OrderService")],
        );
        assert_eq!(validate(&s), ValidationVerdict::Valid);
    }

    #[test]
    fn missing_layers_reported_individually() {
        let s = set(Category::RequestHandler, vec![service("Order")]);
        assert_eq!(
            validate(&s).violations(),
            [
                Violation::IncompleteLayering {
                    missing_layer: LayerKind::EntryPoint
                },
                Violation::IncompleteLayering {
                    missing_layer: LayerKind::Wiring
                },
            ]
        );
    }

    #[test]
    fn background_task_with_controller_is_invalid() {
        let s = set(
            Category::BackgroundTask,
            vec![
                controller("Order").depending_on("OrderService"),
                service("Order"),
                wiring("orderWiring")
                    .depending_on("OrderController")
                    .depending_on("OrderService"),
            ],
        );
        assert_eq!(
            validate(&s).violations(),
            [Violation::ForbiddenLayer {
                layer: LayerKind::EntryPoint
            }]
        );
    }

    #[test]
    fn dangling_dependency() {
        let s = set(
            Category::BackgroundTask,
            vec![
                service("Order").depending_on("OrderDAO"),
                wiring("orderWiring").depending_on("OrderService"),
            ],
        );
        assert_eq!(
            validate(&s).violations(),
            [Violation::DanglingDependency {
                artifact: "OrderService".into(),
                missing: "OrderDAO".into()
            }]
        );
    }

    #[test]
    fn cycle_is_reported_with_path() {
        let s = set(
            Category::RequestHandler,
            vec![
                controller("Order").depending_on("OrderService"),
                service("Order").depending_on("OrderController"),
                wiring("orderWiring"),
            ],
        );
        assert_eq!(
            validate(&s).violations(),
            [Violation::DependencyCycle {
                path: vec![
                    "OrderController".into(),
                    "OrderService".into(),
                    "OrderController".into()
                ]
            }]
        );
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let s = set(
            Category::BackgroundTask,
            vec![service("Order").depending_on("OrderService"), wiring("orderWiring")],
        );
        assert!(matches!(
            validate(&s).violations(),
            [Violation::DependencyCycle { path }] if path.len() == 2
        ));
    }

    #[test]
    fn naming_checks_identifier_and_implementation() {
        let mut bad_impl = service("Order");
        if let ArtifactBody::Service(body) = &mut bad_impl.body {
            body.implementation = "OrderServiceImpl".into();
        }
        let s = set(
            Category::BackgroundTask,
            vec![bad_impl, wiring("OrderWiring")],
        );
        assert_eq!(
            validate(&s).violations(),
            [
                Violation::NamingViolation {
                    artifact: "OrderService".into()
                },
                Violation::NamingViolation {
                    artifact: "OrderWiring".into()
                },
            ]
        );
    }

    #[test]
    fn verdict_serialization() {
        assert_eq!(
            serde_json::to_string(&ValidationVerdict::Valid).unwrap(),
            "\"Valid\""
        );
        let invalid = ValidationVerdict::Invalid(vec![Violation::IncompleteLayering {
            missing_layer: LayerKind::Service,
        }]);
        assert_eq!(
            serde_json::to_value(&invalid).unwrap(),
            serde_json::json!({"Invalid": [{"IncompleteLayering": {"missing_layer": "Service"}}]})
        );
    }

    #[test]
    fn unknown_requires_service_and_wiring() {
        let required: Vec<_> = required_layers(Category::Unknown).into_iter().collect();
        assert_eq!(required, vec![LayerKind::Service, LayerKind::Wiring]);
    }
}
