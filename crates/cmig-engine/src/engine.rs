//! Rule engine
//!
//! Applies a [`RuleTable`] to a classified unit. Each context access, each
//! property field and each external interface ends up either bound in the
//! plan or listed as unresolved; nothing is dropped.

use crate::plan::{ArtifactPlan, EntryPointPlan, UnresolvedKind, UnresolvedReference};
use cmig_model::naming::{is_valid_identifier, lower_camel};
use cmig_model::{
    Category, CommandUnit, FieldBinding, FieldDestination, IntegrationStub, LayerKind,
    ServiceCall,
};
use cmig_rules::{MappingRule, RuleTable};
use indexmap::IndexSet;

/// Plan the artifacts for one unit
#[must_use]
pub fn apply(unit: &CommandUnit, table: &RuleTable) -> ArtifactPlan {
    let rule = table.rule_for(unit.category());
    let mut target_layers = rule.shape();
    let mut diagnostics = Vec::new();
    if unit.category() == Category::BackgroundTask && target_layers.remove(&LayerKind::EntryPoint) {
        diagnostics.push(format!(
            "background task '{}' gets no entry point; dropped from the {:?} rule shape",
            unit.name(),
            rule.match_category
        ));
    }
    let has_entry_point = target_layers.contains(&LayerKind::EntryPoint);

    let mut plan = ArtifactPlan {
        unit: unit.name().to_string(),
        category: unit.category(),
        target_layers,
        entry_point: None,
        service_calls: Vec::new(),
        field_bindings: Vec::new(),
        integrations: Vec::new(),
        unresolved: Vec::new(),
        diagnostics: Vec::new(),
    };
    if let Some(note) = unit.classification().and_then(|c| c.note.as_ref()) {
        plan.diagnostics.push(note.clone());
    }
    plan.diagnostics.append(&mut diagnostics);

    if has_entry_point {
        plan.entry_point = Some(entry_point(unit, rule, &mut plan.diagnostics));
    }
    bind_context_accesses(unit, rule, &mut plan);
    bind_fields(unit, has_entry_point, table, &mut plan);
    bind_integrations(unit, &mut plan);

    if rule.facade.wants_facade(unit.traits()) {
        plan.target_layers.insert(LayerKind::Facade);
    }
    if plan
        .bindings_to(FieldDestination::PersistedAttribute)
        .next()
        .is_some()
    {
        plan.target_layers.insert(LayerKind::DataAccess);
    }
    plan.target_layers.insert(LayerKind::Wiring);
    if plan.has_identifying_field() {
        plan.target_layers.insert(LayerKind::BulkData);
    }

    tracing::debug!(
        unit = %plan.unit,
        rule = ?rule.match_category,
        layers = plan.target_layers.len(),
        bindings = plan.field_bindings.len(),
        unresolved = plan.unresolved.len(),
        "plan ready"
    );
    plan
}

fn entry_point(unit: &CommandUnit, rule: &MappingRule, diagnostics: &mut Vec<String>) -> EntryPointPlan {
    let bound = unit
        .invocation_methods()
        .iter()
        .find_map(|m| rule.verb_for(m).map(|verb| (m.as_str(), verb)));
    let (source_method, verb) = match bound {
        Some(found) => found,
        None => {
            diagnostics.push(format!(
                "no entry point binding for '{}', defaulting to {}",
                unit.invocation_method(),
                rule.default_verb
            ));
            (unit.invocation_method(), rule.default_verb)
        }
    };
    EntryPointPlan {
        verb,
        path: format!("/api/{}", unit.name().to_ascii_lowercase()),
        source_method: source_method.to_string(),
    }
}

fn bind_context_accesses(unit: &CommandUnit, rule: &MappingRule, plan: &mut ArtifactPlan) {
    let mut seen = IndexSet::new();
    for accessor in unit.context_accesses() {
        if !seen.insert(accessor.as_str()) {
            continue;
        }
        match rule.accessor(accessor) {
            Some(binding) => plan.service_calls.push(ServiceCall {
                accessor: accessor.clone(),
                service: binding.service.clone(),
                expression: binding.render_call(),
            }),
            None => plan.unresolved.push(UnresolvedReference::new(
                UnresolvedKind::ContextAccess,
                accessor.as_str(),
                "no accessor binding",
            )),
        }
    }
}

fn bind_fields(unit: &CommandUnit, has_entry_point: bool, table: &RuleTable, plan: &mut ArtifactPlan) {
    for (name, spec) in unit.property_fields() {
        if !is_valid_identifier(name) {
            plan.unresolved.push(UnresolvedReference::new(
                UnresolvedKind::Field,
                name.as_str(),
                "not a valid target identifier",
            ));
            continue;
        }
        let field_rule = table.field_rule(name);
        if field_rule.is_some_and(|r| r.manual) {
            plan.unresolved.push(UnresolvedReference::new(
                UnresolvedKind::Field,
                name.as_str(),
                "flagged for manual migration",
            ));
            continue;
        }

        let default_destination = if !has_entry_point {
            FieldDestination::PersistedAttribute
        } else if spec.ty.is_scalar() {
            FieldDestination::RequestParameter
        } else {
            FieldDestination::RequestBody
        };
        let mut destination = field_rule
            .and_then(|r| r.destination)
            .unwrap_or(default_destination);
        if destination.owning_layer() == LayerKind::EntryPoint && !has_entry_point {
            plan.diagnostics.push(format!(
                "field '{name}' cannot be a request field without an entry point; persisted instead"
            ));
            destination = FieldDestination::PersistedAttribute;
        }

        plan.field_bindings.push(FieldBinding {
            name: name.clone(),
            ty: spec.ty.clone(),
            destination,
            identifying: spec.identifying || field_rule.is_some_and(|r| r.identifying),
        });
    }
}

fn bind_integrations(unit: &CommandUnit, plan: &mut ArtifactPlan) {
    for interface in unit.invoked_external_interfaces() {
        let simple = interface.rsplit('.').next().unwrap_or(interface);
        if is_valid_identifier(simple) {
            plan.integrations.push(IntegrationStub {
                interface: simple.to_string(),
                client: lower_camel(simple),
            });
        } else {
            plan.unresolved.push(UnresolvedReference::new(
                UnresolvedKind::ExternalInterface,
                interface.as_str(),
                "not a valid target identifier",
            ));
        }
    }
}
