//! End-to-end runs of the pure stages

use cmig_engine::{
    builder, classifier, engine, generator, validator, ArtifactPlan, BuildError, RawCommand,
    UnresolvedKind, ValidationVerdict,
};
use cmig_model::{ArtifactBody, ArtifactSet, Category, LayerKind};
use cmig_rules::RuleTable;
use cmig_test_utils::{
    arb_raw_command, classified, create_voucher, default_rules, display_invoices,
    entry_point_generic_rules, generic_only_rules, headless_command, loyalty_lookup,
    nightly_export,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn plan(raw: &RawCommand, table: &RuleTable) -> ArtifactPlan {
    engine::apply(&classified(raw), table)
}

fn run(raw: &RawCommand) -> (ArtifactPlan, ArtifactSet, ValidationVerdict) {
    let plan = plan(raw, &default_rules());
    let set = generator::generate(plan.clone());
    let verdict = validator::validate(&set);
    (plan, set, verdict)
}

#[test]
fn scenario_a_display_invoices() {
    let (plan, set, verdict) = run(&display_invoices());
    assert_eq!(plan.category, Category::RequestHandler);

    let ids: BTreeSet<&str> = set.iter().map(|a| a.identifier.as_str()).collect();
    for expected in [
        "DisplayInvoicesController",
        "DisplayInvoicesService",
        "DisplayInvoicesDAO",
        "displayInvoicesWiring",
    ] {
        assert!(ids.contains(expected), "missing {expected}");
    }
    assert_eq!(ids.len(), 4, "no facade or bulk data for a simple handler");
    assert_eq!(
        set.get("DisplayInvoicesService").unwrap().implementation(),
        Some("DefaultDisplayInvoicesService")
    );
    assert_eq!(
        set.get("DisplayInvoicesDAO").unwrap().implementation(),
        Some("DefaultDisplayInvoicesDAO")
    );

    let ArtifactBody::Service(service) = &set.get("DisplayInvoicesService").unwrap().body else {
        panic!("expected service body");
    };
    assert_eq!(service.context_calls.len(), 1);
    assert_eq!(service.context_calls[0].accessor, "getUserId");

    assert!(plan.unresolved.is_empty());
    assert_eq!(verdict, ValidationVerdict::Valid);
}

#[test]
fn scenario_b_unbound_accessor_is_surfaced() {
    let (plan, _, verdict) = run(&loyalty_lookup());
    assert_eq!(plan.unresolved_names(), vec!["getLoyaltyTier"]);
    assert_eq!(plan.unresolved[0].kind, UnresolvedKind::ContextAccess);
    assert!(verdict.is_valid());
}

#[test]
fn scenario_c_missing_invocation_method() {
    assert_eq!(
        builder::build(&headless_command()),
        Err(BuildError::MissingInvocationMethod {
            name: "Orphan".into()
        })
    );
}

#[test]
fn background_task_pipeline() {
    let (plan, set, verdict) = run(&nightly_export());
    assert_eq!(plan.unit, "NightlyExport");
    assert_eq!(plan.category, Category::BackgroundTask);
    assert!(set.by_layer(LayerKind::EntryPoint).is_none());
    assert!(set.get("NightlyExportDAO").is_some());
    assert!(verdict.is_valid());
}

#[test]
fn rich_request_handler_pipeline() {
    let (plan, set, verdict) = run(&create_voucher());
    assert_eq!(plan.unit, "CreateVoucher");
    assert_eq!(
        set.layers().into_iter().collect::<Vec<_>>(),
        LayerKind::ALL.to_vec()
    );
    assert!(set.get("CreateVoucherFacade").is_some());
    assert!(set.get("CreateVoucherInitialData").is_some());
    assert!(verdict.is_valid());
}

#[test]
fn generic_only_table_still_produces_valid_sets() {
    let table = generic_only_rules();
    let plan = plan(&display_invoices(), &table);
    assert_eq!(plan.category, Category::RequestHandler);
    assert!(!plan.has_layer(LayerKind::EntryPoint));
    let verdict = validator::validate(&generator::generate(plan));
    assert!(matches!(
        verdict.violations(),
        [cmig_engine::Violation::IncompleteLayering {
            missing_layer: LayerKind::EntryPoint
        }]
    ));
}

#[test]
fn background_task_drops_entry_point_from_generic_shape() {
    let table = entry_point_generic_rules();
    let raw = RawCommand::new("NightlySync").with_invocation_method("run");
    let plan = plan(&raw, &table);
    assert_eq!(plan.category, Category::BackgroundTask);
    assert!(!plan.has_layer(LayerKind::EntryPoint));

    let set = generator::generate(plan);
    assert!(set.by_layer(LayerKind::EntryPoint).is_none());
    assert_eq!(validator::validate(&set), ValidationVerdict::Valid);
}

#[test]
fn classification_survives_the_pipeline() {
    let unit = classified(&display_invoices());
    let again = classifier::classify(unit.clone());
    assert_eq!(unit, again);
}

proptest! {
    #[test]
    fn prop_category_layering(raw in arb_raw_command()) {
        let (plan, set, _) = run(&raw);
        let layers = set.layers();
        prop_assert!(layers.contains(&LayerKind::Service));
        prop_assert!(layers.contains(&LayerKind::Wiring));
        match plan.category {
            Category::RequestHandler => prop_assert!(layers.contains(&LayerKind::EntryPoint)),
            Category::BackgroundTask => prop_assert!(!layers.contains(&LayerKind::EntryPoint)),
            Category::Unknown => {}
        }
        prop_assert_eq!(layers, plan.target_layers);
    }

    #[test]
    fn prop_background_tasks_never_get_entry_points(raw in arb_raw_command()) {
        let plan = plan(&raw, &entry_point_generic_rules());
        if plan.category == Category::BackgroundTask {
            prop_assert!(!plan.has_layer(LayerKind::EntryPoint));
            prop_assert!(plan.entry_point.is_none());
        }
        let verdict = validator::validate(&generator::generate(plan));
        prop_assert!(verdict.is_valid(), "{:?}", verdict);
    }

    #[test]
    fn prop_default_rules_always_valid(raw in arb_raw_command()) {
        let (_, set, verdict) = run(&raw);
        prop_assert!(verdict.is_valid(), "{:?}", verdict);
        for artifact in set.iter() {
            for dep in &artifact.depends_on {
                prop_assert!(set.get(dep).is_some());
            }
        }
    }

    #[test]
    fn prop_every_reference_accounted_once(raw in arb_raw_command()) {
        let unit = classified(&raw);
        let plan = engine::apply(&unit, &default_rules());

        let accessors: BTreeSet<&str> = unit.context_accesses().iter().map(String::as_str).collect();
        for accessor in &accessors {
            let bound = plan.service_calls.iter().filter(|c| c.accessor == *accessor).count();
            let unresolved = plan
                .unresolved
                .iter()
                .filter(|u| u.kind == UnresolvedKind::ContextAccess && u.name == *accessor)
                .count();
            prop_assert_eq!(bound + unresolved, 1, "accessor {}", accessor);
        }

        for field in unit.property_fields().keys() {
            let bound = plan.field_bindings.iter().filter(|b| &b.name == field).count();
            let unresolved = plan
                .unresolved
                .iter()
                .filter(|u| u.kind == UnresolvedKind::Field && &u.name == field)
                .count();
            prop_assert_eq!(bound + unresolved, 1, "field {}", field);
        }
    }

    #[test]
    fn prop_serialized_output_is_stable(raw in arb_raw_command()) {
        let first = serde_json::to_string(&run(&raw).1).unwrap();
        let second = serde_json::to_string(&run(&raw).1).unwrap();
        prop_assert_eq!(first, second);
    }
}
