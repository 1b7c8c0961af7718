//! Testing utilities for CMIG workspace
//!
//! Shared fixtures, scenario inputs and proptest strategies.

#![allow(missing_docs)]

use cmig_engine::{builder, classifier, RawCommand, RawProperty};
use cmig_model::{CommandUnit, LayerKind};
use cmig_rules::{RuleTable, RuleTableDocument};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use std::sync::Arc;

/// Scenario A: request handler with one bound accessor and one scalar field
pub fn display_invoices() -> RawCommand {
    RawCommand::new("DisplayInvoices")
        .with_invocation_method("performExecute")
        .with_context_access("getUserId")
        .with_property("invoiceId", "string")
}

/// Scenario B: like A, plus an accessor no rule binds
pub fn loyalty_lookup() -> RawCommand {
    display_invoices().with_context_access("getLoyaltyTier")
}

/// Scenario C: no invocation method at all
pub fn headless_command() -> RawCommand {
    RawCommand::new("Orphan")
        .with_context_access("getUserId")
        .with_property("invoiceId", "string")
}

/// Background task that reads the store and calls out to an ERP
pub fn nightly_export() -> RawCommand {
    RawCommand::new("NightlyExportCmdImpl")
        .with_invocation_method("run")
        .extending("com.acme.jobs.AbstractJobPerformable")
        .with_context_access("getStoreId")
        .with_property("batchSize", "int")
        .with_property("lines", "List<String>")
        .with_external_interface("com.acme.erp.ErpGateway")
}

/// Request handler with branching, a DTO and an identifying field
pub fn create_voucher() -> RawCommand {
    RawCommand::new("CreateVoucherCmd")
        .with_invocation_method("performExecute")
        .extending("ControllerCommandImpl")
        .with_context_access("getStore")
        .with_property("code", "String")
        .with_property("value", "java.math.BigDecimal")
        .with_property("restrictions", "List<VoucherRestriction>")
        .with_branching()
        .with_response_writes(3)
}

/// Build and classify, panicking on malformed input
pub fn classified(raw: &RawCommand) -> CommandUnit {
    classifier::classify(builder::build(raw).expect("fixture is well formed"))
}

/// Built-in rule table
pub fn default_rules() -> Arc<RuleTable> {
    cmig_rules::default_table()
}

/// Table with only a `Generic` rule over `[Service]`
pub fn generic_only_rules() -> RuleTable {
    let mut doc: RuleTableDocument = cmig_rules::default_document();
    doc.rules
        .retain(|r| r.match_category == cmig_rules::RuleMatch::Generic);
    RuleTable::try_from(doc).expect("generic-only table is valid")
}

/// Table whose only rule is a `Generic` one that includes `EntryPoint`
pub fn entry_point_generic_rules() -> RuleTable {
    let mut doc: RuleTableDocument = cmig_rules::default_document();
    doc.rules
        .retain(|r| r.match_category == cmig_rules::RuleMatch::Generic);
    for rule in &mut doc.rules {
        rule.target_shape = vec![LayerKind::EntryPoint, LayerKind::Service, LayerKind::DataAccess];
    }
    RuleTable::try_from(doc).expect("entry point generic table is valid")
}

const ACCESSORS: &[&str] = &[
    "getUserId",
    "getUser",
    "getStoreId",
    "getCart",
    "getLocale",
    "getLoyaltyTier",
    "getSegment",
    "getAffiliate",
];

const METHODS: &[&str] = &[
    "performExecute",
    "handleRequest",
    "doGet",
    "doPost",
    "run",
    "executeTask",
    "performJob",
    "execute",
    "process",
];

const SUPERTYPES: &[&str] = &[
    "ControllerCommandImpl",
    "TaskCommandImpl",
    "AbstractJobPerformable",
    "BaseCommand",
];

const TYPES: &[&str] = &[
    "String",
    "int",
    "Long",
    "BigDecimal",
    "boolean",
    "Date",
    "List<String>",
    "Map<String, Integer>",
    "OrderModel",
    "TypedProperty",
    "",
];

/// Arbitrary well-formed raw command
pub fn arb_raw_command() -> impl Strategy<Value = RawCommand> {
    (
        "[A-Z][a-zA-Z]{2,12}",
        vec(prop::sample::select(METHODS), 1..3),
        prop::option::of(prop::sample::select(SUPERTYPES)),
        vec(prop::sample::select(ACCESSORS), 0..6),
        btree_map(
            "[a-z][a-zA-Z0-9]{0,8}|[a-z]+-[a-z]+",
            (prop::sample::select(TYPES), any::<bool>()),
            0..6,
        ),
        any::<bool>(),
        0u32..4,
    )
        .prop_map(
            |(name, methods, supertype, accessors, fields, branching, writes)| {
                let mut raw = RawCommand::new(name);
                raw.methods = methods.into_iter().map(str::to_string).collect();
                raw.extends = supertype.map(str::to_string);
                raw.context_accesses = accessors.into_iter().map(str::to_string).collect();
                for (field, (ty, identifying)) in fields {
                    raw.properties.insert(
                        field,
                        RawProperty::Detailed {
                            ty: Some(ty.to_string()),
                            identifying,
                        },
                    );
                }
                raw.has_branching = branching;
                raw.response_writes = writes;
                raw
            },
        )
}
