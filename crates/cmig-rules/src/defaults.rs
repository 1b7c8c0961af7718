//! Built-in rule table

use crate::table::{
    AccessorBinding, EntryPointBinding, FacadePolicy, FieldRule, MappingRule, RuleMatch, RuleTable,
    RuleTableDocument,
};
use cmig_model::{HttpVerb, LayerKind};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Version string of the built-in table
pub const DEFAULT_VERSION: &str = "2024.1";

static DEFAULT_TABLE: Lazy<Arc<RuleTable>> = Lazy::new(|| {
    Arc::new(RuleTable::try_from(default_document()).expect("built-in rule table is valid"))
});

/// Shared handle to the built-in table
#[must_use]
pub fn default_table() -> Arc<RuleTable> {
    Arc::clone(&DEFAULT_TABLE)
}

fn accessor_bindings() -> Vec<AccessorBinding> {
    [
        ("getUserId", "userService", "{service}.getCurrentUser().getUid()"),
        ("getUser", "userService", "{service}.getCurrentUser()"),
        ("getStoreId", "baseStoreService", "{service}.getCurrentBaseStore().getUid()"),
        ("getStore", "baseStoreService", "{service}.getCurrentBaseStore()"),
        ("getLanguageId", "commonI18NService", "{service}.getCurrentLanguage().getIsocode()"),
        ("getLocale", "i18nService", "{service}.getCurrentLocale()"),
        ("getCurrency", "commonI18NService", "{service}.getCurrentCurrency()"),
        ("getCatalogId", "catalogVersionService", "{service}.getSessionCatalogVersions()"),
        ("getSession", "sessionService", "{service}.getCurrentSession()"),
        ("getCart", "cartService", "{service}.getSessionCart()"),
    ]
    .into_iter()
    .map(|(accessor, service, call)| AccessorBinding::new(accessor, service).with_call(call))
    .collect()
}

fn entry_point_bindings() -> Vec<EntryPointBinding> {
    [
        ("performExecute", HttpVerb::Post),
        ("handleRequest", HttpVerb::Post),
        ("doPost", HttpVerb::Post),
        ("create", HttpVerb::Post),
        ("doGet", HttpVerb::Get),
        ("display", HttpVerb::Get),
        ("find", HttpVerb::Get),
        ("update", HttpVerb::Put),
        ("delete", HttpVerb::Delete),
    ]
    .into_iter()
    .map(|(method, verb)| EntryPointBinding::new(method, verb))
    .collect()
}

/// Serialized form of the built-in table
#[must_use]
pub fn default_document() -> RuleTableDocument {
    RuleTableDocument {
        version: DEFAULT_VERSION.to_string(),
        rules: vec![
            MappingRule::new(
                RuleMatch::RequestHandler,
                [LayerKind::EntryPoint, LayerKind::Service, LayerKind::DataAccess],
            )
            .with_facade(FacadePolicy::WhenComplex)
            .with_accessors(accessor_bindings())
            .with_entry_points(entry_point_bindings()),
            MappingRule::new(
                RuleMatch::BackgroundTask,
                [LayerKind::Service, LayerKind::DataAccess],
            )
            .with_accessors(accessor_bindings()),
            MappingRule::new(RuleMatch::Generic, [LayerKind::Service, LayerKind::DataAccess])
                .with_accessors(accessor_bindings()),
        ],
        field_rules: vec![FieldRule::new("code").identifying()],
    }
}
