//! Input model builder
//!
//! Normalizes a [`RawCommand`] into an unclassified [`CommandUnit`].

use crate::error::BuildError;
use crate::raw::RawCommand;
use cmig_model::naming::is_valid_identifier;
use cmig_model::{CommandTraits, CommandUnit, FieldSpec, PropertyType};

/// Legacy suffixes stripped from command names, longest first
const LEGACY_SUFFIXES: [&str; 5] = ["CmdImpl", "CommandImpl", "Cmd", "Command", "Impl"];

/// Normalize a declared command name
///
/// Strips at most one legacy suffix, and only when something remains.
#[must_use]
pub fn normalize_name(raw: &str) -> &str {
    let name = raw.trim();
    LEGACY_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix).filter(|rest| !rest.is_empty()))
        .unwrap_or(name)
}

/// Last segment of a possibly qualified, possibly generic type name
fn simple_type_name(raw: &str) -> &str {
    let raw = raw.trim();
    let raw = raw.split('<').next().unwrap_or(raw);
    raw.rsplit('.').next().unwrap_or(raw).trim()
}

/// Build a canonical unit from a raw description
///
/// # Errors
///
/// [`BuildError`] when the name is missing or unusable, or when no
/// invocation method can be identified.
pub fn build(raw: &RawCommand) -> Result<CommandUnit, BuildError> {
    let declared = raw.name.trim();
    if declared.is_empty() {
        return Err(BuildError::MissingName);
    }
    let name = normalize_name(declared);
    if !is_valid_identifier(name) {
        return Err(BuildError::InvalidName(declared.to_string()));
    }

    let mut methods = raw
        .invocation_method
        .iter()
        .chain(&raw.methods)
        .map(|m| m.trim())
        .filter(|m| is_valid_identifier(m));
    let Some(primary) = methods.next() else {
        return Err(BuildError::MissingInvocationMethod {
            name: name.to_string(),
        });
    };

    let mut unit = CommandUnit::new(name, primary);
    for method in methods {
        unit = unit.with_invocation_method(method);
    }

    for supertype in raw.extends.iter().chain(&raw.implements) {
        let simple = simple_type_name(supertype);
        if !simple.is_empty() {
            unit = unit.with_supertype(simple);
        }
    }

    for accessor in &raw.context_accesses {
        let accessor = accessor.trim();
        if !accessor.is_empty() {
            unit = unit.with_context_access(accessor);
        }
    }

    for (field, property) in &raw.properties {
        let mut spec = FieldSpec::new(PropertyType::parse(property.declared_type()));
        if property.is_identifying() {
            spec = spec.identifying();
        }
        unit = unit.with_field(field.trim(), spec);
    }

    for interface in &raw.external_interfaces {
        let interface = interface.trim();
        if !interface.is_empty() {
            unit = unit.with_external_interface(interface);
        }
    }

    let unit = unit.with_traits(CommandTraits {
        has_branching: raw.has_branching,
        response_writes: raw.response_writes,
    });

    tracing::debug!(
        unit = unit.name(),
        methods = unit.invocation_methods().len(),
        fields = unit.property_fields().len(),
        "input model built"
    );
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawProperty;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_legacy_suffixes() {
        assert_eq!(normalize_name("DisplayInvoicesCmdImpl"), "DisplayInvoices");
        assert_eq!(normalize_name("OrderCommand"), "Order");
        assert_eq!(normalize_name("SyncJobImpl"), "SyncJob");
        assert_eq!(normalize_name("Command"), "Command");
        assert_eq!(normalize_name("  Export "), "Export");
    }

    #[test]
    fn requires_name() {
        let raw = RawCommand::new("  ").with_invocation_method("run");
        assert_eq!(build(&raw), Err(BuildError::MissingName));
    }

    #[test]
    fn rejects_unusable_name() {
        let raw = RawCommand::new("order-export").with_invocation_method("run");
        assert_eq!(
            build(&raw),
            Err(BuildError::InvalidName("order-export".into()))
        );
    }

    #[test]
    fn requires_invocation_method() {
        let raw = RawCommand::new("DisplayInvoices").with_context_access("getUserId");
        assert_eq!(
            build(&raw),
            Err(BuildError::MissingInvocationMethod {
                name: "DisplayInvoices".into()
            })
        );
    }

    #[test]
    fn blank_methods_do_not_count() {
        let raw = RawCommand::new("X").with_invocation_method(" ").with_method("");
        assert!(matches!(
            build(&raw),
            Err(BuildError::MissingInvocationMethod { .. })
        ));
    }

    #[test]
    fn explicit_invocation_method_comes_first() {
        let raw = RawCommand::new("X")
            .with_method("validate")
            .with_invocation_method("performExecute")
            .with_method("performExecute");
        let unit = build(&raw).unwrap();
        assert_eq!(unit.invocation_method(), "performExecute");
        assert_eq!(unit.invocation_methods(), ["performExecute", "validate"]);
    }

    #[test]
    fn supertypes_use_simple_names() {
        let raw = RawCommand::new("X")
            .with_invocation_method("run")
            .extending("com.ibm.commerce.command.ControllerCommandImpl")
            .implementing("java.util.List<String>");
        let unit = build(&raw).unwrap();
        assert_eq!(unit.supertypes(), ["ControllerCommandImpl", "List"]);
    }

    #[test]
    fn accessors_keep_duplicates_and_order() {
        let raw = RawCommand::new("X")
            .with_invocation_method("run")
            .with_context_access("getStoreId")
            .with_context_access("getUserId")
            .with_context_access("getStoreId");
        let unit = build(&raw).unwrap();
        assert_eq!(unit.context_accesses(), ["getStoreId", "getUserId", "getStoreId"]);
    }

    #[test]
    fn unknown_types_become_untyped() {
        let raw = RawCommand::new("X")
            .with_invocation_method("run")
            .with_property("payload", "TypedProperty")
            .with_property("amount", "BigDecimal")
            .with_property(
                "code",
                RawProperty::Detailed {
                    ty: None,
                    identifying: true,
                },
            );
        let unit = build(&raw).unwrap();
        let fields = unit.property_fields();
        assert_eq!(fields["payload"].ty, PropertyType::Untyped);
        assert_eq!(fields["amount"].ty, PropertyType::Decimal);
        assert_eq!(fields["code"].ty, PropertyType::Untyped);
        assert!(fields["code"].identifying);
        assert_eq!(
            fields.keys().collect::<Vec<_>>(),
            ["payload", "amount", "code"]
        );
    }

    #[test]
    fn built_unit_is_unclassified() {
        let raw = RawCommand::new("X").with_invocation_method("run");
        assert!(!build(&raw).unwrap().is_classified());
    }
}
