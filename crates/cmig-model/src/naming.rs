//! Target naming conventions
//!
//! | layer      | identifier            | implementation         |
//! |------------|-----------------------|------------------------|
//! | EntryPoint | `<Name>Controller`    |                        |
//! | Service    | `<Name>Service`       | `Default<Name>Service` |
//! | DataAccess | `<Name>DAO`           | `Default<Name>DAO`     |
//! | Facade     | `<Name>Facade`        | `Default<Name>Facade`  |
//! | Wiring     | `<name>Wiring`        |                        |
//! | BulkData   | `<Name>InitialData`   |                        |

use crate::layer::LayerKind;
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

/// True when `s` can be used verbatim as a target identifier
#[inline]
#[must_use]
pub fn is_valid_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Upper-case the first character
#[must_use]
pub fn upper_camel(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character
#[must_use]
pub fn lower_camel(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Artifact identifier for `layer` of unit `name`
#[must_use]
pub fn identifier_for(layer: LayerKind, name: &str) -> String {
    let pascal = upper_camel(name);
    match layer {
        LayerKind::EntryPoint => format!("{pascal}Controller"),
        LayerKind::Service => format!("{pascal}Service"),
        LayerKind::DataAccess => format!("{pascal}DAO"),
        LayerKind::Facade => format!("{pascal}Facade"),
        LayerKind::Wiring => format!("{}Wiring", lower_camel(name)),
        LayerKind::BulkData => format!("{pascal}InitialData"),
    }
}

/// Implementation class for layers that split interface and implementation
#[must_use]
pub fn implementation_for(layer: LayerKind, name: &str) -> Option<String> {
    match layer {
        LayerKind::Service | LayerKind::DataAccess | LayerKind::Facade => {
            Some(format!("Default{}", identifier_for(layer, name)))
        }
        LayerKind::EntryPoint | LayerKind::Wiring | LayerKind::BulkData => None,
    }
}

/// Bean id for a class name (`DefaultFooService` → `defaultFooService`)
#[inline]
#[must_use]
pub fn bean_id(class_name: &str) -> String {
    lower_camel(class_name)
}

/// Request DTO type for unit `name`
#[inline]
#[must_use]
pub fn dto_for(name: &str) -> String {
    format!("{}DTO", upper_camel(name))
}

/// Persisted item model for unit `name` (`Voucher` → `VoucherModel`)
#[inline]
#[must_use]
pub fn model_for(name: &str) -> String {
    format!("{}Model", upper_camel(name))
}

/// Type code of an item model, as used in queries and ImpEx headers
#[must_use]
pub fn type_code(model: &str) -> &str {
    model.strip_suffix("Model").filter(|s| !s.is_empty()).unwrap_or(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn naming_table() {
        let name = "DisplayInvoices";
        assert_eq!(identifier_for(LayerKind::EntryPoint, name), "DisplayInvoicesController");
        assert_eq!(identifier_for(LayerKind::Service, name), "DisplayInvoicesService");
        assert_eq!(identifier_for(LayerKind::DataAccess, name), "DisplayInvoicesDAO");
        assert_eq!(identifier_for(LayerKind::Facade, name), "DisplayInvoicesFacade");
        assert_eq!(identifier_for(LayerKind::Wiring, name), "displayInvoicesWiring");
        assert_eq!(identifier_for(LayerKind::BulkData, name), "DisplayInvoicesInitialData");
    }

    #[test]
    fn implementations() {
        assert_eq!(
            implementation_for(LayerKind::Service, "DisplayInvoices").as_deref(),
            Some("DefaultDisplayInvoicesService")
        );
        assert_eq!(
            implementation_for(LayerKind::DataAccess, "DisplayInvoices").as_deref(),
            Some("DefaultDisplayInvoicesDAO")
        );
        assert_eq!(implementation_for(LayerKind::Wiring, "DisplayInvoices"), None);
    }

    #[test]
    fn models_and_type_codes() {
        assert_eq!(model_for("createVoucher"), "CreateVoucherModel");
        assert_eq!(type_code("CreateVoucherModel"), "CreateVoucher");
        assert_eq!(type_code("Model"), "Model");
        assert_eq!(type_code("Order"), "Order");
    }

    #[test]
    fn identifiers() {
        assert!(is_valid_identifier("invoiceId"));
        assert!(is_valid_identifier("_x1"));
        assert!(!is_valid_identifier("order-id"));
        assert!(!is_valid_identifier("1st"));
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn bean_ids() {
        assert_eq!(bean_id("DefaultOrderService"), "defaultOrderService");
        assert_eq!(dto_for("order"), "OrderDTO");
    }

    proptest! {
        #[test]
        fn prop_identifiers_are_valid(name in "[A-Z][A-Za-z0-9]{0,20}") {
            for layer in LayerKind::ALL {
                prop_assert!(is_valid_identifier(&identifier_for(layer, &name)));
            }
        }
    }
}
