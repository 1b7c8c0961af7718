//! Target layer kinds

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// One layer of the target architecture
///
/// Declaration order is the canonical emission order, so a
/// [`LayerSet`] always iterates entry point first and bulk data last.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum LayerKind {
    EntryPoint,
    Service,
    DataAccess,
    Facade,
    Wiring,
    BulkData,
}

impl LayerKind {
    /// Every layer, in canonical order
    pub const ALL: [LayerKind; 6] = [
        Self::EntryPoint,
        Self::Service,
        Self::DataAccess,
        Self::Facade,
        Self::Wiring,
        Self::BulkData,
    ];

    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EntryPoint => "EntryPoint",
            Self::Service => "Service",
            Self::DataAccess => "DataAccess",
            Self::Facade => "Facade",
            Self::Wiring => "Wiring",
            Self::BulkData => "BulkData",
        }
    }

    /// Layers that are always derived and never requested by a rule shape
    #[inline]
    #[must_use]
    pub const fn is_derived(self) -> bool {
        matches!(self, Self::Wiring | Self::BulkData)
    }
}

impl Display for LayerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of layer kinds
pub type LayerSet = BTreeSet<LayerKind>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_set_iterates_canonically() {
        let set: LayerSet = [LayerKind::Wiring, LayerKind::Service, LayerKind::EntryPoint]
            .into_iter()
            .collect();
        let order: Vec<_> = set.into_iter().collect();
        assert_eq!(
            order,
            vec![LayerKind::EntryPoint, LayerKind::Service, LayerKind::Wiring]
        );
    }

    #[test]
    fn derived_layers() {
        assert!(LayerKind::Wiring.is_derived());
        assert!(LayerKind::BulkData.is_derived());
        assert!(!LayerKind::Facade.is_derived());
    }
}
