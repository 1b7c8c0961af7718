//! CMIG Rules
//!
//! Static, versioned mapping data for command migration. A [`RuleTable`]
//! is loaded once, validated, and then shared read-only by every job.
//!
//! ```rust,ignore
//! use cmig_rules::{default_table, loader};
//!
//! let table = match path {
//!     Some(p) => Arc::new(loader::load(p)?),
//!     None => default_table(),
//! };
//! let rule = table.rule_for(unit.category());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod defaults;
mod error;
mod table;

/// Format-aware loading
pub mod loader;

pub use defaults::{default_document, default_table, DEFAULT_VERSION};
pub use error::{Result, RuleTableError};
pub use loader::RuleFormat;
pub use table::{
    AccessorBinding, EntryPointBinding, FacadePolicy, FieldRule, MappingRule, RuleMatch, RuleTable,
    RuleTableDocument,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
