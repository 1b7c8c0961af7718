//! CMIG Model
//!
//! Shared vocabulary of the command migration pipeline.
//!
//! # Core Concepts
//!
//! - [`CommandUnit`]: canonical, classified-once view of a legacy command
//! - [`LayerKind`]: one layer of the target architecture
//! - [`Artifact`]: structured description of one emitted unit
//! - [`Fingerprint`]: 32-byte Blake3 digest used to compare results
//!
//! # Example
//!
//! ```rust,ignore
//! use cmig_model::{CommandUnit, FieldSpec, PropertyType};
//!
//! let unit = CommandUnit::new("DisplayInvoices", "performExecute")
//!     .with_context_access("getUserId")
//!     .with_field("invoiceId", FieldSpec::new(PropertyType::String));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artifact;
mod command;
mod hash;
mod layer;

/// Target naming conventions
pub mod naming;

pub use artifact::{
    Artifact, ArtifactBody, ArtifactSet, BulkDataBody, DataAccessBody, Endpoint, EntryPointBody,
    FacadeBody, FieldBinding, FieldDestination, HttpVerb, IntegrationStub, MethodSignature,
    Parameter, ServiceBody, ServiceCall, WiringBody, WiringEntry,
};
pub use command::{
    Category, Classification, CommandTraits, CommandUnit, Confidence, FieldSpec, PropertyType,
};
pub use hash::{Fingerprint, FingerprintError};
pub use layer::{LayerKind, LayerSet};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
