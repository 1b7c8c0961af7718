//! CMIG Engine
//!
//! The pure stages of a command migration, leaves first:
//!
//! 1. [`builder::build`]: raw description → [`CommandUnit`](cmig_model::CommandUnit)
//! 2. [`classifier::classify`]: fix the category
//! 3. [`engine::apply`]: rule table → [`ArtifactPlan`]
//! 4. [`generator::generate`]: plan → [`ArtifactSet`](cmig_model::ArtifactSet)
//! 5. [`validator::validate`]: artifact set → [`ValidationVerdict`]
//!
//! No stage performs I/O or keeps state between calls.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod plan;
mod raw;

pub mod builder;
pub mod classifier;
pub mod engine;
pub mod generator;
pub mod validator;

pub use error::BuildError;
pub use plan::{ArtifactPlan, EntryPointPlan, UnresolvedKind, UnresolvedReference};
pub use raw::{RawCommand, RawProperty};
pub use validator::{ValidationVerdict, Violation};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
