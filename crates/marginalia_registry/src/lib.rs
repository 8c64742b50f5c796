//! Annotation identifiers, aliases, instances, and queries for Marginalia.
//!
//! This crate provides:
//! - [`Registry`] - Identifier directory and owner of the reflection graph
//! - [`IdentifierOptions`] - Target and multiplicity rules of an identifier
//! - [`Identifier`], [`Alias`] - Declared annotation kinds and their aliases
//! - [`Attachment`] - Explicit description of where an identifier is applied
//! - [`Forked`], [`Instance`], [`InstanceView`] - Applications of an identifier
//! - [`IdentifierQuery`] - Read-side value and single-field queries
//! - [`RegistryConfig`] - Root detection, memoization, and diagnostics

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod attachment;
mod config;
mod identifier;
mod instance;
mod options;
mod query;
mod registry;

pub use attachment::{Attachment, Site};
pub use config::RegistryConfig;
pub use identifier::{Alias, AliasCondition, Identifier};
pub use instance::{Forked, Instance, InstanceView};
pub use options::IdentifierOptions;
pub use query::IdentifierQuery;
pub use registry::{DecoRef, Registry};
