//! Core values, type handles, arena ids, and errors for Marginalia.
//!
//! This crate provides:
//! - [`Value`] and [`Record`] - The payloads stored by annotations
//! - [`Type`] - Opaque type handles reported by type introspection
//! - Arena ids ([`ClassId`], [`PropertyId`], [`ParameterId`], [`IdentifierId`], ...)
//! - [`Token`] - Identity of a declaring function
//! - [`Target`] - The structural site an annotation is attached to
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`LtVec`], [`LtMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod collections;
mod error;
mod ids;
mod target;
mod token;
mod types;
mod value;

pub use collections::{LtMap, LtVec};
pub use error::{Error, ErrorContext, ErrorKind};
pub use ids::{AliasId, ClassId, IdentifierId, InstanceId, ParameterId, PropertyId};
pub use target::Target;
pub use token::Token;
pub use types::Type;
pub use value::{Record, Value};

/// Result type alias using Marginalia's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
