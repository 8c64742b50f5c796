//! Marginalia - Annotation registry and class reflection
//!
//! This crate re-exports all layers of the Marginalia system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: marginalia_registry   — Identifiers, aliases, forking, queries
//! Layer 1: marginalia_reflect    — Class, property, and parameter reflects
//! Layer 0: marginalia_foundation — Core types (Value, Record, Token, Error)
//! ```

pub use marginalia_foundation as foundation;
pub use marginalia_reflect as reflect;
pub use marginalia_registry as registry;
