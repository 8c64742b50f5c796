//! Class, property, and parameter reflection for Marginalia.
//!
//! This crate provides:
//! - [`Constructor`], [`Body`], [`Object`] - Declared class structure
//! - [`TypeIntrospector`] - Pluggable member type discovery
//! - [`Filter`] - Belongs/scope/keyword/kind query dimensions
//! - [`DecoratorMap`] - Ordered per-element annotation values
//! - [`ReflectStore`] - Arena owning every class, property, and parameter reflect
//! - [`ClassView`], [`PropertyView`], [`ParameterView`] - Borrowed read handles
//! - [`Reflected`] - Decorator operations shared by every view

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod class;
mod decorator;
mod element;
mod filter;
mod introspect;
mod model;
mod parameter;
mod property;
mod store;

pub use class::ClassView;
pub use decorator::{DecoratorMap, DecoratorRule, Touch};
pub use element::{ElementRef, Reflected};
pub use filter::{Belongs, Filter, Keyword, Kind, Scope};
pub use introspect::{DeclaredTypes, MemberType, NoTypes, TypeIntrospector};
pub use model::{Body, Callable, ClassRef, Constructor, ConstructorBuilder, MemberDef, MemberValue, Object};
pub use parameter::ParameterView;
pub use property::PropertyView;
pub use store::{DEFAULT_BUILTIN_ROOTS, ReflectStore};
