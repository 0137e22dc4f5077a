#![allow(clippy::new_without_default)]

extern crate self as autowire;

pub mod catalog;
pub mod component;
pub mod container;
pub mod descriptor;
pub mod identifier;
pub mod instance;
pub mod module;
pub mod value;

pub use autowire_derive::component;

pub mod prelude {
    pub use crate::catalog::{CatalogError, Configurer, TypedConfigurer};
    pub use crate::component;
    pub use crate::container::{Container, ContainerRef, RegistryError, ResolveError};
    pub use crate::identifier::{Identifier, Identify};
    pub use crate::instance::{Instance, Overrides, Service};
    pub use crate::module::{Configuration, Module};
    pub use crate::value::Value;
}
