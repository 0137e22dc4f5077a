mod context;
mod core;
mod error;
mod handle;
mod instantiator;
mod registry;

pub use error::{ParameterProblem, ResolveError};
pub use handle::{Container, ContainerRef};
pub use registry::RegistryError;
