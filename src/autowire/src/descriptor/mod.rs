mod parameter;

use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::identifier::Identifier;
use crate::instance::Instance;
use crate::value::Arguments;

pub use parameter::Parameter;

/// A shared constructor callback producing a new [`Instance`].
pub type Factory =
    Arc<dyn Fn(Arguments) -> Result<Instance, Box<dyn Error + Send + Sync>> + Send + Sync>;

/// The facility that tells a container what a type looks like.
///
/// The resolver only ever talks to this trait, so descriptors may come from
/// a [`TypeCatalog`] filled by modules, from generated code, or from
/// anything else able to describe a type.
///
/// [`TypeCatalog`]: crate::catalog::TypeCatalog
#[cfg_attr(test, mockall::automock)]
pub trait Introspector: Send + Sync + 'static {
    /// Describes the type named by `id`, or returns `None` if it is unknown.
    fn describe(&self, id: &Identifier) -> Option<TypeDescriptor>;
}

/// An introspected view of a type, recomputed on every request.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    id: Identifier,
    kind: TypeKind,
    ancestors: Vec<Identifier>,
}

impl TypeDescriptor {
    pub fn service(id: Identifier, ancestors: Vec<Identifier>, constructor: Constructor) -> Self {
        Self {
            id,
            kind: TypeKind::Service(constructor),
            ancestors,
        }
    }

    pub fn interface(id: Identifier) -> Self {
        Self {
            id,
            kind: TypeKind::Interface,
            ancestors: Vec::new(),
        }
    }

    pub fn plain(id: Identifier) -> Self {
        Self {
            id,
            kind: TypeKind::Plain,
            ancestors: Vec::new(),
        }
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn into_kind(self) -> TypeKind {
        self.kind
    }

    pub fn ancestors(&self) -> &[Identifier] {
        &self.ancestors
    }

    pub fn is_service(&self) -> bool {
        matches!(self.kind, TypeKind::Service(_))
    }
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A type satisfying the service marker, which can be constructed.
    Service(Constructor),
    /// A pure capability, which needs an alias to be resolved.
    Interface,
    /// A known type that isn't a service.
    Plain,
}

impl TypeKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Service(_) => "service",
            Self::Interface => "interface",
            Self::Plain => "plain",
        }
    }
}

#[derive(Clone)]
pub enum Constructor {
    /// The type has no user-defined constructor and is built without
    /// arguments.
    Implicit(Factory),
    Declared {
        parameters: Vec<Parameter>,
        factory: Factory,
    },
}

impl Constructor {
    pub fn implicit<F>(factory: F) -> Self
    where
        F: Fn(Arguments) -> Result<Instance, Box<dyn Error + Send + Sync>> + Send + Sync + 'static,
    {
        Self::Implicit(Arc::new(factory))
    }

    pub fn declared<F>(parameters: Vec<Parameter>, factory: F) -> Self
    where
        F: Fn(Arguments) -> Result<Instance, Box<dyn Error + Send + Sync>> + Send + Sync + 'static,
    {
        Self::Declared {
            parameters,
            factory: Arc::new(factory),
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Self::Implicit(_) => &[],
            Self::Declared { parameters, .. } => parameters,
        }
    }

    pub fn factory(&self) -> &Factory {
        match self {
            Self::Implicit(factory) => factory,
            Self::Declared { factory, .. } => factory,
        }
    }
}

impl Debug for Constructor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Implicit(_) => f.write_str("Implicit(..)"),
            Self::Declared { parameters, .. } => f
                .debug_struct("Declared")
                .field("parameters", parameters)
                .finish_non_exhaustive(),
        }
    }
}
