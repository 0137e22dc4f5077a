use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use snafu::prelude::*;

use crate::identifier::Identifier;

#[derive(Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum ResolveError {
    #[snafu(display("could not find any type identified by {id}"))]
    #[non_exhaustive]
    TypeNotFound { id: Identifier },
    #[snafu(display("could not resolve the interface {id} without an alias to its implementation"))]
    #[non_exhaustive]
    InterfaceWithoutAlias { id: Identifier },
    #[snafu(display("could not resolve {id} which is not a service"))]
    #[non_exhaustive]
    NotAService { id: Identifier },
    #[snafu(display(
        "could not autowire parameter `{parameter}` at position {position} of {owner}: {problem}"
    ))]
    #[non_exhaustive]
    ParameterResolution {
        owner: Identifier,
        parameter: String,
        position: usize,
        problem: ParameterProblem,
    },
    #[snafu(display(
        "could not resolve parameter `{parameter}` at position {position} of {owner}"
    ))]
    #[non_exhaustive]
    Dependency {
        owner: Identifier,
        parameter: String,
        position: usize,
        source: Box<ResolveError>,
    },
    #[snafu(display("could not construct the object {id}"))]
    #[non_exhaustive]
    Construction {
        id: Identifier,
        source: Arc<dyn Error + Send + Sync>,
    },
    #[snafu(display(
        "could not construct the object {id} which depends on itself: {}",
        PathDisplayer::new(path)
    ))]
    #[non_exhaustive]
    CircularDependency { id: Identifier, path: Vec<Identifier> },
    #[snafu(display("the construction of {id} was abandoned before it finished"))]
    #[non_exhaustive]
    Abandoned { id: Identifier },
    #[snafu(display("the object {id} offers no view of type {view}"))]
    #[non_exhaustive]
    ViewUnavailable { id: Identifier, view: &'static str },
}

impl ResolveError {
    /// Strips the [`ResolveError::Dependency`] layers added while walking
    /// down constructor parameters.
    pub fn root_cause(&self) -> &ResolveError {
        let mut err = self;
        while let Self::Dependency { source, .. } = err {
            err = source;
        }
        err
    }
}

/// Why a required constructor parameter can't be autowired.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParameterProblem {
    Untyped,
    Primitive { declared: Identifier },
}

impl Display for ParameterProblem {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Untyped => write!(f, "the parameter has no declared type"),
            Self::Primitive { declared } => {
                write!(f, "the declared type {declared} is not an object type")
            }
        }
    }
}

struct PathDisplayer<'a> {
    path: &'a [Identifier],
}

impl<'a> PathDisplayer<'a> {
    fn new(path: &'a [Identifier]) -> Self {
        Self { path }
    }
}

impl Display for PathDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, id) in self.path.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}
