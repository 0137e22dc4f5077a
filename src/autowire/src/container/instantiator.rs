use std::sync::Arc;

use tracing::trace;

use crate::container::context::CallContext;
use crate::container::core::ContainerCore;
use crate::container::error::{ParameterProblem, ResolveError};
use crate::descriptor::{Constructor, Parameter};
use crate::identifier::Identifier;
use crate::instance::{Instance, Overrides};
use crate::value::{Arguments, Value};

impl ContainerCore {
    /// Builds a new object of canonical `id`. The object itself isn't cached,
    /// but the dependencies resolved on the way are.
    pub fn instantiate(&self, id: &Identifier, overrides: &Overrides) -> Result<Instance, ResolveError> {
        let constructor = self.describe_constructor(id)?;
        let context = CallContext::new(id, overrides);
        self.instantiate_in(constructor, &context)
    }

    /// Builds a new object for `context.id()` without touching the cache.
    pub(super) fn instantiate_in(
        &self,
        constructor: Constructor,
        context: &CallContext<'_>,
    ) -> Result<Instance, ResolveError> {
        let id = context.id();
        let arguments = constructor
            .parameters()
            .iter()
            .map(|parameter| self.argument_for(parameter, context))
            .collect::<Result<Vec<_>, _>>()?;

        trace!(%id, arguments = arguments.len(), "invoking constructor");
        let factory = constructor.factory();
        factory(Arguments::new(arguments)).map_err(|source| ResolveError::Construction {
            id: id.clone(),
            source: Arc::from(source),
        })
    }

    fn argument_for(
        &self,
        parameter: &Parameter,
        context: &CallContext<'_>,
    ) -> Result<Value, ResolveError> {
        let Some(declared) = parameter.declared() else {
            return self.default_for(parameter, context, ParameterProblem::Untyped);
        };
        if parameter.is_primitive() {
            let problem = ParameterProblem::Primitive {
                declared: declared.clone(),
            };
            return self.default_for(parameter, context, problem);
        }

        if let Some(object) = context.overrides().get(declared) {
            return Ok(Value::Object(object.clone()));
        }
        if parameter.is_optional() && !self.is_resolvable(declared) {
            return Ok(parameter.default_value().cloned().unwrap_or_default());
        }

        self.resolve_dependency(declared, context)
            .map(Value::Object)
            .map_err(|source| dependency_error(context.id(), parameter, source))
    }

    /// The declared default of an optional parameter, or the reason a
    /// required one can't be autowired.
    fn default_for(
        &self,
        parameter: &Parameter,
        context: &CallContext<'_>,
        problem: ParameterProblem,
    ) -> Result<Value, ResolveError> {
        match parameter.default_value() {
            Some(default) => Ok(default.clone()),
            None => Err(ResolveError::ParameterResolution {
                owner: context.id().clone(),
                parameter: parameter.name().to_owned(),
                position: parameter.position(),
                problem,
            }),
        }
    }
}

fn dependency_error(owner: &Identifier, parameter: &Parameter, source: ResolveError) -> ResolveError {
    ResolveError::Dependency {
        owner: owner.clone(),
        parameter: parameter.name().to_owned(),
        position: parameter.position(),
        source: Box::new(source),
    }
}
