use std::error::Error;
use std::sync::Arc;

use crate::descriptor::{Constructor, Parameter, TypeDescriptor};
use crate::identifier::Identifier;
use crate::instance::{Instance, Service};
use crate::value::{ArgumentError, Arguments};

/// A service with a constructor the container can call.
///
/// Usually, you don't need to implement the [`Component`] trait manually for
/// your components, because the [`component`] macro helps with this. In case
/// that you really want to write implementation in your own, take a look at
/// the following code snippet:
///
/// ```rust
/// # use std::sync::Arc;
/// # use std::convert::Infallible;
/// # use autowire::component::Component;
/// # use autowire::descriptor::Parameter;
/// # use autowire::instance::Service;
/// # use autowire::value::{ArgumentError, Arguments};
/// #
/// struct Clock;
///
/// impl Service for Clock {}
///
/// struct Scheduler {
///     clock: Arc<Clock>,
///     workers: u32,
/// }
///
/// impl Service for Scheduler {}
///
/// impl Component for Scheduler {
///     type Error = Infallible;
///
///     fn parameters() -> Option<Vec<Parameter>> {
///         Some(vec![
///             Parameter::of::<Arc<Clock>>("clock", 0),
///             Parameter::of::<u32>("workers", 1).with_default(4u32),
///         ])
///     }
///
///     fn construct(mut arguments: Arguments) -> Result<Result<Self, Self::Error>, ArgumentError> {
///         let clock = arguments.take(0)?;
///         let workers = arguments.take(1)?;
///         Ok(Ok(Self { clock, workers }))
///     }
/// }
/// ```
///
/// Registering the component in a [`Module`] makes it known to the
/// container, which then describes it through [`describe`].
///
/// [`component`]: crate::component
/// [`Module`]: crate::module::Module
pub trait Component: Service + Sized {
    /// The error occurred in object construction after all dependencies are
    /// resolved.
    type Error: Into<Box<dyn Error + Send + Sync>>;

    /// The parameters of the user-defined constructor, in declaration order.
    /// `None` means there is no such constructor and the component is built
    /// without arguments.
    fn parameters() -> Option<Vec<Parameter>>;

    /// Builds the object from the resolved arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument can't be taken from `arguments`.
    ///
    /// Returns an inner error [`Component::Error`] wrapped in the outer [`Ok`]
    /// if the object construction fails.
    fn construct(arguments: Arguments) -> Result<Result<Self, Self::Error>, ArgumentError>;
}

/// Produces the [`TypeDescriptor`] of a [`Component`].
pub fn describe<C>() -> TypeDescriptor
where
    C: Component,
{
    let factory = |arguments: Arguments| -> Result<Instance, Box<dyn Error + Send + Sync>> {
        match C::construct(arguments) {
            Ok(Ok(object)) => Ok(Instance::new(Arc::new(object))),
            Ok(Err(err)) => Err(err.into()),
            Err(err) => Err(Box::new(err)),
        }
    };

    let constructor = match C::parameters() {
        Some(parameters) => Constructor::declared(parameters, factory),
        None => Constructor::implicit(factory),
    };

    TypeDescriptor::service(Identifier::of::<C>(), C::ancestors(), constructor)
}
