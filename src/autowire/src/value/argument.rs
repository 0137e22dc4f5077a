use std::any;
use std::sync::Arc;

use snafu::prelude::*;

use crate::identifier::Identifier;
use crate::value::Value;

/// A type that can appear as a parameter of an injectable constructor.
///
/// The associated items describe the parameter to the container (what it is
/// declared as, whether it is a primitive and what it defaults to), while
/// [`Argument::from_value`] converts the resolved [`Value`] back into the
/// parameter type.
///
/// Shared services are injected as `Arc<T>`, where `T` may be a concrete
/// service or a capability such as `dyn Logger`. Wrapping a parameter in an
/// [`Option`] makes it optional with a `None` default.
pub trait Argument: Sized + 'static {
    /// Whether the parameter is a builtin value that can't be autowired.
    const PRIMITIVE: bool;

    /// The identifier the parameter is declared as.
    fn declared_type() -> Option<Identifier>;

    /// The default value of an optional parameter, `None` if required.
    fn default_value() -> Option<Value> {
        None
    }

    /// Converts the value back, handing it back on mismatch.
    fn from_value(value: Value) -> Result<Self, Value>;
}

impl<T> Argument for Arc<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    const PRIMITIVE: bool = false;

    fn declared_type() -> Option<Identifier> {
        Some(Identifier::of::<T>())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value.as_object().and_then(|object| object.get::<Self>()) {
            Some(object) => Ok(object),
            None => Err(value),
        }
    }
}

impl<A> Argument for Option<A>
where
    A: Argument,
{
    const PRIMITIVE: bool = A::PRIMITIVE;

    fn declared_type() -> Option<Identifier> {
        A::declared_type()
    }

    fn default_value() -> Option<Value> {
        Some(Value::Null)
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        if value.is_null() {
            Ok(None)
        } else {
            A::from_value(value).map(Some)
        }
    }
}

impl Argument for bool {
    const PRIMITIVE: bool = true;

    fn declared_type() -> Option<Identifier> {
        Some(Identifier::of::<Self>())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl Argument for String {
    const PRIMITIVE: bool = true;

    fn declared_type() -> Option<Identifier> {
        Some(Identifier::of::<Self>())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Str(v) => Ok(String::from(&*v)),
            other => Err(other),
        }
    }
}

macro_rules! impl_argument_for_integers {
    ($($int:ty),*) => {
        $(
            impl Argument for $int {
                const PRIMITIVE: bool = true;

                fn declared_type() -> Option<Identifier> {
                    Some(Identifier::of::<Self>())
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::Int(v) => <$int>::try_from(v).map_err(|_| Value::Int(v)),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_argument_for_integers!(i8, i16, i32, i64, u8, u16, u32);

impl Argument for f64 {
    const PRIMITIVE: bool = true;

    fn declared_type() -> Option<Identifier> {
        Some(Identifier::of::<Self>())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(v) => Ok(v),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(v) => Ok(v as f64),
            other => Err(other),
        }
    }
}

/// The ordered argument list passed to a constructor.
#[derive(Debug, Default)]
pub struct Arguments {
    values: Vec<Option<Value>>,
}

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Moves the argument at `position` out of the list and converts it.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no argument at `position`, it was taken
    /// already, or it can't be converted into `A`.
    pub fn take<A>(&mut self, position: usize) -> Result<A, ArgumentError>
    where
        A: Argument,
    {
        let value = self
            .values
            .get_mut(position)
            .and_then(Option::take)
            .context(MissingSnafu { position })?;

        A::from_value(value).map_err(|value| ArgumentError::Mismatch {
            position,
            expected: any::type_name::<A>(),
            found: value.kind(),
        })
    }
}

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum ArgumentError {
    #[snafu(display("no argument is supplied at position {position}"))]
    #[non_exhaustive]
    Missing { position: usize },
    #[snafu(display("argument at position {position} is a {found}, but {expected} is expected"))]
    #[non_exhaustive]
    Mismatch {
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
}
