mod argument;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::instance::{Instance, Service};

pub use argument::{Argument, ArgumentError, Arguments};

/// A dynamically typed value flowing through the container.
///
/// Constructor arguments, default values of optional parameters and values
/// handed to [`Container::register_instance`] are all [`Value`]s. Only
/// [`Value::Object`] is a constructed service; every other variant is a
/// primitive.
///
/// [`Container::register_instance`]: crate::container::Container::register_instance
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Object(Instance),
}

impl Value {
    /// Returns a short name of the variant for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_object(&self) -> Option<&Instance> {
        if let Self::Object(instance) = self {
            Some(instance)
        } else {
            None
        }
    }

    pub fn into_object(self) -> Option<Instance> {
        if let Self::Object(instance) = self {
            Some(instance)
        } else {
            None
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Object(v) => f.debug_tuple("Object").field(v).finish(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Self::Object(instance)
    }
}

impl<T: Service> From<Arc<T>> for Value {
    fn from(object: Arc<T>) -> Self {
        Self::Object(Instance::new(object))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! impl_from_integer_for_value {
    ($($int:ty),*) => {
        $(
            impl From<$int> for Value {
                fn from(value: $int) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_integer_for_value!(i8, i16, i32, i64, u8, u16, u32);
