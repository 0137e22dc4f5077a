use std::borrow::Cow;

use crate::identifier::Identifier;
use crate::value::{Argument, Value};

/// One formal parameter of a constructor.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: Cow<'static, str>,
    position: usize,
    declared: Option<Identifier>,
    primitive: bool,
    default: Option<Value>,
}

impl Parameter {
    /// Creates a required parameter declared as `declared`, or untyped if
    /// `declared` is `None`.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        position: usize,
        declared: Option<Identifier>,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            declared,
            primitive: false,
            default: None,
        }
    }

    /// Derives the parameter from the Rust type it is declared as.
    pub fn of<A>(name: impl Into<Cow<'static, str>>, position: usize) -> Self
    where
        A: Argument,
    {
        Self {
            name: name.into(),
            position,
            declared: A::declared_type(),
            primitive: A::PRIMITIVE,
            default: A::default_value(),
        }
    }

    pub fn primitive(mut self, primitive: bool) -> Self {
        self.primitive = primitive;
        self
    }

    /// Makes the parameter optional with `default` as its fallback.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn declared(&self) -> Option<&Identifier> {
        self.declared.as_ref()
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}
