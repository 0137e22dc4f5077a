use std::any;
use std::borrow::Borrow;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;

/// The authoritative name of a type known to a container.
///
/// Identifiers of Rust types are derived from their fully qualified type
/// names, so `Identifier::of::<dyn Logger>()` names the `Logger` capability
/// and `Identifier::of::<ConsoleLogger>()` names the concrete service.
/// Free-form identifiers such as `"logger"` can be created from strings and
/// are typically used as aliases.
///
/// # Examples
///
/// ```rust
/// # use autowire::identifier::Identifier;
/// let a = Identifier::of::<String>();
/// let b = Identifier::from("alloc::string::String");
/// assert_eq!(a, b);
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier {
    name: Arc<str>,
}

impl Identifier {
    /// Returns the canonical identifier of `T`.
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self::from(any::type_name::<T>())
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl Debug for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&*self.name, f)
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.name)
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self {
            name: Arc::from(name),
        }
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self {
            name: Arc::from(name),
        }
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// Anything that names a slot in the container's registry, either directly
/// or through the runtime identifier of an object.
pub trait Identify {
    fn identifier(&self) -> Identifier;
}

impl Identify for Identifier {
    fn identifier(&self) -> Identifier {
        self.clone()
    }
}

impl Identify for str {
    fn identifier(&self) -> Identifier {
        Identifier::from(self)
    }
}

impl Identify for String {
    fn identifier(&self) -> Identifier {
        Identifier::from(self.as_str())
    }
}

impl<T: Identify + ?Sized> Identify for &T {
    fn identifier(&self) -> Identifier {
        (**self).identifier()
    }
}
