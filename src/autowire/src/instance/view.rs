use std::any::{self, Any, TypeId};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

type Cast = dyn Fn(&(dyn Any + Send + Sync)) -> Option<Box<dyn Any>> + Send + Sync;

/// A typed handle that can be derived from a stored object.
///
/// Rust has no runtime upcasting, so an [`Instance`] keeps a table of views
/// through which it can be handed out, e.g. `Arc<ConsoleLogger>` and
/// `Arc<dyn Logger>` for the same object.
///
/// [`Instance`]: crate::instance::Instance
pub struct View {
    target: TypeId,
    target_name: &'static str,
    cast: Box<Cast>,
}

impl View {
    /// Creates a view producing `V` from a stored object of type `O`.
    pub fn new<O, V>(cast: fn(&O) -> Option<V>) -> Self
    where
        O: Any + Send + Sync,
        V: Any,
    {
        Self {
            target: TypeId::of::<V>(),
            target_name: any::type_name::<V>(),
            cast: Box::new(move |object| {
                object
                    .downcast_ref::<O>()
                    .and_then(cast)
                    .map(|view| -> Box<dyn Any> { Box::new(view) })
            }),
        }
    }

    /// The view of an `Arc<T>` as itself.
    pub fn identity<T>() -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::new::<Arc<T>, Arc<T>>(|object| Some(Arc::clone(object)))
    }

    pub fn target(&self) -> TypeId {
        self.target
    }

    pub fn target_name(&self) -> &'static str {
        self.target_name
    }

    pub(crate) fn apply(&self, object: &(dyn Any + Send + Sync)) -> Option<Box<dyn Any>> {
        (self.cast)(object)
    }
}

impl Debug for View {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("View")
            .field("target", &self.target_name)
            .finish_non_exhaustive()
    }
}
