mod overrides;
mod view;

use std::any::{Any, TypeId};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::identifier::{Identifier, Identify};

pub use overrides::Overrides;
pub use view::View;

/// The marker capability of everything a container manages.
///
/// Besides marking a type as a service, the trait declares the capabilities
/// the type implements, which become aliases of the service once it's
/// registered, and the views through which it can be retrieved.
///
/// Usually the [`component`] macro implements [`Service`] together with
/// [`Component`]:
///
/// ```rust
/// # use std::sync::Arc;
/// # use autowire::prelude::*;
/// trait Logger: Send + Sync {
///     fn log(&self, message: &str);
/// }
///
/// #[derive(Default)]
/// struct ConsoleLogger;
///
/// impl Logger for ConsoleLogger {
///     fn log(&self, message: &str) {
///         eprintln!("{message}");
///     }
/// }
///
/// #[component(implements(dyn Logger))]
/// impl ConsoleLogger {}
///
/// let instance = Instance::new(Arc::new(ConsoleLogger));
/// assert!(instance.ancestors().contains(&Identifier::of::<dyn Logger>()));
/// assert!(instance.get::<Arc<dyn Logger>>().is_some());
/// ```
///
/// [`component`]: crate::component
/// [`Component`]: crate::component::Component
pub trait Service: Send + Sync + 'static {
    /// Identifiers of the capabilities implemented by the service.
    fn ancestors() -> Vec<Identifier>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Additional views of an `Arc<Self>`, besides `Arc<Self>` itself.
    fn views() -> Vec<View>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

/// A shared handle to a constructed service.
///
/// Cloning an [`Instance`] is cheap and yields a handle to the same object.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

struct InstanceInner {
    id: Identifier,
    ancestors: Vec<Identifier>,
    object: Box<dyn Any + Send + Sync>,
    views: Vec<View>,
}

impl Instance {
    pub fn new<T>(object: Arc<T>) -> Self
    where
        T: Service,
    {
        let mut views = vec![View::identity::<T>()];
        views.extend(T::views());
        Self::from_parts(Identifier::of::<T>(), T::ancestors(), Box::new(object), views)
    }

    /// Assembles an instance from an already type-erased object. The service
    /// marker is always added to `ancestors`.
    pub fn from_parts(
        id: Identifier,
        mut ancestors: Vec<Identifier>,
        object: Box<dyn Any + Send + Sync>,
        views: Vec<View>,
    ) -> Self {
        let marker = Identifier::of::<dyn Service>();
        if !ancestors.contains(&marker) {
            ancestors.push(marker);
        }

        Self {
            inner: Arc::new(InstanceInner {
                id,
                ancestors,
                object,
                views,
            }),
        }
    }

    /// The canonical identifier the object was constructed as.
    pub fn id(&self) -> &Identifier {
        &self.inner.id
    }

    pub fn ancestors(&self) -> &[Identifier] {
        &self.inner.ancestors
    }

    /// Returns the view `V` of the object, if the object offers one.
    pub fn get<V>(&self) -> Option<V>
    where
        V: Any,
    {
        self.inner
            .views
            .iter()
            .find(|view| view.target() == TypeId::of::<V>())
            .and_then(|view| view.apply(self.inner.object.as_ref()))
            .and_then(|view| view.downcast::<V>().ok())
            .map(|view| *view)
    }

    pub fn has_view<V>(&self) -> bool
    where
        V: Any,
    {
        self.inner
            .views
            .iter()
            .any(|view| view.target() == TypeId::of::<V>())
    }

    /// Returns true if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Instance")
            .field("id", &self.inner.id)
            .field("ancestors", &self.inner.ancestors)
            .field("views", &self.inner.views)
            .finish_non_exhaustive()
    }
}

impl Identify for Instance {
    fn identifier(&self) -> Identifier {
        self.inner.id.clone()
    }
}
