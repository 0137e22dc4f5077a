use std::any::{self, Any};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, Weak};

use snafu::prelude::*;
use tracing::debug;

use crate::catalog::{CatalogError, ConfigurerImpl};
use crate::container::core::ContainerCore;
use crate::container::error::{ResolveError, ViewUnavailableSnafu};
use crate::container::registry::RegistryError;
use crate::descriptor::Introspector;
use crate::identifier::{Identifier, Identify};
use crate::instance::{Instance, Overrides, Service, View};
use crate::module::Module;
use crate::value::{Argument, Value};

/// A handle to a service container.
///
/// Cloning a [`Container`] is cheap, and all clones share the same registry.
/// The container registers itself on construction, so services may depend
/// on it like on any other service.
#[derive(Clone)]
pub struct Container {
    core: Arc<ContainerCore>,
}

impl Container {
    /// Builds a container whose types are described by the [`TypeCatalog`]
    /// configured by `module`. Aliases declared by the module replace any
    /// existing ones.
    ///
    /// # Errors
    ///
    /// Returns the catalog errors reported while setting up `module`.
    ///
    /// [`TypeCatalog`]: crate::catalog::TypeCatalog
    pub fn init<M>(module: M) -> Result<Self, CatalogError>
    where
        M: Module,
    {
        let mut configurer = ConfigurerImpl::new();
        module.setup(&mut configurer);
        let catalog = configurer.finish().map_err(CatalogError::aggregate)?;

        let aliases: Vec<_> = catalog
            .aliases()
            .map(|(alias, target)| (alias.clone(), target.clone()))
            .collect();
        debug!(types = catalog.len(), aliases = aliases.len(), "type catalog built");

        let container = Self::new(catalog);
        for (alias, target) in aliases {
            container.register_alias(target, alias, true);
        }
        Ok(container)
    }

    pub fn new<I>(introspector: I) -> Self
    where
        I: Introspector,
    {
        let core = Arc::new(ContainerCore::new(Box::new(introspector)));
        core.registry().insert(Self::self_instance(&core));
        Self { core }
    }

    /// The registry entry of the container itself. It only keeps a weak
    /// reference, otherwise the core would own itself.
    fn self_instance(core: &Arc<ContainerCore>) -> Instance {
        let views = vec![
            View::new::<Weak<ContainerCore>, Container>(|core| {
                core.upgrade().map(|core| Container { core })
            }),
            View::new::<Weak<ContainerCore>, ContainerRef>(|core| {
                Some(ContainerRef {
                    core: Weak::clone(core),
                })
            }),
        ];
        Instance::from_parts(
            Identifier::of::<Container>(),
            Vec::new(),
            Box::new(Arc::downgrade(core)),
            views,
        )
    }

    /// Returns a handle that doesn't keep the container alive.
    pub fn downgrade(&self) -> ContainerRef {
        ContainerRef {
            core: Arc::downgrade(&self.core),
        }
    }

    /// Caches an externally constructed object, replacing any object cached
    /// under the same identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotAnObject`] if `value` isn't an object.
    pub fn register_instance(&self, value: impl Into<Value>) -> Result<(), RegistryError> {
        self.core.registry().add_service(value)
    }

    /// Routes `alias` to `id`, overwriting an existing alias only if
    /// `replace` is set. Returns whether the alias was written.
    pub fn register_alias(
        &self,
        id: impl Into<Identifier>,
        alias: impl Into<Identifier>,
        replace: bool,
    ) -> bool {
        self.core
            .registry()
            .add_alias(&id.into(), &alias.into(), replace)
    }

    pub fn has_alias(&self, id: impl Into<Identifier>) -> bool {
        self.core.registry().has_alias(&id.into())
    }

    pub fn get_alias(&self, id: impl Into<Identifier>) -> Option<Identifier> {
        self.core.registry().get_alias(&id.into())
    }

    /// Returns the shared object of `id`, constructing and caching it first
    /// if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the object or any of its dependencies can't be
    /// constructed.
    pub fn resolve(&self, id: impl Into<Identifier>) -> Result<Instance, ResolveError> {
        self.resolve_with(id, &Overrides::new())
    }

    /// Like [`Container::resolve`], but a newly constructed object takes its
    /// constructor arguments from `overrides` where possible. Overrides have
    /// no effect if the object is cached already.
    pub fn resolve_with(
        &self,
        id: impl Into<Identifier>,
        overrides: &Overrides,
    ) -> Result<Instance, ResolveError> {
        self.core.resolve(&id.into(), overrides)
    }

    /// Resolves `id` and takes the view `V` of the object.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ViewUnavailable`] if the object offers no view
    /// of type `V`, or any error of [`Container::resolve`].
    pub fn resolve_as<V>(&self, id: impl Into<Identifier>) -> Result<V, ResolveError>
    where
        V: Any,
    {
        let object = self.resolve(id)?;
        object.get::<V>().context(ViewUnavailableSnafu {
            id: object.id().clone(),
            view: any::type_name::<V>(),
        })
    }

    /// Resolves the shared object of type `T`, which may be a concrete
    /// service or a capability such as `dyn Logger`.
    pub fn get<T>(&self) -> Result<Arc<T>, ResolveError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve_as::<Arc<T>>(Identifier::of::<T>())
    }

    /// Constructs a new object of `id` that is neither cached nor shared.
    /// Its dependencies are resolved as usual.
    pub fn instantiate(
        &self,
        id: impl Into<Identifier>,
        overrides: &Overrides,
    ) -> Result<Instance, ResolveError> {
        self.core.instantiate(&id.into(), overrides)
    }

    /// Whether an object is cached for `target`, which may be an identifier,
    /// an alias, or an object naming itself.
    pub fn has_instance(&self, target: &(impl Identify + ?Sized)) -> bool {
        self.core.registry().has_service_instance(target)
    }

    /// Returns true if both handles refer to the same container.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Container").finish_non_exhaustive()
    }
}

impl Identify for Container {
    fn identifier(&self) -> Identifier {
        Identifier::of::<Container>()
    }
}

impl Service for Container {}

/// A weak handle to a container, which is how services depend on the
/// container that constructs them.
///
/// Services are cached by the container, so a service holding a [`Container`]
/// would keep the container and all of its services alive forever.
#[derive(Clone)]
pub struct ContainerRef {
    core: Weak<ContainerCore>,
}

impl ContainerRef {
    /// Returns the container, or `None` if all of its handles were dropped.
    pub fn upgrade(&self) -> Option<Container> {
        self.core.upgrade().map(|core| Container { core })
    }
}

impl Debug for ContainerRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ContainerRef").finish_non_exhaustive()
    }
}

impl Argument for ContainerRef {
    const PRIMITIVE: bool = false;

    fn declared_type() -> Option<Identifier> {
        Some(Identifier::of::<Container>())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value.as_object().and_then(|object| object.get::<Self>()) {
            Some(container) => Ok(container),
            None => Err(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    use crate::catalog::{Configurer, TypedConfigurer};
    use crate::component::{self, Component};
    use crate::container::error::ParameterProblem;
    use crate::descriptor::{MockIntrospector, Parameter, TypeDescriptor};
    use crate::value::{ArgumentError, Arguments};

    use super::*;

    fn introspector(descriptors: Vec<TypeDescriptor>) -> MockIntrospector {
        let descriptors: HashMap<Identifier, TypeDescriptor> = descriptors
            .into_iter()
            .map(|descriptor| (descriptor.id().clone(), descriptor))
            .collect();
        let mut introspector = MockIntrospector::new();
        introspector
            .expect_describe()
            .returning(move |id| descriptors.get(id).cloned());
        introspector
    }

    trait Repository: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct Dependency;

    impl Repository for Dependency {
        fn name(&self) -> &'static str {
            "dependency"
        }
    }

    impl Service for Dependency {
        fn ancestors() -> Vec<Identifier> {
            vec![Identifier::of::<dyn Repository>()]
        }

        fn views() -> Vec<View> {
            vec![View::new::<Arc<Self>, Arc<dyn Repository>>(|this| {
                Some(Arc::clone(this) as Arc<dyn Repository>)
            })]
        }
    }

    impl Component for Dependency {
        type Error = Infallible;

        fn parameters() -> Option<Vec<Parameter>> {
            None
        }

        fn construct(_arguments: Arguments) -> Result<Result<Self, Self::Error>, ArgumentError> {
            Ok(Ok(Self))
        }
    }

    struct Consumer {
        dependency: Arc<Dependency>,
    }

    impl Service for Consumer {}

    impl Component for Consumer {
        type Error = Infallible;

        fn parameters() -> Option<Vec<Parameter>> {
            Some(vec![Parameter::of::<Arc<Dependency>>("dependency", 0)])
        }

        fn construct(mut arguments: Arguments) -> Result<Result<Self, Self::Error>, ArgumentError> {
            Ok(Ok(Self {
                dependency: arguments.take(0)?,
            }))
        }
    }

    struct Settings {
        retries: u32,
    }

    impl Service for Settings {}

    impl Component for Settings {
        type Error = Infallible;

        fn parameters() -> Option<Vec<Parameter>> {
            Some(vec![Parameter::of::<u32>("retries", 0)])
        }

        fn construct(mut arguments: Arguments) -> Result<Result<Self, Self::Error>, ArgumentError> {
            Ok(Ok(Self {
                retries: arguments.take(0)?,
            }))
        }
    }

    struct Tuned {
        retries: u32,
        repository: Option<Arc<dyn Repository>>,
    }

    impl Service for Tuned {}

    impl Component for Tuned {
        type Error = Infallible;

        fn parameters() -> Option<Vec<Parameter>> {
            Some(vec![
                Parameter::of::<u32>("retries", 0).with_default(3u32),
                Parameter::of::<Option<Arc<dyn Repository>>>("repository", 1),
            ])
        }

        fn construct(mut arguments: Arguments) -> Result<Result<Self, Self::Error>, ArgumentError> {
            Ok(Ok(Self {
                retries: arguments.take(0)?,
                repository: arguments.take(1)?,
            }))
        }
    }

    struct Left {
        _right: Arc<Right>,
    }

    impl Service for Left {}

    impl Component for Left {
        type Error = Infallible;

        fn parameters() -> Option<Vec<Parameter>> {
            Some(vec![Parameter::of::<Arc<Right>>("right", 0)])
        }

        fn construct(mut arguments: Arguments) -> Result<Result<Self, Self::Error>, ArgumentError> {
            Ok(Ok(Self {
                _right: arguments.take(0)?,
            }))
        }
    }

    struct Right {
        _left: Arc<Left>,
    }

    impl Service for Right {}

    impl Component for Right {
        type Error = Infallible;

        fn parameters() -> Option<Vec<Parameter>> {
            Some(vec![Parameter::of::<Arc<Left>>("left", 0)])
        }

        fn construct(mut arguments: Arguments) -> Result<Result<Self, Self::Error>, ArgumentError> {
            Ok(Ok(Self {
                _left: arguments.take(0)?,
            }))
        }
    }

    struct Faulty;

    impl Service for Faulty {}

    impl Component for Faulty {
        type Error = &'static str;

        fn parameters() -> Option<Vec<Parameter>> {
            None
        }

        fn construct(_arguments: Arguments) -> Result<Result<Self, Self::Error>, ArgumentError> {
            Ok(Err("connection refused"))
        }
    }

    struct Locator {
        container: ContainerRef,
    }

    impl Service for Locator {}

    impl Component for Locator {
        type Error = Infallible;

        fn parameters() -> Option<Vec<Parameter>> {
            Some(vec![Parameter::of::<ContainerRef>("container", 0)])
        }

        fn construct(mut arguments: Arguments) -> Result<Result<Self, Self::Error>, ArgumentError> {
            Ok(Ok(Self {
                container: arguments.take(0)?,
            }))
        }
    }

    fn container() -> Container {
        Container::new(introspector(vec![
            component::describe::<Dependency>(),
            component::describe::<Consumer>(),
            component::describe::<Settings>(),
            component::describe::<Tuned>(),
            component::describe::<Left>(),
            component::describe::<Right>(),
            component::describe::<Faulty>(),
            component::describe::<Locator>(),
            TypeDescriptor::interface(Identifier::from("IMissing")),
            TypeDescriptor::plain(Identifier::of::<String>()),
        ]))
    }

    #[test]
    fn container_new_registers_itself() {
        let container = container();

        assert!(container.has_instance(&container));
        assert!(container.has_instance(&Identifier::of::<Container>()));

        let resolved: Container = container
            .resolve_as(Identifier::of::<Container>())
            .unwrap();
        assert!(resolved.ptr_eq(&container));

        let locator = container.get::<Locator>().unwrap();
        assert!(locator.container.upgrade().unwrap().ptr_eq(&container));
    }

    #[test]
    fn container_drops_services_when_handles_are_dropped() {
        let container = container();
        let locator = container.get::<Locator>().unwrap();
        let dependency = Arc::downgrade(&container.get::<Dependency>().unwrap());
        let weak = container.downgrade();
        assert!(dependency.upgrade().is_some());

        drop(container);
        assert!(weak.upgrade().is_none());
        assert!(locator.container.upgrade().is_none());
        assert!(dependency.upgrade().is_none());
    }

    #[test]
    fn container_init_routes_aliases_declared_before_bindings() {
        struct Wiring;

        impl Module for Wiring {
            fn configure(
                &self,
                configurer: &mut dyn Configurer,
            ) -> Result<(), Box<dyn Error + Send + Sync>> {
                configurer.alias::<dyn Repository>("repository");
                configurer.bind::<dyn Repository, Dependency>();
                Ok(())
            }
        }

        let container = Container::init(Wiring).unwrap();

        assert_eq!(
            container.get_alias("repository"),
            Some(Identifier::of::<Dependency>())
        );
        let repository = container
            .resolve_as::<Arc<dyn Repository>>("repository")
            .unwrap();
        assert_eq!(repository.name(), "dependency");
    }

    #[test]
    fn container_resolve_returns_singleton() {
        let container = container();

        let first = container.resolve(Identifier::of::<Dependency>()).unwrap();
        let second = container.resolve(Identifier::of::<Dependency>()).unwrap();
        assert!(first.ptr_eq(&second));
        assert!(container.has_instance(&Identifier::of::<Dependency>()));
    }

    #[test]
    fn container_resolve_succeeds_with_recursive_dependency() {
        let container = container();

        let consumer = container.get::<Consumer>().unwrap();
        let dependency = container.get::<Dependency>().unwrap();
        assert!(Arc::ptr_eq(&consumer.dependency, &dependency));
    }

    #[test]
    fn container_resolve_registers_ancestor_aliases() {
        let container = container();

        assert!(!container.has_alias(Identifier::of::<dyn Repository>()));
        let dependency = container.resolve(Identifier::of::<Dependency>()).unwrap();
        assert_eq!(
            container.get_alias(Identifier::of::<dyn Repository>()),
            Some(Identifier::of::<Dependency>())
        );

        let repository = container.get::<dyn Repository>().unwrap();
        assert_eq!(repository.name(), "dependency");
        assert!(container
            .resolve(Identifier::of::<dyn Repository>())
            .unwrap()
            .ptr_eq(&dependency));
    }

    #[test]
    fn container_register_alias_routes_resolution() {
        let container = container();

        assert!(container.register_alias(Identifier::of::<Dependency>(), "IFoo", true));
        let aliased = container.resolve("IFoo").unwrap();
        let concrete = container.resolve(Identifier::of::<Dependency>()).unwrap();
        assert!(aliased.ptr_eq(&concrete));
    }

    #[test]
    fn container_register_alias_keeps_existing_alias_when_not_replacing() {
        let container = container();

        assert!(container.register_alias("B", "A", false));
        assert!(!container.register_alias("C", "A", false));
        assert_eq!(container.get_alias("A"), Some(Identifier::from("B")));

        assert!(container.register_alias("C", "A", true));
        assert_eq!(container.get_alias("A"), Some(Identifier::from("C")));
    }

    #[test]
    fn container_resolve_fails_when_parameter_is_primitive() {
        let container = container();

        let err = container
            .resolve(Identifier::of::<Settings>())
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ParameterResolution {
                position: 0,
                problem: ParameterProblem::Primitive { .. },
                ..
            }
        ));
        assert!(!container.has_instance(&Identifier::of::<Settings>()));
    }

    #[test]
    fn container_resolve_fails_when_parameter_is_untyped() {
        let descriptor = TypeDescriptor::service(
            Identifier::from("Untyped"),
            Vec::new(),
            crate::descriptor::Constructor::declared(
                vec![Parameter::new("anything", 0, None)],
                |_| unreachable!("the constructor should never be called"),
            ),
        );
        let container = Container::new(introspector(vec![descriptor]));

        let err = container.resolve("Untyped").unwrap_err();
        assert!(matches!(
            err,
            ResolveError::ParameterResolution {
                problem: ParameterProblem::Untyped,
                ..
            }
        ));
    }

    #[test]
    fn container_resolve_fails_on_circular_dependency() {
        let container = container();

        let err = container.resolve(Identifier::of::<Left>()).unwrap_err();
        let ResolveError::CircularDependency { id, path } = err.root_cause() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(id, &Identifier::of::<Left>());
        assert_eq!(
            path,
            &vec![
                Identifier::of::<Left>(),
                Identifier::of::<Right>(),
                Identifier::of::<Left>(),
            ]
        );
        assert!(!container.has_instance(&Identifier::of::<Left>()));
        assert!(!container.has_instance(&Identifier::of::<Right>()));
    }

    #[test]
    fn container_resolve_with_prefers_overrides() {
        let container = container();
        let custom = Instance::new(Arc::new(Dependency));

        let consumer = container
            .resolve_with(
                Identifier::of::<Consumer>(),
                &Overrides::new().with(custom.clone()),
            )
            .unwrap()
            .get::<Arc<Consumer>>()
            .unwrap();

        assert!(Arc::ptr_eq(
            &consumer.dependency,
            &custom.get::<Arc<Dependency>>().unwrap()
        ));
        assert!(!container.has_instance(&Identifier::of::<Dependency>()));
    }

    #[test]
    fn container_resolve_fails_when_type_is_unknown() {
        let container = container();

        assert!(matches!(
            container.resolve("Nowhere"),
            Err(ResolveError::TypeNotFound { id }) if id.as_str() == "Nowhere"
        ));
        assert!(matches!(
            container.resolve("IMissing"),
            Err(ResolveError::InterfaceWithoutAlias { .. })
        ));
        assert!(matches!(
            container.resolve(Identifier::of::<String>()),
            Err(ResolveError::NotAService { .. })
        ));
    }

    #[test]
    fn container_resolve_fails_when_construction_fails() {
        let container = container();

        let err = container.resolve(Identifier::of::<Faulty>()).unwrap_err();
        let ResolveError::Construction { id, source } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(id, &Identifier::of::<Faulty>());
        assert_eq!(source.to_string(), "connection refused");
    }

    #[test]
    fn container_resolve_uses_defaults_of_optional_parameters() {
        let container = container();

        let tuned = container.instantiate(Identifier::of::<Tuned>(), &Overrides::new());
        let tuned = tuned.unwrap().get::<Arc<Tuned>>().unwrap();
        assert_eq!(tuned.retries, 3);
        assert!(tuned.repository.is_none());

        container.resolve(Identifier::of::<Dependency>()).unwrap();
        let tuned = container.get::<Tuned>().unwrap();
        assert_eq!(tuned.repository.as_ref().unwrap().name(), "dependency");
    }

    #[test]
    fn container_instantiate_does_not_cache() {
        let container = container();

        let first = container
            .instantiate(Identifier::of::<Consumer>(), &Overrides::new())
            .unwrap();
        let second = container
            .instantiate(Identifier::of::<Consumer>(), &Overrides::new())
            .unwrap();

        assert!(!first.ptr_eq(&second));
        assert!(!container.has_instance(&Identifier::of::<Consumer>()));
        assert!(container.has_instance(&Identifier::of::<Dependency>()));
    }

    #[test]
    fn container_register_instance_succeeds() {
        let container = container();
        let dependency = Arc::new(Dependency);
        container.register_instance(Arc::clone(&dependency)).unwrap();

        assert!(Arc::ptr_eq(
            &container.get::<Dependency>().unwrap(),
            &dependency
        ));
        assert!(matches!(
            container.register_instance("text"),
            Err(RegistryError::NotAnObject { kind: "string" })
        ));
    }

    #[test]
    fn container_resolve_as_fails_when_view_is_unavailable() {
        let container = container();

        assert!(matches!(
            container.resolve_as::<Arc<Consumer>>(Identifier::of::<Dependency>()),
            Err(ResolveError::ViewUnavailable { .. })
        ));
    }

    #[test]
    fn container_resolve_constructs_once_across_threads() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let descriptor = TypeDescriptor::service(
            Identifier::of::<Dependency>(),
            Vec::new(),
            crate::descriptor::Constructor::implicit({
                let constructed = Arc::clone(&constructed);
                move |_| {
                    constructed.fetch_add(1, Ordering::SeqCst);
                    thread::sleep(std::time::Duration::from_millis(20));
                    Ok(Instance::new(Arc::new(Dependency)))
                }
            }),
        );
        let container = Container::new(introspector(vec![descriptor]));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    container.resolve(Identifier::of::<Dependency>()).unwrap()
                })
            })
            .collect();

        let instances: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        assert_eq!(constructed.load(Ordering::SeqCst), 1);
        assert!(instances.iter().all(|instance| instance.ptr_eq(&instances[0])));
    }
}
