mod configurer;

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use snafu::prelude::*;

use crate::component::{self, Component};
use crate::descriptor::{Introspector, TypeDescriptor};
use crate::identifier::Identifier;
use crate::instance::Service;

pub(crate) use configurer::ConfigurerImpl;

/// The default [`Introspector`], describing the types registered by modules.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    entries: HashMap<Identifier, CatalogEntry>,
    aliases: Vec<(Identifier, Identifier)>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aliases declared by modules, as `(alias, target)` pairs in declaration
    /// order.
    pub fn aliases(&self) -> impl Iterator<Item = (&Identifier, &Identifier)> {
        self.aliases.iter().map(|(alias, target)| (alias, target))
    }

    fn entry(&self, id: &Identifier) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }
}

impl Introspector for TypeCatalog {
    fn describe(&self, id: &Identifier) -> Option<TypeDescriptor> {
        self.entry(id).map(|entry| match entry {
            CatalogEntry::Component(describe) => describe(),
            CatalogEntry::Interface => TypeDescriptor::interface(id.clone()),
            CatalogEntry::Plain => TypeDescriptor::plain(id.clone()),
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum CatalogEntry {
    Component(fn() -> TypeDescriptor),
    Interface,
    Plain,
}

impl CatalogEntry {
    fn to_str(self) -> &'static str {
        match self {
            Self::Component(_) => "a component",
            Self::Interface => "an interface",
            Self::Plain => "a plain type",
        }
    }

    fn is_same_declaration(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Interface, Self::Interface) | (Self::Plain, Self::Plain)
        )
    }
}

pub trait Configurer: Send + Sync + 'static {
    #[doc(hidden)]
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate;

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>);
}

trait ConfigurerPrivate: Configurer {
    fn dyn_register(&mut self, id: Identifier, entry: CatalogEntry);

    fn dyn_alias(&mut self, alias: Identifier, target: Identifier);
}

pub trait TypedConfigurer: Configurer {
    /// Makes the component constructible. Every capability it declares is
    /// registered as an interface as well.
    fn component<C>(&mut self)
    where
        C: Component,
    {
        let private = self.as_private();
        for ancestor in C::ancestors() {
            private.dyn_register(ancestor, CatalogEntry::Interface);
        }
        private.dyn_register(
            Identifier::of::<C>(),
            CatalogEntry::Component(component::describe::<C>),
        );
    }

    fn interface<T>(&mut self)
    where
        T: ?Sized + 'static,
    {
        self.as_private()
            .dyn_register(Identifier::of::<T>(), CatalogEntry::Interface);
    }

    /// Declares a type that is known but doesn't satisfy the [`Service`]
    /// marker.
    fn plain<T>(&mut self)
    where
        T: ?Sized + 'static,
    {
        self.as_private()
            .dyn_register(Identifier::of::<T>(), CatalogEntry::Plain);
    }

    /// Routes `alias` to `T` once the container is built, replacing any alias
    /// registered by services.
    fn alias<T>(&mut self, alias: impl Into<Identifier>)
    where
        T: ?Sized + 'static,
    {
        self.as_private()
            .dyn_alias(alias.into(), Identifier::of::<T>());
    }

    /// Registers component `C` as the implementation of capability `I`.
    fn bind<I, C>(&mut self)
    where
        I: ?Sized + 'static,
        C: Component,
    {
        self.component::<C>();
        self.alias::<C>(Identifier::of::<I>());
    }
}

impl<T: Configurer + ?Sized> TypedConfigurer for T {}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum CatalogError {
    #[snafu(display("the type {id} is already registered as {existing}"))]
    #[non_exhaustive]
    TypeDuplicated {
        id: Identifier,
        existing: &'static str,
    },
    #[snafu(display("module {module} fails to setup the configuration"))]
    #[non_exhaustive]
    ModuleInner {
        module: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
    #[snafu(display("aggregated catalog errors:\n{}", AggregatedDisplayer::new(errors)))]
    Aggregated { errors: Vec<CatalogError> },
}

impl CatalogError {
    pub(crate) fn aggregate(mut errors: Vec<CatalogError>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            Self::Aggregated { errors }
        }
    }
}

struct AggregatedDisplayer<'a> {
    errors: &'a [CatalogError],
}

impl<'a> AggregatedDisplayer<'a> {
    fn new(errors: &'a [CatalogError]) -> Self {
        Self { errors }
    }
}

impl Display for AggregatedDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, error)?;
        }
        Ok(())
    }
}
