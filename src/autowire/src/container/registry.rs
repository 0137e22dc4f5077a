use std::collections::hash_map::Entry;
use std::collections::HashMap;

use parking_lot::RwLock;
use snafu::prelude::*;
use tracing::trace;

use crate::identifier::{Identifier, Identify};
use crate::instance::Instance;
use crate::value::Value;

/// The singleton cache and the alias table of a container.
///
/// Aliases are a single hop: an alias always points at a canonical
/// identifier, never at another alias.
pub struct Registry {
    data: RwLock<RegistryData>,
}

#[derive(Default)]
struct RegistryData {
    objects: HashMap<Identifier, Instance>,
    aliases: HashMap<Identifier, Identifier>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(RegistryData::default()),
        }
    }

    /// Caches a constructed object under its runtime identifier, replacing
    /// any previous object, and aliases each of its ancestors to it unless
    /// the ancestor is aliased already.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotAnObject`] if `value` is a primitive.
    pub fn add_service(&self, value: impl Into<Value>) -> Result<(), RegistryError> {
        match value.into() {
            Value::Object(instance) => {
                self.insert(instance);
                Ok(())
            }
            other => NotAnObjectSnafu { kind: other.kind() }.fail(),
        }
    }

    pub fn insert(&self, instance: Instance) {
        let mut data = self.data.write();
        let id = instance.id().clone();
        for ancestor in instance.ancestors() {
            data.add_alias(&id, ancestor, false);
        }
        trace!(%id, "cached object");
        data.objects.insert(id, instance);
    }

    /// Points `alias` at `id`. Returns whether the alias table was written.
    pub fn add_alias(&self, id: &Identifier, alias: &Identifier, replace: bool) -> bool {
        self.data.write().add_alias(id, alias, replace)
    }

    pub fn has_alias(&self, id: &Identifier) -> bool {
        self.data.read().aliases.contains_key(id)
    }

    pub fn get_alias(&self, id: &Identifier) -> Option<Identifier> {
        self.data.read().aliases.get(id).cloned()
    }

    /// Follows at most one alias hop.
    pub fn canonical(&self, id: &Identifier) -> Identifier {
        self.data.read().canonical(id).clone()
    }

    /// Looks up the cached object of a canonical identifier.
    pub fn get(&self, id: &Identifier) -> Option<Instance> {
        self.data.read().objects.get(id).cloned()
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.data.read().objects.contains_key(id)
    }

    /// Whether an object is cached for `target`, after one alias hop.
    pub fn has_service_instance(&self, target: &(impl Identify + ?Sized)) -> bool {
        let data = self.data.read();
        let id = target.identifier();
        data.objects.contains_key(data.canonical(&id))
    }
}

impl RegistryData {
    fn canonical<'a>(&'a self, id: &'a Identifier) -> &'a Identifier {
        self.aliases.get(id).unwrap_or(id)
    }

    fn add_alias(&mut self, id: &Identifier, alias: &Identifier, replace: bool) -> bool {
        let target = self.canonical(id).clone();
        if &target == alias {
            return false;
        }

        match self.aliases.entry(alias.clone()) {
            Entry::Vacant(vacant) => {
                trace!(%alias, %target, "registered alias");
                vacant.insert(target.clone());
            }
            Entry::Occupied(mut occupied) if replace => {
                trace!(%alias, %target, previous = %occupied.get(), "replaced alias");
                occupied.insert(target.clone());
            }
            Entry::Occupied(_) => return false,
        }

        // `alias` is no longer canonical, so aliases pointing at it move on.
        for (other, previous) in self.aliases.iter_mut() {
            if *previous == *alias {
                trace!(alias = %other, %target, "redirected alias");
                *previous = target.clone();
            }
        }
        true
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("could not register a value of kind {kind} which is not a constructed object"))]
    #[non_exhaustive]
    NotAnObject { kind: &'static str },
}
