use std::collections::HashMap;

use crate::identifier::Identifier;
use crate::instance::Instance;

/// Instances preferred over recursive resolution while constructing a
/// single service.
///
/// Each override is keyed by its own runtime identifier, so it replaces
/// constructor parameters declared as exactly that type.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    instances: HashMap<Identifier, Instance>,
}

impl Overrides {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with(mut self, instance: Instance) -> Self {
        self.insert(instance);
        self
    }

    pub fn insert(&mut self, instance: Instance) -> Option<Instance> {
        self.instances.insert(instance.id().clone(), instance)
    }

    pub fn get(&self, id: &Identifier) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl FromIterator<Instance> for Overrides {
    fn from_iter<I: IntoIterator<Item = Instance>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::with)
    }
}
