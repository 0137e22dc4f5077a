use std::collections::hash_map::Entry;
use std::error::Error;

use tracing::trace;

use crate::catalog::{CatalogEntry, CatalogError, Configurer, ConfigurerPrivate, TypeCatalog};
use crate::identifier::Identifier;

pub struct ConfigurerImpl {
    catalog: TypeCatalog,
    errors: Vec<CatalogError>,
}

impl ConfigurerImpl {
    pub fn new() -> Self {
        Self {
            catalog: TypeCatalog::new(),
            errors: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<TypeCatalog, Vec<CatalogError>> {
        if self.errors.is_empty() {
            Ok(self.catalog)
        } else {
            Err(self.errors)
        }
    }
}

impl Configurer for ConfigurerImpl {
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate {
        self
    }

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>) {
        self.errors.push(CatalogError::ModuleInner {
            module,
            source: err,
        });
    }
}

impl ConfigurerPrivate for ConfigurerImpl {
    fn dyn_register(&mut self, id: Identifier, entry: CatalogEntry) {
        match self.catalog.entries.entry(id) {
            Entry::Vacant(vacant) => {
                trace!(id = %vacant.key(), kind = entry.to_str(), "registered type");
                vacant.insert(entry);
            }
            Entry::Occupied(occupied) if occupied.get().is_same_declaration(entry) => {}
            Entry::Occupied(occupied) => {
                self.errors.push(CatalogError::TypeDuplicated {
                    id: occupied.key().clone(),
                    existing: occupied.get().to_str(),
                });
            }
        }
    }

    fn dyn_alias(&mut self, alias: Identifier, target: Identifier) {
        self.catalog.aliases.push((alias, target));
    }
}
