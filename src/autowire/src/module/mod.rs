use std::any;
use std::error::Error;

use tracing::debug;

use crate::catalog::Configurer;

/// A unit of container configuration.
///
/// A [`Module`] tells a [`Configurer`] which components, interfaces and
/// aliases exist. Errors returned from [`Module::configure`] don't abort the
/// setup; they're collected and reported together when the container is
/// initialized.
pub trait Module: 'static {
    fn setup(&self, configurer: &mut dyn Configurer) {
        if let Err(err) = self.configure(configurer) {
            debug!(module = self.name(), error = %err, "module configuration failed");
            configurer.report_module_error(self.name(), err);
        }
    }

    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn name(&self) -> &'static str {
        any::type_name::<Self>()
    }
}

/// A [`Module`] composed of other modules.
#[derive(Default)]
pub struct Configuration {
    modules: Vec<Box<dyn Module>>,
}

impl Configuration {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with<M: Module>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn compose(mut self, mut other: Configuration) -> Self {
        self.modules.append(&mut other.modules);
        self
    }
}

impl Module for Configuration {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.modules
            .iter()
            .for_each(|module| module.setup(configurer));
        Ok(())
    }
}
