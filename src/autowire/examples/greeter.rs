use std::error::Error;
use std::sync::Arc;

use autowire::prelude::*;

fn main() {
    let container = Container::init(AppModule).unwrap();
    let app = container.get::<App>().unwrap();
    app.run();
}

struct AppModule;

impl Module for AppModule {
    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        configurer.bind::<dyn Logger, ConsoleLogger>();
        configurer.bind::<dyn Greeter, EnglishGreeter>();
        configurer.component::<ChineseGreeter>();
        configurer.component::<App>();
        Ok(())
    }
}

trait Logger: Send + Sync + 'static {
    fn log(&self, message: &str);
}

struct ConsoleLogger {
    app_name: String,
}

#[component(implements(dyn Logger))]
impl ConsoleLogger {
    #[inject]
    pub fn new(#[default("greeter")] app_name: String) -> Self {
        Self { app_name }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.app_name, message);
    }
}

trait Greeter: Send + Sync + 'static {
    fn greet(&self);
}

struct EnglishGreeter {
    logger: Arc<dyn Logger>,
}

#[component(implements(dyn Greeter))]
impl EnglishGreeter {
    #[inject]
    fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Greeter for EnglishGreeter {
    fn greet(&self) {
        self.logger.log("Hello World!");
    }
}

struct ChineseGreeter {
    logger: Arc<dyn Logger>,
}

#[component(implements(dyn Greeter))]
impl ChineseGreeter {
    #[inject]
    fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Greeter for ChineseGreeter {
    fn greet(&self) {
        self.logger.log("你好世界!");
    }
}

struct App {
    logger: Arc<dyn Logger>,
    greeter: Arc<dyn Greeter>,
    chinese: Option<Arc<ChineseGreeter>>,
}

#[component]
impl App {
    #[inject]
    fn new(
        logger: Arc<dyn Logger>,
        greeter: Arc<dyn Greeter>,
        chinese: Option<Arc<ChineseGreeter>>,
    ) -> Self {
        Self {
            logger,
            greeter,
            chinese,
        }
    }

    fn run(&self) {
        self.logger.log("Greeting from autowired services:");
        self.greeter.greet();
        if let Some(chinese) = &self.chinese {
            chinese.greet();
        }
    }
}
