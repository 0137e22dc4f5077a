use std::sync::Arc;

use autowire::component::Component;
use autowire::prelude::*;

pub trait Clock: Send + Sync {}
pub trait Timer: Send + Sync {}

#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {}
impl Timer for SystemClock {}

#[component(implements(dyn Clock, dyn Timer))]
impl SystemClock {}

pub struct Scheduler {
    pub clock: Arc<dyn Clock>,
    pub timer: Option<Arc<dyn Timer>>,
    pub workers: u32,
    pub offset: i64,
    pub container: ContainerRef,
}

#[component]
impl Scheduler {
    #[inject]
    pub fn new(
        clock: Arc<dyn Clock>,
        timer: Option<Arc<dyn Timer>>,
        #[default(4)] workers: u32,
        #[default(-1i64)] offset: i64,
        container: ContainerRef,
    ) -> Self {
        Self {
            clock,
            timer,
            workers,
            offset,
            container,
        }
    }
}

fn main() {
    assert_eq!(
        SystemClock::ancestors(),
        vec![Identifier::of::<dyn Clock>(), Identifier::of::<dyn Timer>()]
    );

    let parameters = Scheduler::parameters().unwrap();
    let names: Vec<_> = parameters.iter().map(|parameter| parameter.name()).collect();
    assert_eq!(names, ["clock", "timer", "workers", "offset", "container"]);
    assert!(!parameters[0].is_optional());
    assert!(parameters[1].is_optional());
    assert!(parameters[2].is_optional() && parameters[2].is_primitive());
    assert_eq!(parameters[3].default_value(), Some(&Value::Int(-1)));
    assert_eq!(parameters[4].declared(), Some(&Identifier::of::<Container>()));
}
