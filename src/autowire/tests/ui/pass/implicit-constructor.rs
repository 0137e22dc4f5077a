use autowire::component::Component;
use autowire::prelude::*;

#[derive(Default)]
pub struct Clock {
    pub ticks: u64,
}

#[component]
impl Clock {
    pub fn tick(&mut self) {
        self.ticks += 1;
    }
}

fn main() {
    assert!(Clock::parameters().is_none());
    assert!(Clock::ancestors().is_empty());
}
