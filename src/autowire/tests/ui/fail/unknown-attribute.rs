use autowire::component;

#[derive(Default)]
pub struct Logger;

#[component(extends(dyn std::fmt::Debug))]
impl Logger {}

fn main() {
    let _ = Logger;
}
