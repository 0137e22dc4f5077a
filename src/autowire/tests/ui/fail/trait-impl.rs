use autowire::component;

#[derive(Debug)]
pub struct Widget;

#[component]
impl Clone for Widget {
    fn clone(&self) -> Self {
        Self
    }
}

fn main() {
    let _ = Widget;
}
