use autowire::component;

pub struct Pool;

#[component]
impl Pool {
    #[inject]
    fn new(#[default] size: u32) -> Self {
        let _ = size;
        Self
    }
}

fn main() {
    let _ = Pool;
}
