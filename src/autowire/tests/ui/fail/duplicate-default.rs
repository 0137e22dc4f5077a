use autowire::component;

pub struct Pool;

#[component]
impl Pool {
    #[inject]
    fn new(#[default(1u32)] #[default(2u32)] size: u32) -> Self {
        let _ = size;
        Self
    }
}

fn main() {
    let _ = Pool;
}
