use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use autowire::component::Component;
use autowire::prelude::*;
use autowire::value::Arguments;

#[derive(Debug)]
pub struct BindError;

impl Display for BindError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "port 0 can't be bound")
    }
}

impl Error for BindError {}

pub struct Endpoint {
    pub port: u16,
}

#[component]
impl Endpoint {
    #[inject]
    pub fn new(#[default(8080u16)] port: u16) -> Endpoint {
        Endpoint { port }
    }
}

pub struct Listener {
    pub endpoint: Arc<Endpoint>,
}

#[component]
impl Listener {
    #[inject]
    pub fn bind(endpoint: Arc<Endpoint>) -> Result<Self, BindError> {
        if endpoint.port == 0 {
            Err(BindError)
        } else {
            Ok(Self { endpoint })
        }
    }
}

pub struct Socket;

#[component]
impl Socket {
    #[inject]
    fn open() -> std::result::Result<Socket, std::io::Error> {
        Ok(Socket)
    }
}

fn main() {
    let endpoint = Endpoint::construct(Arguments::new(vec![Value::from(0u16)]))
        .unwrap()
        .unwrap();
    assert_eq!(endpoint.port, 0);

    let listener = Listener::construct(Arguments::new(vec![Value::from(Arc::new(endpoint))]));
    assert!(matches!(listener, Ok(Err(BindError))));

    assert!(matches!(Socket::construct(Arguments::default()), Ok(Ok(Socket))));
}
