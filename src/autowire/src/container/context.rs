use crate::identifier::Identifier;
use crate::instance::Overrides;

/// The state of one instantiation: which object is built, by which chain of
/// parents, and with which overrides.
pub struct CallContext<'a> {
    trace: ResolutionTrace<'a>,
    overrides: &'a Overrides,
}

impl<'a> CallContext<'a> {
    pub fn new(id: &'a Identifier, overrides: &'a Overrides) -> Self {
        Self {
            trace: ResolutionTrace::new(id),
            overrides,
        }
    }

    /// Starts the instantiation of a dependency, which never inherits the
    /// overrides of its parent.
    pub fn append<'b>(&'b self, id: &'b Identifier, overrides: &'b Overrides) -> CallContext<'b> {
        CallContext {
            trace: self.trace.append(id),
            overrides,
        }
    }

    pub fn id(&self) -> &Identifier {
        self.trace.id()
    }

    pub fn overrides(&self) -> &Overrides {
        self.overrides
    }

    pub fn trace(&self) -> &ResolutionTrace<'_> {
        &self.trace
    }
}

#[derive(Clone, Copy)]
pub struct ResolutionTrace<'a> {
    id: &'a Identifier,
    previous: Option<&'a ResolutionTrace<'a>>,
}

impl<'a> ResolutionTrace<'a> {
    pub fn new(id: &'a Identifier) -> Self {
        Self { id, previous: None }
    }

    pub fn append<'b>(&'b self, id: &'b Identifier) -> ResolutionTrace<'b> {
        ResolutionTrace {
            id,
            previous: Some(self),
        }
    }

    pub fn id(&self) -> &Identifier {
        self.id
    }

    /// Identifiers from the outermost request down to this one.
    pub fn path(&self) -> Vec<Identifier> {
        let mut path = Vec::new();
        let mut this = Some(self);
        while let Some(trace) = this {
            path.push(trace.id.clone());
            this = trace.previous;
        }
        path.reverse();
        path
    }

    /// The dependency path that leads back to `id`, starting at its outermost
    /// occurrence and ending with `id` itself.
    pub fn cycle_to(&self, id: &Identifier) -> Vec<Identifier> {
        let mut path = self.path();
        if let Some(start) = path.iter().position(|visited| visited == id) {
            path.drain(..start);
        }
        path.push(id.clone());
        path
    }
}
