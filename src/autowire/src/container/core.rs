use std::collections::HashMap;
use std::thread::{self, ThreadId};

use oneshot::{Receiver, Sender};
use parking_lot::{Mutex, MutexGuard};
use snafu::prelude::*;
use tracing::{debug, trace, warn};

use crate::container::context::CallContext;
use crate::container::error::{
    AbandonedSnafu, CircularDependencySnafu, InterfaceWithoutAliasSnafu, NotAServiceSnafu,
    ResolveError, TypeNotFoundSnafu,
};
use crate::container::registry::Registry;
use crate::descriptor::{Constructor, Introspector, TypeKind};
use crate::identifier::Identifier;
use crate::instance::{Instance, Overrides};

pub struct ContainerCore {
    registry: Registry,
    introspector: Box<dyn Introspector>,
    constructing: Mutex<ConstructingObjects>,
}

impl ContainerCore {
    pub fn new(introspector: Box<dyn Introspector>) -> Self {
        Self {
            registry: Registry::new(),
            introspector,
            constructing: Mutex::new(ConstructingObjects::new()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolves `id` on behalf of a caller outside any construction.
    pub fn resolve(&self, id: &Identifier, overrides: &Overrides) -> Result<Instance, ResolveError> {
        self.get_object(id, overrides, None)
    }

    /// Resolves a constructor parameter of the object built in `context`.
    pub(super) fn resolve_dependency(
        &self,
        id: &Identifier,
        context: &CallContext<'_>,
    ) -> Result<Instance, ResolveError> {
        self.get_object(id, &Overrides::new(), Some(context))
    }

    fn get_object(
        &self,
        requested: &Identifier,
        overrides: &Overrides,
        parent: Option<&CallContext<'_>>,
    ) -> Result<Instance, ResolveError> {
        let id = self.registry.canonical(requested);
        trace!(%requested, %id, "resolving object");
        if let Some(object) = self.registry.get(&id) {
            return Ok(object);
        }

        let constructor = self.describe_constructor(&id)?;

        let constructing = self.constructing.lock();
        if let Some(object) = self.registry.get(&id) {
            return Ok(object);
        }
        if constructing.objects.contains_key(&id) {
            return self.wait_for_constructed_object(constructing, &id, parent);
        }

        let claim = ConstructionClaim::acquire(self, constructing, &id);
        let context = match parent {
            Some(parent) => parent.append(&id, overrides),
            None => CallContext::new(&id, overrides),
        };

        match self.instantiate_in(constructor, &context) {
            Ok(object) => {
                if object.id() != &id {
                    self.registry.add_alias(object.id(), &id, false);
                }
                self.registry.insert(object.clone());
                debug!(%id, "constructed object");
                claim.finish(WaitResponse::Constructed(object.clone()));
                Ok(object)
            }
            Err(err) => {
                claim.finish(WaitResponse::Error(err.clone()));
                Err(err)
            }
        }
    }

    /// Looks up how to construct the object named by canonical `id`.
    pub(super) fn describe_constructor(&self, id: &Identifier) -> Result<Constructor, ResolveError> {
        let descriptor = self
            .introspector
            .describe(id)
            .context(TypeNotFoundSnafu { id: id.clone() })?;

        match descriptor.into_kind() {
            TypeKind::Service(constructor) => Ok(constructor),
            TypeKind::Interface => InterfaceWithoutAliasSnafu { id: id.clone() }.fail(),
            TypeKind::Plain => NotAServiceSnafu { id: id.clone() }.fail(),
        }
    }

    /// Whether resolving `id` could produce an object without failing
    /// outright: it's aliased, cached, or describes a service.
    pub(super) fn is_resolvable(&self, id: &Identifier) -> bool {
        if self.registry.has_alias(id) {
            return true;
        }
        self.registry.contains(id)
            || self
                .introspector
                .describe(id)
                .is_some_and(|descriptor| descriptor.is_service())
    }

    fn wait_for_constructed_object(
        &self,
        mut constructing: MutexGuard<'_, ConstructingObjects>,
        id: &Identifier,
        parent: Option<&CallContext<'_>>,
    ) -> Result<Instance, ResolveError> {
        let current = thread::current().id();
        if constructing.leads_to_thread(id, current) {
            let path = match parent {
                Some(parent) => parent.trace().cycle_to(id),
                None => vec![id.clone(), id.clone()],
            };
            drop(constructing);
            warn!(%id, "circular dependency detected");
            return CircularDependencySnafu {
                id: id.clone(),
                path,
            }
            .fail();
        }

        let receiver = constructing.register_waiter(id, current);
        drop(constructing);
        trace!(%id, "waiting for object constructed by another thread");

        let response = receiver.recv();
        self.constructing.lock().waiting.remove(&current);

        match response {
            Ok(WaitResponse::Constructed(object)) => Ok(object),
            Ok(WaitResponse::Error(err)) => Err(err),
            Err(_) => AbandonedSnafu { id: id.clone() }.fail(),
        }
    }
}

struct ConstructingObjects {
    objects: HashMap<Identifier, ConstructingObjectContext>,
    /// The object each blocked thread is waiting for.
    waiting: HashMap<ThreadId, Identifier>,
}

impl ConstructingObjects {
    fn new() -> Self {
        Self {
            objects: HashMap::new(),
            waiting: HashMap::new(),
        }
    }

    /// Walks the wait-for chain starting at the owner of `id`. Reaching
    /// `thread` means waiting for `id` would never return.
    fn leads_to_thread(&self, id: &Identifier, thread: ThreadId) -> bool {
        let mut next = Some(id);
        for _ in 0..=self.waiting.len() {
            let Some(context) = next.and_then(|id| self.objects.get(id)) else {
                return false;
            };
            if context.on_thread == thread {
                return true;
            }
            next = self.waiting.get(&context.on_thread);
        }
        false
    }

    fn register_waiter(&mut self, id: &Identifier, thread: ThreadId) -> Receiver<WaitResponse> {
        let (sender, receiver) = oneshot::channel();
        let Some(context) = self.objects.get_mut(id) else {
            unreachable!("whether `context` exists should be checked before calling this method")
        };
        context.register_waiter(sender);
        self.waiting.insert(thread, id.clone());
        receiver
    }
}

struct ConstructingObjectContext {
    on_thread: ThreadId,
    waiters: Vec<Sender<WaitResponse>>,
}

impl ConstructingObjectContext {
    fn new(on_thread: ThreadId) -> Self {
        Self {
            on_thread,
            waiters: Vec::new(),
        }
    }

    fn register_waiter(&mut self, sender: Sender<WaitResponse>) {
        self.waiters.push(sender);
    }

    fn notify(self, response: WaitResponse) {
        for sender in self.waiters {
            let _ = sender.send(response.clone());
        }
    }
}

/// Marks an object as being constructed by the current thread until dropped.
///
/// Dropping the claim without [`ConstructionClaim::finish`], e.g. while a
/// constructor panics, drops the senders of all waiters, which then observe
/// [`ResolveError::Abandoned`].
struct ConstructionClaim<'a> {
    core: &'a ContainerCore,
    id: Identifier,
    response: Option<WaitResponse>,
}

impl<'a> ConstructionClaim<'a> {
    fn acquire(
        core: &'a ContainerCore,
        mut constructing: MutexGuard<'_, ConstructingObjects>,
        id: &Identifier,
    ) -> Self {
        let context = ConstructingObjectContext::new(thread::current().id());
        constructing.objects.insert(id.clone(), context);
        Self {
            core,
            id: id.clone(),
            response: None,
        }
    }

    fn finish(mut self, response: WaitResponse) {
        self.response = Some(response);
    }
}

impl Drop for ConstructionClaim<'_> {
    fn drop(&mut self) {
        let context = self.core.constructing.lock().objects.remove(&self.id);
        match (context, self.response.take()) {
            (Some(context), Some(response)) => context.notify(response),
            (Some(_), None) => warn!(id = %self.id, "construction abandoned"),
            (None, _) => {}
        }
    }
}

#[derive(Debug, Clone)]
enum WaitResponse {
    Constructed(Instance),
    Error(ResolveError),
}
