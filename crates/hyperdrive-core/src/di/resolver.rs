//! Per-call resolution state.

use std::any::type_name;
use std::cell::RefCell;
use std::sync::Arc;

use super::descriptor::Instance;
use super::error::{ContainerError, ContainerResult};
use super::{Container, ServiceId};

/// Handle passed to factories while a resolution is in progress.
///
/// It carries the stack of identifiers currently being constructed, so a
/// factory that asks for a service already on the stack fails with
/// [`ContainerError::CircularDependency`] instead of recursing forever.
pub struct Resolver<'c> {
    container: &'c Container,
    stack: RefCell<Vec<ServiceId>>,
}

impl<'c> Resolver<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        Self {
            container,
            stack: RefCell::new(Vec::new()),
        }
    }

    /// Resolves an identifier within the current resolution.
    pub fn get(&self, id: &ServiceId) -> ContainerResult<Instance> {
        self.container.resolve_with(self, id)
    }

    /// Resolves the service registered for type `T`.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        self.resolve_id(&ServiceId::of::<T>())
    }

    /// Resolves `id` and downcasts it to `T`.
    pub fn resolve_id<T: Send + Sync + 'static>(&self, id: &ServiceId) -> ContainerResult<Arc<T>> {
        downcast(id, self.get(id)?)
    }

    /// The container being resolved from.
    #[must_use]
    pub const fn container(&self) -> &'c Container {
        self.container
    }

    /// Number of services currently mid-construction.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    /// Pushes `id` onto the stack, failing on cycles and runaway depth.
    pub(crate) fn enter(&self, id: &ServiceId) -> ContainerResult<ResolutionGuard<'_>> {
        let mut stack = self.stack.borrow_mut();

        if stack.contains(id) {
            let chain = stack
                .iter()
                .chain(std::iter::once(id))
                .map(ServiceId::as_str)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ContainerError::CircularDependency {
                service: id.clone(),
                chain,
            });
        }

        let max = self.container.max_depth();
        if stack.len() >= max {
            return Err(ContainerError::DepthExceeded {
                service: id.clone(),
                max,
            });
        }

        stack.push(id.clone());
        Ok(ResolutionGuard { stack: &self.stack })
    }
}

/// Pops the stack when construction of one service finishes, successfully or not.
pub(crate) struct ResolutionGuard<'r> {
    stack: &'r RefCell<Vec<ServiceId>>,
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

pub(crate) fn downcast<T: Send + Sync + 'static>(
    id: &ServiceId,
    instance: Instance,
) -> ContainerResult<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| ContainerError::TypeMismatch {
            service: id.clone(),
            expected: type_name::<T>(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_pops_on_drop() {
        let container = Container::new();
        let resolver = Resolver::new(&container);
        let id = ServiceId::from("a");

        {
            let _guard = resolver.enter(&id).unwrap();
            assert_eq!(resolver.depth(), 1);
        }
        assert_eq!(resolver.depth(), 0);
    }

    #[test]
    fn test_reentering_reports_full_chain() {
        let container = Container::new();
        let resolver = Resolver::new(&container);
        let a = ServiceId::from("A");
        let b = ServiceId::from("B");

        let _ga = resolver.enter(&a).unwrap();
        let _gb = resolver.enter(&b).unwrap();
        let Err(err) = resolver.enter(&a) else {
            panic!("expected a cycle");
        };

        assert_eq!(err.to_string(), "Circular dependency detected: A -> B -> A");
    }

    #[test]
    fn test_depth_limit() {
        let container = Container::new().with_max_depth(2);
        let resolver = Resolver::new(&container);
        let ids = [ServiceId::from("a"), ServiceId::from("b"), ServiceId::from("c")];

        let _g0 = resolver.enter(&ids[0]).unwrap();
        let _g1 = resolver.enter(&ids[1]).unwrap();
        assert!(matches!(
            resolver.enter(&ids[2]),
            Err(ContainerError::DepthExceeded { max: 2, .. })
        ));
    }
}
