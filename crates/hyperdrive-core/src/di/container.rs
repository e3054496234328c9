use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::descriptor::{Descriptor, Injectable, Instance, ResolvedDependencies};
use super::error::{ContainerError, ContainerResult};
use super::resolver::{downcast, Resolver};
use super::ServiceId;

/// Default limit on nested resolutions.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// A factory producing a type-erased instance.
pub type Factory = Arc<dyn Fn(&Resolver<'_>) -> ContainerResult<Instance> + Send + Sync>;

/// What an identifier is bound to.
#[derive(Clone)]
pub enum Concrete {
    /// Resolve another identifier. Binding an identifier to itself means
    /// "auto-wire the registered [`Injectable`]".
    Type(ServiceId),
    /// Call a factory.
    Factory(Factory),
}

impl Concrete {
    /// Binds to the identifier of type `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(ServiceId::of::<T>())
    }

    /// Wraps a typed factory.
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> ContainerResult<T> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(move |resolver| {
            factory(resolver).map(|value| Arc::new(value) as Instance)
        }))
    }
}

impl From<ServiceId> for Concrete {
    fn from(id: ServiceId) -> Self {
        Self::Type(id)
    }
}

impl fmt::Debug for Concrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(id) => f.debug_tuple("Type").field(id).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

#[derive(Clone)]
struct Binding {
    concrete: Concrete,
    shared: bool,
}

/// The dependency injection container.
///
/// Registration happens through `&mut self` during boot; resolution takes
/// `&self` and is safe to call from many requests at once. The only state
/// that changes after boot is the singleton cache.
///
/// # Example
///
/// ```
/// use hyperdrive_core::di::{Concrete, Container};
/// use std::sync::Arc;
///
/// struct Clock(u64);
///
/// let mut container = Container::new();
/// container.singleton_factory("clock", |_| Ok(Clock(42)));
///
/// let a = container.resolve_id::<Clock>(&"clock".into()).unwrap();
/// let b = container.resolve_id::<Clock>(&"clock".into()).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct Container {
    bindings: HashMap<ServiceId, Binding>,
    descriptors: HashMap<ServiceId, Descriptor>,
    instances: RwLock<HashMap<ServiceId, Instance>>,
    max_depth: usize,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            descriptors: HashMap::new(),
            instances: RwLock::new(HashMap::new()),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum nesting depth of a single resolution.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the maximum nesting depth.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Registers constructor metadata for `T` so it can be auto-wired.
    ///
    /// Unbound auto-wired types are transient: every `get` builds a new one.
    /// Use [`Container::singleton`] with `None` to share a single instance.
    pub fn register<T: Injectable>(&mut self) -> &mut Self {
        let id = ServiceId::of::<T>();
        tracing::debug!(service = %id, "registered injectable");
        self.descriptors.insert(id, Descriptor::of::<T>());
        self
    }

    /// Declares an identifier that exists but cannot be built directly,
    /// such as a trait object that must be bound to an implementation.
    pub fn register_abstract(&mut self, id: impl Into<ServiceId>) -> &mut Self {
        self.descriptors
            .insert(id.into(), Descriptor::abstract_only());
        self
    }

    /// Binds `id` to a concrete. Replaces any earlier binding.
    pub fn bind(&mut self, id: impl Into<ServiceId>, concrete: impl Into<Concrete>) -> &mut Self {
        self.insert_binding(id.into(), concrete.into(), false)
    }

    /// Binds `id` as shared: the first resolution is cached for the lifetime
    /// of the container. With `None` the identifier resolves to itself.
    pub fn singleton(&mut self, id: impl Into<ServiceId>, concrete: Option<Concrete>) -> &mut Self {
        let id = id.into();
        let concrete = concrete.unwrap_or_else(|| Concrete::Type(id.clone()));
        self.insert_binding(id, concrete, true)
    }

    /// Binds `id` to a factory invoked on every resolution.
    pub fn bind_factory<T, F>(&mut self, id: impl Into<ServiceId>, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> ContainerResult<T> + Send + Sync + 'static,
    {
        self.bind(id, Concrete::factory(factory))
    }

    /// Binds `id` to a factory invoked once.
    pub fn singleton_factory<T, F>(&mut self, id: impl Into<ServiceId>, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> ContainerResult<T> + Send + Sync + 'static,
    {
        self.singleton(id, Some(Concrete::factory(factory)))
    }

    /// Stores a pre-built instance under `id`.
    pub fn instance<T: Send + Sync + 'static>(
        &mut self,
        id: impl Into<ServiceId>,
        value: Arc<T>,
    ) -> &mut Self {
        self.instance_erased(id, value)
    }

    /// Stores a pre-built, already type-erased instance under `id`.
    pub fn instance_erased(&mut self, id: impl Into<ServiceId>, value: Instance) -> &mut Self {
        let id = id.into();
        tracing::debug!(service = %id, "registered instance");
        self.instances.get_mut().insert(id, value);
        self
    }

    /// Stores `value` under the identifier of its own type.
    pub fn provide<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        self.instance(ServiceId::of::<T>(), Arc::new(value))
    }

    /// Returns `true` if `id` has a binding or a stored instance.
    #[must_use]
    pub fn bound(&self, id: &ServiceId) -> bool {
        self.bindings.contains_key(id) || self.instances.read().contains_key(id)
    }

    /// Returns `true` if `get(id)` has something to work with: a stored
    /// instance, a binding, or an instantiable registered type.
    #[must_use]
    pub fn has(&self, id: &ServiceId) -> bool {
        self.bound(id)
            || self
                .descriptors
                .get(id)
                .is_some_and(Descriptor::is_instantiable)
    }

    /// Returns `true` if `id` is bound as a singleton.
    #[must_use]
    pub fn is_shared(&self, id: &ServiceId) -> bool {
        self.bindings.get(id).is_some_and(|binding| binding.shared)
    }

    /// Resolves `id` to an instance.
    pub fn get(&self, id: &ServiceId) -> ContainerResult<Instance> {
        Resolver::new(self).get(id)
    }

    /// Resolves the service registered for type `T`.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> ContainerResult<Arc<T>> {
        self.resolve_id(&ServiceId::of::<T>())
    }

    /// Resolves `id` and downcasts it to `T`.
    pub fn resolve_id<T: Send + Sync + 'static>(&self, id: &ServiceId) -> ContainerResult<Arc<T>> {
        downcast(id, self.get(id)?)
    }

    pub(crate) fn resolve_with(
        &self,
        resolver: &Resolver<'_>,
        id: &ServiceId,
    ) -> ContainerResult<Instance> {
        if let Some(instance) = self.instances.read().get(id) {
            return Ok(Arc::clone(instance));
        }

        let _guard = resolver.enter(id)?;
        tracing::trace!(service = %id, depth = resolver.depth(), "resolving");

        let Some(binding) = self.bindings.get(id) else {
            return self.build(resolver, id);
        };

        let instance = match &binding.concrete {
            Concrete::Type(target) if target == id => self.build(resolver, id)?,
            Concrete::Type(target) => resolver.get(target)?,
            Concrete::Factory(factory) => factory(resolver)?,
        };

        if binding.shared {
            let mut instances = self.instances.write();
            return Ok(Arc::clone(instances.entry(id.clone()).or_insert(instance)));
        }
        Ok(instance)
    }

    fn build(&self, resolver: &Resolver<'_>, id: &ServiceId) -> ContainerResult<Instance> {
        let descriptor = self
            .descriptors
            .get(id)
            .ok_or_else(|| ContainerError::NotFound(id.clone()))?;
        let constructor = descriptor
            .constructor
            .as_ref()
            .ok_or_else(|| ContainerError::NotInstantiable(id.clone()))?;

        let mut values = Vec::with_capacity(descriptor.dependencies.len());
        for dependency in &descriptor.dependencies {
            let value = if let Some(target) = dependency.service_target() {
                resolver.get(target)?
            } else if let Some(default) = dependency.default_value() {
                Arc::clone(default)
            } else {
                return Err(ContainerError::UnresolvableParameter {
                    parameter: dependency.name().to_string(),
                    service: id.clone(),
                });
            };
            values.push((dependency.name().to_string(), value));
        }

        constructor(&mut ResolvedDependencies::new(id.clone(), values))
    }

    fn insert_binding(&mut self, id: ServiceId, concrete: Concrete, shared: bool) -> &mut Self {
        tracing::debug!(service = %id, shared, concrete = ?concrete, "bound service");
        self.instances.get_mut().remove(&id);
        self.bindings.insert(id, Binding { concrete, shared });
        self
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.bindings.len())
            .field("registered", &self.descriptors.len())
            .field("instances", &self.instances.read().len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::di::Dependency;

    #[derive(Debug)]
    struct Database {
        url: String,
    }

    impl Injectable for Database {
        fn dependencies() -> Vec<Dependency> {
            vec![Dependency::with_default("url", "sqlite::memory:".to_string())]
        }

        fn construct(deps: &mut ResolvedDependencies) -> ContainerResult<Self> {
            Ok(Self {
                url: deps.value("url")?,
            })
        }
    }

    struct UserService {
        db: Arc<Database>,
    }

    impl Injectable for UserService {
        fn dependencies() -> Vec<Dependency> {
            vec![Dependency::service::<Database>("db")]
        }

        fn construct(deps: &mut ResolvedDependencies) -> ContainerResult<Self> {
            Ok(Self { db: deps.take("db")? })
        }
    }

    #[derive(Debug)]
    struct NeedsPort;

    impl Injectable for NeedsPort {
        fn dependencies() -> Vec<Dependency> {
            vec![Dependency::primitive("port")]
        }

        fn construct(_: &mut ResolvedDependencies) -> ContainerResult<Self> {
            Ok(Self)
        }
    }

    #[derive(Debug)]
    struct CycleA;
    struct CycleB;

    impl Injectable for CycleA {
        fn dependencies() -> Vec<Dependency> {
            vec![Dependency::service::<CycleB>("b")]
        }

        fn construct(_: &mut ResolvedDependencies) -> ContainerResult<Self> {
            Ok(Self)
        }
    }

    impl Injectable for CycleB {
        fn dependencies() -> Vec<Dependency> {
            vec![Dependency::service::<CycleA>("a")]
        }

        fn construct(_: &mut ResolvedDependencies) -> ContainerResult<Self> {
            Ok(Self)
        }
    }

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_autowires_constructor_dependencies() {
        let mut container = Container::new();
        container.register::<Database>().register::<UserService>();

        let service = container.resolve::<UserService>().unwrap();
        assert_eq!(service.db.url, "sqlite::memory:");
    }

    #[test]
    fn test_unbound_types_are_transient() {
        let mut container = Container::new();
        container.register::<Database>();

        let a = container.resolve::<Database>().unwrap();
        let b = container.resolve::<Database>().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_singleton_returns_same_instance() {
        let mut container = Container::new();
        container
            .register::<Database>()
            .singleton(ServiceId::of::<Database>(), None);

        let a = container.resolve::<Database>().unwrap();
        let b = container.resolve::<Database>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(container.is_shared(&ServiceId::of::<Database>()));
    }

    #[test]
    fn test_bind_factory_builds_fresh_each_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut container = Container::new();
        container.bind_factory("counter", move |_| Ok(counter.fetch_add(1, Ordering::SeqCst)));

        let id = ServiceId::from("counter");
        assert_eq!(*container.resolve_id::<usize>(&id).unwrap(), 0);
        assert_eq!(*container.resolve_id::<usize>(&id).unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_instance_is_returned_as_is() {
        let db = Arc::new(Database {
            url: "postgres://localhost".to_string(),
        });

        let mut container = Container::new();
        container.instance(ServiceId::of::<Database>(), Arc::clone(&db));

        let resolved = container.resolve::<Database>().unwrap();
        assert!(Arc::ptr_eq(&db, &resolved));
        assert!(container.bound(&ServiceId::of::<Database>()));
    }

    #[test]
    fn test_abstract_bound_to_implementation() {
        let id = ServiceId::from("greeter");
        let mut container = Container::new();
        container.register_abstract(id.clone());
        assert!(!container.has(&id));
        assert!(matches!(
            container.get(&id),
            Err(ContainerError::NotInstantiable(_))
        ));

        container.singleton_factory(id.clone(), |_| Ok(Arc::new(English) as Arc<dyn Greeter>));
        let greeter = container.resolve_id::<Arc<dyn Greeter>>(&id).unwrap();
        assert_eq!(greeter.greet(), "hello");
    }

    #[test]
    fn test_binding_to_another_identifier() {
        let mut container = Container::new();
        container
            .register::<Database>()
            .bind("db", Concrete::of::<Database>());

        let db = container.resolve_id::<Database>(&"db".into()).unwrap();
        assert_eq!(db.url, "sqlite::memory:");
    }

    #[test]
    fn test_missing_service_is_not_found() {
        let container = Container::new();
        let err = container.resolve::<Database>().unwrap_err();
        assert!(err.is_not_found());
        assert!(!container.has(&ServiceId::of::<Database>()));
    }

    #[test]
    fn test_primitive_without_default_is_unresolvable() {
        let mut container = Container::new();
        container.register::<NeedsPort>();

        let err = container.resolve::<NeedsPort>().unwrap_err();
        assert!(err.to_string().starts_with("Cannot resolve parameter $port in"));
    }

    #[test]
    fn test_constructor_cycle_is_detected() {
        let mut container = Container::new();
        container.register::<CycleA>().register::<CycleB>();

        let err = container.resolve::<CycleA>().unwrap_err();
        assert!(err.is_circular());

        let a = ServiceId::of::<CycleA>();
        let b = ServiceId::of::<CycleB>();
        assert_eq!(
            err.to_string(),
            format!("Circular dependency detected: {a} -> {b} -> {a}")
        );
    }

    #[test]
    fn test_factory_cycle_is_detected() {
        let mut container = Container::new();
        container
            .singleton_factory("a", |r| r.resolve_id::<u8>(&"b".into()).map(|v| *v))
            .singleton_factory("b", |r| r.resolve_id::<u8>(&"a".into()).map(|v| *v));

        let err = container.get(&"a".into()).unwrap_err();
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
    }

    #[test]
    fn test_failed_resolution_does_not_cache() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);

        let mut container = Container::new();
        container.singleton_factory("flaky", move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ContainerError::factory("flaky", anyhow::anyhow!("not yet")))
            } else {
                Ok(7_u32)
            }
        });

        let id = ServiceId::from("flaky");
        assert!(container.get(&id).is_err());
        assert_eq!(*container.resolve_id::<u32>(&id).unwrap(), 7);
        assert_eq!(*container.resolve_id::<u32>(&id).unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_rebinding_replaces_cached_singleton() {
        let mut container = Container::new();
        container.singleton_factory("n", |_| Ok(1_u8));
        assert_eq!(*container.resolve_id::<u8>(&"n".into()).unwrap(), 1);

        container.singleton_factory("n", |_| Ok(2_u8));
        assert_eq!(*container.resolve_id::<u8>(&"n".into()).unwrap(), 2);
    }

    #[test]
    fn test_type_mismatch() {
        let mut container = Container::new();
        container.provide(5_u32);

        let err = container
            .resolve_id::<String>(&ServiceId::of::<u32>())
            .unwrap_err();
        assert!(matches!(err, ContainerError::TypeMismatch { .. }));
    }

    #[test]
    fn test_singleton_shared_across_threads() {
        let mut container = Container::new();
        container
            .register::<Database>()
            .singleton(ServiceId::of::<Database>(), None);
        let container = Arc::new(container);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = Arc::clone(&container);
                std::thread::spawn(move || container.resolve::<Database>().unwrap())
            })
            .collect();

        let resolved: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let first = container.resolve::<Database>().unwrap();
        assert!(resolved.iter().all(|db| Arc::ptr_eq(db, &first)));
    }
}
