//! Constructor metadata for auto-wired services.
//!
//! Rust has no runtime reflection, so a type opts into auto-wiring by
//! implementing [`Injectable`]: it lists its constructor parameters as
//! [`Dependency`] values and builds itself from the [`ResolvedDependencies`]
//! the container hands back.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use super::error::{ContainerError, ContainerResult};
use super::ServiceId;

/// A type-erased, shareable service instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type Constructor =
    Arc<dyn Fn(&mut ResolvedDependencies) -> ContainerResult<Instance> + Send + Sync>;

/// A type the container can construct on its own.
///
/// # Example
///
/// ```
/// use hyperdrive_core::di::{Container, ContainerResult, Dependency, Injectable, ResolvedDependencies};
/// use std::sync::Arc;
///
/// struct Database;
///
/// impl Injectable for Database {
///     fn construct(_: &mut ResolvedDependencies) -> ContainerResult<Self> {
///         Ok(Self)
///     }
/// }
///
/// struct UserRepository {
///     db: Arc<Database>,
///     page_size: usize,
/// }
///
/// impl Injectable for UserRepository {
///     fn dependencies() -> Vec<Dependency> {
///         vec![
///             Dependency::service::<Database>("db"),
///             Dependency::with_default("page_size", 25_usize),
///         ]
///     }
///
///     fn construct(deps: &mut ResolvedDependencies) -> ContainerResult<Self> {
///         Ok(Self {
///             db: deps.take("db")?,
///             page_size: deps.value("page_size")?,
///         })
///     }
/// }
///
/// let mut container = Container::new();
/// container.register::<Database>();
/// container.register::<UserRepository>();
///
/// let repo = container.resolve::<UserRepository>().unwrap();
/// assert_eq!(repo.page_size, 25);
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Constructor parameters, in declaration order.
    fn dependencies() -> Vec<Dependency> {
        Vec::new()
    }

    /// Builds the value from its resolved parameters.
    fn construct(deps: &mut ResolvedDependencies) -> ContainerResult<Self>;
}

/// One constructor parameter.
#[derive(Clone)]
pub struct Dependency {
    name: String,
    kind: DependencyKind,
}

#[derive(Clone)]
enum DependencyKind {
    Service(ServiceId),
    Default(Instance),
    Primitive,
}

impl Dependency {
    /// A parameter resolved as the service registered for type `T`.
    #[must_use]
    pub fn service<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::service_id(name, ServiceId::of::<T>())
    }

    /// A parameter resolved as the service registered under `id`.
    #[must_use]
    pub fn service_id(name: impl Into<String>, id: impl Into<ServiceId>) -> Self {
        Self {
            name: name.into(),
            kind: DependencyKind::Service(id.into()),
        }
    }

    /// A primitive parameter with a default value.
    #[must_use]
    pub fn with_default<T: Send + Sync + 'static>(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            kind: DependencyKind::Default(Arc::new(value)),
        }
    }

    /// A primitive parameter with no default. Resolving it always fails.
    #[must_use]
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DependencyKind::Primitive,
        }
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the service this parameter resolves to, if it is a service.
    #[must_use]
    pub fn service_target(&self) -> Option<&ServiceId> {
        match &self.kind {
            DependencyKind::Service(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&Instance> {
        match &self.kind {
            DependencyKind::Default(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            DependencyKind::Service(id) => format!("service({id})"),
            DependencyKind::Default(_) => "default".to_string(),
            DependencyKind::Primitive => "primitive".to_string(),
        };
        f.debug_struct("Dependency")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

/// Constructor arguments resolved by the container, keyed by parameter name.
pub struct ResolvedDependencies {
    owner: ServiceId,
    values: Vec<(String, Instance)>,
}

impl ResolvedDependencies {
    pub(crate) fn new(owner: ServiceId, values: Vec<(String, Instance)>) -> Self {
        Self { owner, values }
    }

    /// Removes the named argument and downcasts it to `T`.
    pub fn take<T: Send + Sync + 'static>(&mut self, name: &str) -> ContainerResult<Arc<T>> {
        let position = self
            .values
            .iter()
            .position(|(param, _)| param == name)
            .ok_or_else(|| ContainerError::UnresolvableParameter {
                parameter: name.to_string(),
                service: self.owner.clone(),
            })?;
        let (_, value) = self.values.remove(position);
        value
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                service: self.owner.clone(),
                expected: type_name::<T>(),
            })
    }

    /// Removes the named argument and returns a clone of the value.
    pub fn value<T: Clone + Send + Sync + 'static>(&mut self, name: &str) -> ContainerResult<T> {
        self.take::<T>(name).map(|value| (*value).clone())
    }

    /// Returns the number of arguments not yet taken.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when every argument has been taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Registered constructor metadata for one identifier.
#[derive(Clone)]
pub(crate) struct Descriptor {
    pub(crate) dependencies: Vec<Dependency>,
    pub(crate) constructor: Option<Constructor>,
}

impl Descriptor {
    pub(crate) fn of<T: Injectable>() -> Self {
        Self {
            dependencies: T::dependencies(),
            constructor: Some(Arc::new(|deps| {
                T::construct(deps).map(|value| Arc::new(value) as Instance)
            })),
        }
    }

    pub(crate) fn abstract_only() -> Self {
        Self {
            dependencies: Vec::new(),
            constructor: None,
        }
    }

    pub(crate) const fn is_instantiable(&self) -> bool {
        self.constructor.is_some()
    }
}
