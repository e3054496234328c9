//! Modules and service providers.
//!
//! A [`Module`] bundles controllers, providers and middleware so a feature
//! can be added to an application in one call. A [`ServiceProvider`]
//! registers services into the container and gets a chance to resolve
//! them once everything is registered.

use std::any::type_name;
use std::collections::HashSet;

use hyperdrive_core::di::{Container, ContainerResult, ServiceId};
use hyperdrive_middleware::MiddlewareRef;

use crate::controller::ControllerRegistration;
use crate::error::BuildError;

/// A bundle of controllers, providers and middleware.
///
/// Registering the same module twice has no effect; modules are told apart
/// by [`Module::name`].
///
/// # Example
///
/// ```
/// use hyperdrive::prelude::*;
///
/// struct BillingModule;
///
/// impl Module for BillingModule {
///     fn register(&self, container: &mut Container) {
///         container.instance("billing.currency", std::sync::Arc::new("EUR".to_string()));
///     }
/// }
///
/// let app = Application::builder(HyperdriveConfig::default())
///     .module(BillingModule)
///     .module(BillingModule)
///     .build()
///     .unwrap();
/// assert_eq!(app.modules().len(), 1);
/// ```
pub trait Module: Send + Sync + 'static {
    /// Identifies the module. Defaults to its type name.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Controllers whose routes the module contributes.
    fn controllers(&self) -> Vec<ControllerRegistration> {
        Vec::new()
    }

    /// Service providers the module contributes.
    fn providers(&self) -> Vec<Box<dyn ServiceProvider>> {
        Vec::new()
    }

    /// Global middleware the module contributes, appended in order.
    fn middleware(&self) -> Vec<MiddlewareRef> {
        Vec::new()
    }

    /// Registers services. Called once, when the module is added.
    fn register(&self, _container: &mut Container) {}

    /// Called once at build, after every provider has booted.
    fn boot(&self, _container: &Container) -> ContainerResult<()> {
        Ok(())
    }
}

/// Registers services into the container.
///
/// Eager providers register as soon as they are added. Deferred providers
/// register at build, and only if at least one identifier they
/// [`provide`](ServiceProvider::provides) is still unbound; otherwise they
/// are skipped entirely.
pub trait ServiceProvider: Send + Sync + 'static {
    /// Identifies the provider. Defaults to its type name.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Registers bindings.
    fn register(&self, container: &mut Container);

    /// Called once at build, after every provider has registered.
    fn boot(&self, _container: &Container) -> ContainerResult<()> {
        Ok(())
    }

    /// Whether registration waits until build.
    fn is_deferred(&self) -> bool {
        false
    }

    /// The identifiers a deferred provider binds.
    fn provides(&self) -> Vec<ServiceId> {
        Vec::new()
    }
}

/// Tracks providers through registration and boot.
#[derive(Default)]
pub(crate) struct ProviderRegistry {
    seen: HashSet<&'static str>,
    registered: Vec<Box<dyn ServiceProvider>>,
    deferred: Vec<Box<dyn ServiceProvider>>,
}

impl ProviderRegistry {
    pub(crate) fn add(&mut self, provider: Box<dyn ServiceProvider>, container: &mut Container) {
        if !self.seen.insert(provider.name()) {
            tracing::debug!(provider = provider.name(), "provider already registered");
            return;
        }

        if provider.is_deferred() {
            tracing::debug!(provider = provider.name(), "deferred provider");
            self.deferred.push(provider);
        } else {
            tracing::debug!(provider = provider.name(), "registering provider");
            provider.register(container);
            self.registered.push(provider);
        }
    }

    /// Registers whichever deferred providers are still needed, then boots
    /// every registered provider in order. Returns the booted names.
    pub(crate) fn boot(&mut self, container: &mut Container) -> Result<Vec<&'static str>, BuildError> {
        for provider in std::mem::take(&mut self.deferred) {
            if provider.provides().iter().any(|id| !container.bound(id)) {
                tracing::debug!(provider = provider.name(), "loading deferred provider");
                provider.register(container);
                self.registered.push(provider);
            } else {
                tracing::debug!(provider = provider.name(), "skipping deferred provider");
            }
        }

        let mut booted = Vec::with_capacity(self.registered.len());
        for provider in &self.registered {
            provider.boot(container).map_err(|source| BuildError::Boot {
                name: provider.name().to_string(),
                source,
            })?;
            booted.push(provider.name());
        }
        Ok(booted)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.registered.len() + self.deferred.len()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("registered", &self.registered.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("deferred", &self.deferred.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}
