//! Shared services handed to the schema compiler.
//!
//! [`Services`] bundles what compiled routes need at request time: the
//! [`FactoryRegistry`], an optional [`PrincipalSource`], and a type-keyed map
//! of application services that custom handlers can resolve.
//!
//! ```rust
//! use dynaroute_core::{FactoryRegistry, Services};
//! use std::sync::Arc;
//!
//! struct Mailer {
//!     from: String,
//! }
//!
//! let services = Services::new(FactoryRegistry::new())
//!     .with_service(Arc::new(Mailer { from: "noreply@example.com".into() }));
//!
//! let mailer: Arc<Mailer> = services.resolve().unwrap();
//! assert_eq!(mailer.from, "noreply@example.com");
//! ```

use crate::factory::{FactoryRegistry, PrincipalSource};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Error when a service cannot be resolved.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to resolve {type_name}: service not registered")]
pub struct MissingService {
    /// The type name that could not be resolved.
    pub type_name: &'static str,
}

/// Services shared by every route compiled against them.
pub struct Services {
    factories: FactoryRegistry,
    principals: Option<Arc<dyn PrincipalSource>>,
    extras: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Services {
    /// Creates services around a factory registry.
    #[must_use]
    pub fn new(factories: FactoryRegistry) -> Self {
        Self {
            factories,
            principals: None,
            extras: HashMap::new(),
        }
    }

    /// Sets the principal source used by the principal stage.
    #[must_use]
    pub fn with_principal_source(mut self, source: Arc<dyn PrincipalSource>) -> Self {
        self.principals = Some(source);
        self
    }

    /// Registers an application service, replacing one of the same type.
    #[must_use]
    pub fn with_service<T: Send + Sync + 'static>(mut self, service: Arc<T>) -> Self {
        self.extras.insert(TypeId::of::<T>(), service);
        self
    }

    /// Returns the factory registry.
    #[must_use]
    pub const fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    /// Returns the principal source, if any.
    #[must_use]
    pub fn principal_source(&self) -> Option<&Arc<dyn PrincipalSource>> {
        self.principals.as_ref()
    }

    /// Resolves an application service.
    #[must_use]
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.extras
            .get(&TypeId::of::<T>())
            .and_then(|s| Arc::clone(s).downcast::<T>().ok())
    }

    /// Resolves an application service or reports which type is missing.
    pub fn resolve_required<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, MissingService> {
        self.resolve().ok_or(MissingService {
            type_name: std::any::type_name::<T>(),
        })
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(FactoryRegistry::new())
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("factories", &self.factories)
            .field("has_principal_source", &self.principals.is_some())
            .field("service_count", &self.extras.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouteResult;
    use crate::request::Principal;
    use crate::BoxFuture;

    #[derive(Debug)]
    struct Clock(u64);

    struct Echo;

    impl PrincipalSource for Echo {
        fn load<'a>(&'a self, principal: &'a Principal) -> BoxFuture<'a, RouteResult<Principal>> {
            Box::pin(async move { Ok(principal.clone()) })
        }
    }

    #[test]
    fn test_default_services() {
        let services = Services::default();
        assert!(services.principal_source().is_none());
        assert!(services.factories().is_empty());
        assert!(services.resolve::<Clock>().is_none());
    }

    #[test]
    fn test_resolve_service() {
        let services = Services::default().with_service(Arc::new(Clock(7)));
        assert_eq!(services.resolve::<Clock>().unwrap().0, 7);
    }

    #[test]
    fn test_resolve_required_names_missing_type() {
        let err = Services::default().resolve_required::<Clock>().unwrap_err();
        assert!(err.to_string().contains("Clock"));
    }

    #[test]
    fn test_principal_source() {
        let services = Services::default().with_principal_source(Arc::new(Echo));
        assert!(services.principal_source().is_some());
        assert!(format!("{services:?}").contains("has_principal_source: true"));
    }
}
