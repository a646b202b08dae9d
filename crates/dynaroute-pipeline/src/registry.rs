//! Named handlers, organized in dotted namespaces.
//!
//! Schemas refer to custom behavior by name (`"devices.loadFactory"`). The
//! [`HandlerRegistry`] maps those names to [`RouteHandler`]s. It is filled at
//! startup and only read when routes are compiled.

use crate::step::{handler_fn, RouteHandler, StepResult};
use crate::BindContext;
use dynaroute_core::{BoxFuture, Request, Response};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while registering handlers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The name is empty or has an empty segment.
    #[error("invalid handler name '{name}'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// A handler sits where a namespace is needed, or the reverse.
    #[error("handler name '{name}' conflicts with '{existing}'")]
    Conflict {
        /// The name being registered.
        name: String,
        /// The existing entry it collides with.
        existing: String,
    },
}

enum Entry {
    Handler(Arc<dyn RouteHandler>),
    Namespace(BTreeMap<String, Entry>),
}

/// A tree of handlers addressed by dotted names.
///
/// # Example
///
/// ```
/// use dynaroute_pipeline::{Flow, HandlerRegistry};
///
/// let mut registry = HandlerRegistry::new();
/// registry
///     .register_fn("devices.audit", |_bind, _req, _res| Box::pin(async { Ok(Flow::Proceed) }))
///     .unwrap();
///
/// assert!(registry.resolve(" devices.audit ").is_some());
/// assert!(registry.resolve("devices").is_none());
/// assert!(registry.resolve("devices.missing").is_none());
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    root: BTreeMap<String, Entry>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under a dotted name.
    ///
    /// Registering an existing handler name replaces it.
    pub fn register(
        &mut self,
        name: &str,
        handler: Arc<dyn RouteHandler>,
    ) -> Result<(), RegistryError> {
        let segments = split(name).ok_or_else(|| RegistryError::InvalidName {
            name: name.to_string(),
        })?;
        let Some((last, parents)) = segments.split_last() else {
            return Err(RegistryError::InvalidName {
                name: name.to_string(),
            });
        };

        let mut level = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            let entry = level
                .entry((*segment).to_string())
                .or_insert_with(|| Entry::Namespace(BTreeMap::new()));
            level = match entry {
                Entry::Namespace(children) => children,
                Entry::Handler(_) => {
                    return Err(RegistryError::Conflict {
                        name: name.to_string(),
                        existing: segments[..=depth].join("."),
                    });
                }
            };
        }

        if let Some(Entry::Namespace(_)) = level.get(*last) {
            return Err(RegistryError::Conflict {
                name: name.to_string(),
                existing: format!("{} (namespace)", segments.join(".")),
            });
        }
        level.insert((*last).to_string(), Entry::Handler(handler));
        Ok(())
    }

    /// Registers a closure handler under a dotted name.
    pub fn register_fn<F>(&mut self, name: &str, func: F) -> Result<(), RegistryError>
    where
        F: for<'a> Fn(&'a BindContext, &'a mut Request, &'a mut Response) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, handler_fn(func))
    }

    /// Registers a handler, consuming and returning the registry.
    pub fn with(mut self, name: &str, handler: Arc<dyn RouteHandler>) -> Result<Self, RegistryError> {
        self.register(name, handler)?;
        Ok(self)
    }

    /// Resolves a dotted name to a handler.
    ///
    /// The name is trimmed first. Empty names, unknown segments and names
    /// that end on a namespace resolve to `None`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn RouteHandler>> {
        let segments = split(name)?;
        let (last, parents) = segments.split_last()?;

        let mut level = &self.root;
        for segment in parents {
            match level.get(*segment)? {
                Entry::Namespace(children) => level = children,
                Entry::Handler(_) => return None,
            }
        }

        match level.get(*last)? {
            Entry::Handler(handler) => Some(Arc::clone(handler)),
            Entry::Namespace(_) => None,
        }
    }

    /// Returns true if `name` resolves to a handler.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Returns every registered handler name, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_names(&self.root, "", &mut names);
        names
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names().len()
    }

    /// Returns true if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

fn split(name: &str) -> Option<Vec<&str>> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let segments: Vec<&str> = name.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments)
}

fn collect_names(level: &BTreeMap<String, Entry>, prefix: &str, out: &mut Vec<String>) {
    for (key, entry) in level {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match entry {
            Entry::Handler(_) => out.push(name),
            Entry::Namespace(children) => collect_names(children, &name, out),
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}
