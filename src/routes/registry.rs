//! Module loading: turning a discovered route file into a [`RouteModule`]

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::discovery::RouteFile;
use super::module::RouteModule;
use crate::error::{Error, Result};

/// Imports the module behind a route file
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn import(&self, file: &RouteFile) -> Result<RouteModule>;
}

type ModuleFactory = Arc<dyn Fn() -> Result<RouteModule> + Send + Sync>;

/// Route modules compiled into the binary, keyed by module id (`user/[id]`)
///
/// The files on disk decide which routes are mounted; the registry supplies
/// their handlers. A file without a registered module fails to import.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> RouteModule + Send + Sync + 'static,
    {
        self.register_fallible(id, move || Ok(factory()))
    }

    /// Register a module whose construction can fail at import time
    pub fn register_fallible<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Result<RouteModule> + Send + Sync + 'static,
    {
        self.modules.insert(id.into(), Arc::new(factory));
        self
    }

    pub fn with<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> RouteModule + Send + Sync + 'static,
    {
        self.register(id, factory);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[async_trait]
impl ModuleLoader for ModuleRegistry {
    async fn import(&self, file: &RouteFile) -> Result<RouteModule> {
        let factory = self
            .modules
            .get(&file.module_id)
            .ok_or_else(|| Error::ModuleNotFound(file.module_id.clone()))?;

        factory().map_err(|e| match e {
            Error::Import { .. } => e,
            other => Error::Import {
                id: file.module_id.clone(),
                reason: other.to_string(),
            },
        })
    }
}
