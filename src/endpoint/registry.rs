//! Path to handler registry.

use crate::endpoint::handler::{AppError, Handler};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Registry of handlers keyed by exact request path.
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn Handler>>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a handler for `path`.
    pub async fn register(
        &self,
        path: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) -> Result<(), AppError> {
        let path = normalize(path.into());
        let mut handlers = self.handlers.write().await;

        if handlers.contains_key(&path) {
            return Err(AppError::new(format!(
                "A handler is already registered for '{}'",
                path
            )));
        }

        info!("Registered handler '{}' at {}", handler.name(), path);
        handlers.insert(path, handler);
        Ok(())
    }

    /// Look up the handler for `path`.
    pub async fn get(&self, path: &str) -> Option<Arc<dyn Handler>> {
        let handlers = self.handlers.read().await;
        handlers.get(&normalize(path.to_string())).cloned()
    }

    /// List registered paths with their handler names.
    pub async fn list(&self) -> Vec<(String, String)> {
        let handlers = self.handlers.read().await;
        let mut entries: Vec<_> = handlers
            .iter()
            .map(|(path, handler)| (path.clone(), handler.name().to_string()))
            .collect();
        entries.sort();
        entries
    }

    /// Remove the handler for `path`.
    pub async fn remove(&self, path: &str) -> Result<(), AppError> {
        let path = normalize(path.to_string());
        let mut handlers = self.handlers.write().await;
        handlers
            .remove(&path)
            .ok_or_else(|| AppError::not_found(format!("No handler registered for '{}'", path)))?;

        info!("Removed handler at {}", path);
        Ok(())
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Leading slash added, trailing slash dropped.
fn normalize(path: String) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{}", trimmed)
}
