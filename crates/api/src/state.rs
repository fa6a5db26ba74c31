use std::sync::Arc;

use correx_core::content_types::ContentTypeRegistry;
use correx_db::resolver::ContentObjectResolver;

use crate::config::ServerConfig;
use crate::feeds::ChangeFeed;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: correx_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Registered applications and model kinds, fixed at startup.
    pub registry: Arc<ContentTypeRegistry>,
}

impl AppState {
    pub fn new(
        pool: correx_db::DbPool,
        config: ServerConfig,
        registry: Arc<ContentTypeRegistry>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            registry,
        }
    }

    /// Query façade over the shared pool and registry.
    pub fn feed(&self) -> ChangeFeed {
        ChangeFeed::new(self.pool.clone(), Arc::clone(&self.registry))
    }

    /// Polymorphic record loader over the shared registry.
    pub fn resolver(&self) -> ContentObjectResolver {
        ContentObjectResolver::new(Arc::clone(&self.registry))
    }
}
