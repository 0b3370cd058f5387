//! Shared application state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::DocumentStore;
use crate::erp::ErpClient;
use crate::erp::cookie::CookieManager;

/// Shared state for all request handlers.
///
/// Cheap to clone; everything mutable lives behind the document store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn DocumentStore>,
    erp: ErpClient,
    cookies: CookieManager,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build the state from a loaded configuration and a document store.
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        let erp = ErpClient::new(config.erp.clone());
        let cookies = CookieManager::new(erp.clone(), Arc::clone(&store));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                erp,
                cookies,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.store
    }

    #[must_use]
    pub fn erp(&self) -> &ErpClient {
        &self.inner.erp
    }

    #[must_use]
    pub fn cookies(&self) -> &CookieManager {
        &self.inner.cookies
    }
}
