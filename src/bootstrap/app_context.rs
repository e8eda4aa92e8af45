use std::sync::Arc;

use crate::application::ports::credential_hasher::CredentialHasher;
use crate::application::ports::store::Store;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn Store>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { store, hasher }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn store(&self) -> Arc<dyn Store> {
        self.services.store.clone()
    }

    pub fn hasher(&self) -> Arc<dyn CredentialHasher> {
        self.services.hasher.clone()
    }
}
