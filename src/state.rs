use std::sync::Arc;

use crate::auth::AdminSecret;
use crate::service::CatalogService;
use crate::storage::CatalogStore;

#[derive(Clone)]
pub struct AppState {
    pub service: CatalogService,
    pub admin_secret: Arc<AdminSecret>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, admin_secret: &str) -> Self {
        Self {
            service: CatalogService::new(store),
            admin_secret: Arc::new(AdminSecret::new(admin_secret)),
        }
    }
}
