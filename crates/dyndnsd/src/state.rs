use dyndns_core::UpdateService;
use std::sync::Arc;

use crate::auth::Credentials;

#[derive(Clone)]
pub struct AppState {
    pub service: UpdateService,
    pub credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(service: UpdateService, credentials: Credentials) -> Self {
        Self {
            service,
            credentials: Arc::new(credentials),
        }
    }
}
