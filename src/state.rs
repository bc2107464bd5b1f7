// src/state.rs
use std::sync::Arc;

use crate::auth::AuthBackend;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<dyn AuthBackend>,
}

impl AppState {
    pub fn new(config: Config, auth: Arc<dyn AuthBackend>) -> Self {
        Self {
            config: Arc::new(config),
            auth,
        }
    }
}
