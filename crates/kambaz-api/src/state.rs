use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use kambaz_db::Datastore;

use crate::config::{ApiConfig, Environment};

/// Shared application state. The datastore is injected at construction; route
/// handlers never reach for a global store.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn Datastore>,
    pub cookie_key: Key,
    pub environment: Environment,
    /// bcrypt work factor; lowered in tests.
    pub bcrypt_cost: u32,
}

impl ApiState {
    pub fn new(config: &ApiConfig, store: Arc<dyn Datastore>) -> Self {
        Self {
            store,
            cookie_key: Key::from(config.cookie_secret.as_bytes()),
            environment: config.env.clone(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

impl FromRef<ApiState> for Key {
    fn from_ref(state: &ApiState) -> Self {
        state.cookie_key.clone()
    }
}
