use std::sync::Arc;

use config::Config;
use database::Datastore;
use user::UserService;

pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod user;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub config: Config,
}

impl AppState {
    pub fn users(&self) -> UserService<'_> {
        UserService::new(self.store.as_ref(), &self.config)
    }
}
