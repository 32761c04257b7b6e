pub mod api;
pub mod auth;
pub mod config;
pub mod costing;
pub mod db;
pub mod stock;

pub use db::DbPool;

use auth::token::TokenService;
use config::Config;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let tokens = TokenService::new(&config.auth.jwt_secret);
        Self { config, db, tokens }
    }
}
