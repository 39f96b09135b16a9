use std::sync::Arc;

use config::Config;
use email::EmailService;
use redis::Client as RedisClient;
use sqlx::PgPool;

pub mod cache;
pub mod config;
pub mod email;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub redis: Arc<RedisClient>,
    pub email: Arc<EmailService>,
}
