use sqlx::PgPool;

use config::Config;
use mail::Mailer;

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod mail;
pub mod middleware;
pub mod result;
pub mod routes;
pub mod utils;
pub mod verification;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub mailer: Mailer,
}
