use std::sync::Arc;
use std::time::Duration;

pub mod auth;
pub mod calendar;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;

use auth::rate_limit::LoginThrottle;
use config::Config;
use db::FullRepository;

pub use router::create_router;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn FullRepository>,
    pub config: Arc<Config>,
    pub login_throttle: LoginThrottle,
}

impl AppState {
    pub fn new(repo: Arc<dyn FullRepository>, config: Arc<Config>) -> Self {
        let login_throttle = LoginThrottle::new(
            config.login_rate_limit_max,
            Duration::from_secs(config.login_rate_limit_window_secs),
        );
        Self {
            repo,
            config,
            login_throttle,
        }
    }
}
