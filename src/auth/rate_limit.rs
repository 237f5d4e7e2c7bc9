use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::AppState;

/// Fixed-window login throttle, keyed by client IP.
///
/// State is per process; running several replicas multiplies the budget.
#[derive(Clone)]
pub struct LoginThrottle {
    windows: Arc<Mutex<HashMap<String, Window>>>,
    max_attempts: u32,
    window: Duration,
}

struct Window {
    attempts: u32,
    started: Instant,
}

impl LoginThrottle {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_attempts,
            window,
        }
    }

    /// Count an attempt. `Ok(remaining)` while under budget, otherwise
    /// `Err(retry_after)`.
    pub async fn check(&self, key: &str) -> Result<u32, Duration> {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Result<u32, Duration> {
        let mut windows = self.windows.lock().await;
        let entry = windows.entry(key.to_string()).or_insert(Window {
            attempts: 0,
            started: now,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.attempts = 0;
            entry.started = now;
        }

        if entry.attempts >= self.max_attempts {
            return Err(self.window.saturating_sub(now.duration_since(entry.started)));
        }

        entry.attempts += 1;
        Ok(self.max_attempts - entry.attempts)
    }

    /// Drop windows that have expired.
    pub async fn prune(&self) -> usize {
        self.prune_at(Instant::now()).await
    }

    async fn prune_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, w| now.duration_since(w.started) < self.window);
        before - windows.len()
    }

    /// Prune on a fixed interval for the lifetime of the process.
    pub fn spawn_pruner(&self) -> tokio::task::JoinHandle<()> {
        let throttle = self.clone();
        let period = self.window.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let removed = throttle.prune().await;
                if removed > 0 {
                    tracing::debug!(removed, "Pruned expired login throttle windows");
                }
            }
        })
    }
}

pub async fn throttle_login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = addr.ip().to_string();

    match state.login_throttle.check(&ip).await {
        Ok(remaining) => {
            tracing::debug!(ip = %ip, remaining, "Login throttle check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                ip = %ip,
                retry_after_secs = retry_after.as_secs(),
                "Login attempts exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}
