use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::{middleware::require_auth, rate_limit::throttle_login};
use crate::config::Config;
use crate::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .layer(middleware::from_fn_with_state(state.clone(), throttle_login));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        // Calendar
        .route("/api/calendar", get(handlers::calendar::get_calendar))
        // Days
        .route(
            "/api/days",
            get(handlers::days::list_days).post(handlers::days::save_day),
        )
        .route(
            "/api/days/:date",
            get(handlers::days::get_day).delete(handlers::days::delete_day),
        )
        // Stats
        .route("/api/stats/month", get(handlers::stats::month_stats))
        .route("/api/stats/year", get(handlers::stats::year_stats))
        .route("/api/stats/lifetime", get(handlers::stats::lifetime_stats))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
