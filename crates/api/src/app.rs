use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use domain::services::{RideService, RideStore};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, security_headers_middleware, trace_id};
use crate::routes::{health, rides};

#[derive(Clone)]
pub struct AppState {
    pub rides: Arc<RideService>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Development default: any origin
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Builds the application router over the given ride store.
pub fn create_app(config: Config, store: Arc<dyn RideStore>) -> Router {
    let service = RideService::new(store, config.rides.service_options());

    let state = AppState {
        rides: Arc::new(service),
    };

    let ride_routes = Router::new()
        .route("/api/rides", get(rides::list_rides))
        .route("/api/rides/add", post(rides::create_ride))
        .route("/api/rides/find", post(rides::find_rides))
        .route("/api/rides/my/:creator_id", get(rides::list_rides_by_creator))
        .route(
            "/api/rides/:ride_id",
            get(rides::get_ride).delete(rides::delete_ride),
        )
        .route("/api/rides/:ride_id/request", post(rides::request_join))
        .route(
            "/api/rides/:ride_id/accept/:request_index",
            patch(rides::accept_join_request),
        )
        .route(
            "/api/rides/:ride_id/reject/:request_index",
            patch(rides::reject_join_request),
        )
        .route(
            "/api/rides/:ride_id/requests/:request_id/accept",
            patch(rides::accept_join_request_by_id),
        )
        .route(
            "/api/rides/:ride_id/requests/:request_id/reject",
            patch(rides::reject_join_request_by_id),
        );

    let public_routes = Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(ride_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config))
        .with_state(state)
}
