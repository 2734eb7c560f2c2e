use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{contracts, health, invoices, templates};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
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
    };

    // Versioned API routes. Session handling sits in front of this service;
    // requests arriving here are already authenticated.
    let api_routes = Router::new()
        // Contract template routes (v1)
        .route(
            "/api/v1/templates",
            post(templates::create_template).get(templates::list_templates),
        )
        .route(
            "/api/v1/templates/:template_id",
            get(templates::get_template)
                .patch(templates::update_template)
                .delete(templates::deactivate_template),
        )
        .route(
            "/api/v1/templates/:template_id/placeholders",
            get(templates::get_template_placeholders),
        )
        // Contract generation routes (v1)
        .route("/api/v1/contracts/preview", post(contracts::preview_contract))
        .route(
            "/api/v1/contracts",
            post(contracts::generate_contract).get(contracts::list_contracts),
        )
        .route("/api/v1/contracts/:contract_id", get(contracts::get_contract))
        // Invoice routes (v1)
        .route(
            "/api/v1/invoices",
            post(invoices::create_invoice).get(invoices::list_invoices),
        )
        .route("/api/v1/invoices/:invoice_id", get(invoices::get_invoice))
        .route("/api/v1/invoices/:invoice_id/send", post(invoices::send_invoice))
        .route(
            "/api/v1/invoices/:invoice_id/payment",
            post(invoices::record_payment),
        )
        .route(
            "/api/v1/invoices/:invoice_id/cancel",
            post(invoices::cancel_invoice),
        );

    // Public routes (health and metrics)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
