use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    middleware::logging,
    routes::{customers, health, threads, ApiDoc},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Customers
        .route(
            "/clientes",
            post(customers::upsert_customer).get(customers::list_customers),
        )
        .route("/cliente/:celular", get(customers::get_customer))
        // Threads
        .route(
            "/threads",
            post(threads::upsert_thread)
                .get(threads::list_threads_by_phone)
                .delete(threads::delete_thread),
        )
        .route("/threads/all", get(threads::list_all_threads));

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(logging::log_request))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::permissive();
    }

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors
            .origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();

        cors.allow_origin(origins)
    }
}
