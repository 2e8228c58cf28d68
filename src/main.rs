use axum::{Router, routing::get};

mod catalog;
mod handlers;
mod infrastructure;
mod models;
mod services;
mod state;

use handlers::*;
use infrastructure::certificate_store::CertificateStore;
use services::{certificate_service, pricing_service};
use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let store = match std::env::var("REDIS_URL") {
        Ok(redis_url) => CertificateStore::connect_redis(&redis_url)
            .await
            .expect("Failed to connect to the Redis certificate store"),
        Err(_) => CertificateStore::in_memory(),
    };

    let app_state = AppState::new(store, catalog::default_pricing_plans());

    certificate_service::seed_demo_certificate(&app_state)
        .await
        .expect("Failed to seed the certificate store");

    spawn_background_tasks(app_state.clone());

    let app = create_router(app_state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listen address");

    tracing::info!("certificate service listening on {bind_addr}");

    axum::serve(listener, app)
        .await
        .expect("Failed to start HTTP server");
}

fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/pricingplans", get(get_pricing_plans))
        .route("/pricingplans/display", get(get_display_plans))
        .route("/pricingplans/recommended", get(get_recommended_plans))
        .route(
            "/certificates",
            get(list_certificates).post(create_certificate),
        )
        .with_state(app_state)
}

fn spawn_background_tasks(app_state: AppState) {
    tokio::spawn(pricing_service::catalog_refresh_task(app_state));

    tracing::info!("background tasks started");
}
