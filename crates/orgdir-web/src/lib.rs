//! Orgdir Web Server
//!
//! Axum-based REST API over the organization directory.

pub mod error;
pub mod routes;
pub mod state;


use axum::{
    routing::{get, put},
    Router,
};
use orgdir_core::DirectoryStore;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Employees
        .route(
            "/employees",
            get(routes::employees::list_employees).post(routes::employees::create_employee),
        )
        .route(
            "/employees/{name}",
            put(routes::employees::update_employee).delete(routes::employees::delete_employee),
        )
        .route(
            "/employees/{name}/subordinates",
            get(routes::employees::list_subordinates),
        )
        // Departments
        .route("/department/{name}", get(routes::departments::get_department))
        .route("/departments", get(routes::departments::list_departments))
        .route(
            "/departments/{name}/employees",
            get(routes::departments::list_department_employees),
        )
        .route("/health", get(routes::health::check))
        .method_not_allowed_fallback(routes::method_not_allowed)
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until Ctrl+C.
pub async fn run_server(store: Arc<dyn DirectoryStore>, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(store);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
