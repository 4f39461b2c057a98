use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use hyper::Server;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use crate::config::ServerConfig;
use crate::constants::ADMIN_SECRET_HEADER;
use crate::error::{CatalogError, Result};
use crate::handlers;
use crate::state::AppState;

/// CORS for an explicit list of frontend origins, with credentials
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o)
                .map_err(|e| CatalogError::Config(format!("Invalid CORS origin '{o}': {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(ADMIN_SECRET_HEADER)]))
}

/// Create the HTTP router with all catalog routes
pub fn create_server(state: AppState, cors_origins: &[String]) -> Result<Router> {
    let cors = cors_layer(cors_origins)?;

    let public = Router::new()
        .route("/api/ping", get(handlers::ping))
        .route("/api/subjects", get(handlers::list_subjects))
        .route("/api/lectures", get(handlers::list_lectures))
        .route(
            "/api/lectures/:lecture_id/questions",
            get(handlers::list_questions_by_lecture),
        )
        .route("/api/questions/upload", post(handlers::upload_questions));

    let admin = Router::new()
        .route("/api/admin/auth", post(handlers::admin_auth))
        .route("/api/admin/questions", get(handlers::admin_list_questions))
        .route(
            "/api/admin/questions/:question_id",
            delete(handlers::admin_delete_question),
        )
        .route("/api/admin/lectures", post(handlers::admin_create_lecture))
        .route(
            "/api/admin/lectures/:lecture_id",
            delete(handlers::admin_delete_lecture),
        )
        .route("/api/admin/subjects", post(handlers::admin_create_subject))
        .route(
            "/api/admin/subjects/:subject_id",
            delete(handlers::admin_delete_subject),
        );

    Ok(public
        .merge(admin)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(cors)))
}

/// Start the HTTP server and run until Ctrl-C
pub async fn start_server(state: AppState, config: &ServerConfig) -> Result<()> {
    let app = create_server(state, &config.cors_origins)?;

    let addr: SocketAddr = format!("{}:{}", config.bind_addr, config.port)
        .parse()
        .map_err(|e| {
            CatalogError::Config(format!(
                "Invalid bind address {}:{}: {e}",
                config.bind_addr, config.port
            ))
        })?;

    info!("HTTP server running on http://{}", addr);
    info!("Health check: http://{}/api/ping", addr);

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CatalogError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
