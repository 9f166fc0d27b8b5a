//! HTTP API server
//!
//! Wires the REST surface together: registration and login under `/auth`,
//! authenticated task CRUD under `/api/v1/tasks`, and an unauthenticated
//! `/health` endpoint. Handlers reach persistence through the repository traits
//! held in [`AppState`], so the router is the same whether it is backed by
//! SQLite or by in-memory test doubles.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::{future::Future, net::SocketAddr, sync::Arc};
use tracing::info;

use crate::credentials::JwtKeys;
use crate::{auth, tasks};
use taskd_core::repository::{TaskRepository, UserRepository};

/// Shared server state for handlers
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<dyn TaskRepository>,
    pub users: Arc<dyn UserRepository>,
    pub jwt: Arc<JwtKeys>,
}

/// REST API server over a task store and a user store
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Create a new server over the given repositories and signing keys
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        users: Arc<dyn UserRepository>,
        jwt: JwtKeys,
    ) -> Self {
        Self {
            state: AppState {
                tasks,
                users,
                jwt: Arc::new(jwt),
            },
        }
    }

    /// Bind the listen address and serve until the shutdown future resolves
    pub async fn serve<F>(
        self,
        addr: &str,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| format!("Invalid listen address '{addr}': {e}"))?;

        info!("Starting API server on {}", socket_addr);

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }

    /// Create the router with all endpoints
    pub fn router(self) -> Router {
        Router::new()
            .route("/auth/register", post(auth::register))
            .route("/auth/login", post(auth::login))
            .route("/api/v1/tasks", get(tasks::list_tasks).post(tasks::create_task))
            .route(
                "/api/v1/tasks/:id",
                get(tasks::get_task)
                    .put(tasks::update_task)
                    .delete(tasks::delete_task),
            )
            .route("/health", get(health_handler))
            .fallback(not_found_handler)
            .layer(middleware::from_fn(
                crate::request_logger::request_logging_middleware,
            ))
            .with_state(self.state)
    }
}

/// Answers any request that matches no route
async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    tracing::error!(path = %uri.path(), "404 Not Found");
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Resource not found" })),
    )
}

/// Health check endpoint; reports whether the storage backend is reachable
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.tasks.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "healthy" }))),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy" })),
            )
        }
    }
}
