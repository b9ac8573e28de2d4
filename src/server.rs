//! HTTP front end.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/interaction?email=&phone=` | Record the signal, then render its identity |
//! | `GET`  | `/seeDetails?email=&phone=` | Render rows matching both email and phone |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Successful lookups return an HTML fragment.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "either email or phone number must be provided" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `conflict` (409),
//! `internal` (500).

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use contact_link_core::error::ContactError;
use contact_link_core::service::IdentityService;
use contact_link_core::store::ContactStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    service: Arc<IdentityService>,
}

/// Starts the HTTP server on `[server].bind` backed by the configured SQLite
/// database. Runs until the process is terminated.
///
/// The schema must exist (`clink init`).
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let store: Arc<dyn ContactStore> = Arc::new(SqliteStore::new(pool));
    let service = Arc::new(IdentityService::new(store, config.resolver.policy));

    let listener = TcpListener::bind(&config.server.bind).await?;
    serve(listener, service).await
}

/// Serve on an already-bound listener. Tests bind port 0 and pass the
/// listener in.
pub async fn serve(listener: TcpListener, service: Arc<IdentityService>) -> anyhow::Result<()> {
    tracing::info!(
        addr = %listener.local_addr()?,
        policy = ?service.resolver().policy(),
        "contact server listening"
    );
    axum::serve(listener, router(service)).await?;
    Ok(())
}

pub fn router(service: Arc<IdentityService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/interaction", get(handle_interaction))
        .route("/seeDetails", get(handle_see_details))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { service })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        let (status, code) = match &err {
            ContactError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ContactError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            ContactError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ContactError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Contact routes ============

/// Query string shared by both contact routes. Empty values count as absent.
#[derive(Debug, Deserialize)]
struct ContactParams {
    email: Option<String>,
    phone: Option<String>,
}

/// Handler for `GET /interaction`.
///
/// Appends a contact row (primary or linked secondary), then renders every
/// row sharing the email or phone. `404` here means the row just written
/// could not be read back.
async fn handle_interaction(
    State(state): State<AppState>,
    Query(params): Query<ContactParams>,
) -> Result<Html<String>, AppError> {
    let (_, view) = state
        .service
        .interact(params.email.as_deref(), params.phone.as_deref())
        .await?;
    Ok(Html(view.render_html("Contact Information")))
}

/// Handler for `GET /seeDetails`. Read-only; both parameters required.
async fn handle_see_details(
    State(state): State<AppState>,
    Query(params): Query<ContactParams>,
) -> Result<Html<String>, AppError> {
    let view = state
        .service
        .details(params.email.as_deref(), params.phone.as_deref())
        .await?;
    let heading = format!(
        "Contact Details for Email: {}",
        params.email.as_deref().unwrap_or_default()
    );
    Ok(Html(view.render_html(&heading)))
}
