//! REST API for LedgerChain
//!
//! Exposes append, list, lookup and integrity checks over HTTP. Every ledger
//! call runs on tokio's blocking pool because the store does synchronous file
//! I/O.

use axum::{
    extract::{Path, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::blockchain::{Block, Ledger, Verification};
use crate::error::ChainError;

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub ledger: Arc<Ledger>,
}

impl ApiState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(ledger),
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Ledger(ChainError),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Ledger(e) => {
                let status = match &e {
                    ChainError::NotFound(_) => StatusCode::NOT_FOUND,
                    ChainError::IntegrityError(_) => StatusCode::CONFLICT,
                    ChainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(status = %status.as_u16(), error = %message, "api.error");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError::Ledger(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AppendRequest {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct FindRequest {
    pub id: String,
}

#[derive(Serialize)]
pub struct IntegrityResponse {
    pub valid: bool,
    pub message: String,
    #[serde(flatten)]
    pub verification: Verification,
}

impl From<Verification> for IntegrityResponse {
    fn from(verification: Verification) -> Self {
        let message = match &verification {
            Verification::Intact { length } => {
                format!("Chain is intact: {} block(s), all hash links match", length)
            }
            Verification::Broken(link) => format!("Chain integrity compromised: {}", link),
        };
        Self {
            valid: verification.is_intact(),
            message,
            verification,
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub blocks: usize,
}

// ============================================================================
// Utility Functions
// ============================================================================

async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("ledger task failed: {}", e)))?
        .map_err(ApiError::from)
}

// ============================================================================
// Middleware
// ============================================================================

/// Logs method, path, status and duration of every request.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints (for testing)
pub fn build_api_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    Router::new()
        .route("/blockchain", get(list_blocks).post(append_block))
        .route("/blockchain/find", axum::routing::post(find_block))
        .route("/blockchain/:id", get(get_block))
        .route("/integrity", get(check_integrity))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
        .layer(cors)
}

pub async fn run_api_server(
    state: ApiState,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_api_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "API server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn list_blocks(State(state): State<ApiState>) -> Result<Json<Vec<Block>>, ApiError> {
    let ledger = state.ledger.clone();
    let chain = run_blocking(move || Ok(ledger.load())).await?;
    Ok(Json(chain.blocks))
}

async fn append_block(
    State(state): State<ApiState>,
    Json(req): Json<AppendRequest>,
) -> Result<Json<Block>, ApiError> {
    let ledger = state.ledger.clone();
    let block = run_blocking(move || ledger.append(&req.name, req.amount)).await?;
    Ok(Json(block))
}

async fn find_block(
    State(state): State<ApiState>,
    Json(req): Json<FindRequest>,
) -> Result<Json<Block>, ApiError> {
    let ledger = state.ledger.clone();
    let block = run_blocking(move || ledger.find(&req.id)).await?;
    Ok(Json(block))
}

async fn get_block(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Block>, ApiError> {
    let ledger = state.ledger.clone();
    let block = run_blocking(move || ledger.find(&id)).await?;
    Ok(Json(block))
}

async fn check_integrity(
    State(state): State<ApiState>,
) -> Result<Json<IntegrityResponse>, ApiError> {
    let ledger = state.ledger.clone();
    let verification = run_blocking(move || ledger.verify()).await?;
    Ok(Json(verification.into()))
}

async fn health_check(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let ledger = state.ledger.clone();
    let blocks = run_blocking(move || Ok(ledger.len())).await?;
    Ok(Json(HealthResponse {
        status: "ok",
        blocks,
    }))
}
