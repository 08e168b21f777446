//! Browser-facing HTTP surface.
//!
//! | Route                  | Response                                   |
//! |------------------------|--------------------------------------------|
//! | `GET /`                | home page                                  |
//! | `GET /dashboard`       | page embedding the Power BI report         |
//! | `GET /about`           | project page                               |
//! | `GET /api/calidad-agua`| department water quality sample (JSON)     |
//! | `GET /api/embed-token` | fresh embed token for the report (JSON)    |

mod embed;
mod pages;
mod render;
mod water_quality;

pub use embed::EmbedConfig;
pub use water_quality::{
    sample_departments, StaticWaterQualitySource, WaterQualityRecord, WaterQualityResponse,
    WaterQualitySource,
};

use crate::powerbi::{PowerBiAuth, PowerBiError, ReportDescriptor};
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tower_http::cors::{Any, CorsLayer};

/// Shared state for all routes
pub struct AppState {
    pub powerbi: Arc<PowerBiAuth>,
    pub report: ReportDescriptor,
    pub water_quality: Arc<dyn WaterQualitySource>,
    resolved_embed_url: OnceCell<String>,
}

impl AppState {
    /// State backed by the static water quality sample.
    pub fn new(powerbi: Arc<PowerBiAuth>, report: ReportDescriptor) -> Self {
        Self {
            powerbi,
            report,
            water_quality: Arc::new(StaticWaterQualitySource),
            resolved_embed_url: OnceCell::new(),
        }
    }

    pub fn with_water_quality(mut self, source: Arc<dyn WaterQualitySource>) -> Self {
        self.water_quality = source;
        self
    }
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Application error types for JSON endpoints
pub(crate) enum AppError {
    Upstream(PowerBiError),
    Internal(String),
}

impl From<PowerBiError> for AppError {
    fn from(err: PowerBiError) -> Self {
        AppError::Upstream(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Upstream(e) => {
                tracing::error!(error = %e, "Power BI request failed");
                (upstream_status(&e), e.to_string())
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

/// 504 for timeouts, 502 for every other upstream failure.
pub(crate) fn upstream_status(err: &PowerBiError) -> StatusCode {
    if err.is_timeout() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::BAD_GATEWAY
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    let api = Router::new()
        .route("/api/calidad-agua", get(water_quality::calidad_agua))
        .route("/api/embed-token", get(embed::embed_token))
        .layer(cors);

    Router::new()
        .route("/", get(pages::index))
        .route("/dashboard", get(pages::dashboard))
        .route("/about", get(pages::about))
        .merge(api)
        .with_state(Arc::new(state))
}
