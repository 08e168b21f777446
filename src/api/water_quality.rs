//! Water quality sample data endpoint.

use super::{AppError, AppState};
use async_trait::async_trait;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Quality reading for one department.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaterQualityRecord {
    /// Department name
    #[serde(rename = "nombre")]
    pub name: String,

    /// Quality index, 0-100
    #[serde(rename = "calidad")]
    pub score: u8,

    /// Status label ("Excelente", "Buena", "Aceptable", ...)
    #[serde(rename = "estado")]
    pub status: String,
}

impl WaterQualityRecord {
    fn new(name: &str, score: u8, status: &str) -> Self {
        Self {
            name: name.to_string(),
            score,
            status: status.to_string(),
        }
    }
}

/// Body of `GET /api/calidad-agua`
#[derive(Debug, Serialize)]
pub struct WaterQualityResponse {
    #[serde(rename = "departamentos")]
    pub departments: Vec<WaterQualityRecord>,
}

/// Backend for department water quality readings.
#[async_trait]
pub trait WaterQualitySource: Send + Sync {
    async fn departments(&self) -> anyhow::Result<Vec<WaterQualityRecord>>;
}

/// Fixed five-department sample set.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticWaterQualitySource;

#[async_trait]
impl WaterQualitySource for StaticWaterQualitySource {
    async fn departments(&self) -> anyhow::Result<Vec<WaterQualityRecord>> {
        Ok(sample_departments())
    }
}

pub fn sample_departments() -> Vec<WaterQualityRecord> {
    vec![
        WaterQualityRecord::new("Antioquia", 85, "Buena"),
        WaterQualityRecord::new("Cundinamarca", 78, "Aceptable"),
        WaterQualityRecord::new("Valle del Cauca", 82, "Buena"),
        WaterQualityRecord::new("Atlántico", 70, "Aceptable"),
        WaterQualityRecord::new("Santander", 88, "Excelente"),
    ]
}

/// GET /api/calidad-agua
pub(crate) async fn calidad_agua(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WaterQualityResponse>, AppError> {
    let departments = state.water_quality.departments().await.map_err(|e| {
        tracing::error!(error = %e, "Water quality source failed");
        AppError::Internal("Failed to load water quality data".to_string())
    })?;

    tracing::debug!(count = departments.len(), "Serving water quality data");
    Ok(Json(WaterQualityResponse { departments }))
}
