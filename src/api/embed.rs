use super::{AppError, AppState};
use crate::powerbi::{EmbedTokenResult, PowerBiError};
use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything the browser viewer needs to embed the configured report.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedConfig {
    pub report_id: String,
    pub embed_url: String,
    #[serde(flatten)]
    pub embed_token: EmbedTokenResult,
}

/// Build the embed configuration for the configured report.
///
/// The embed URL comes from configuration, or from the report metadata
/// (looked up once) when none is configured.
pub(crate) async fn fetch_embed_config(state: &AppState) -> Result<EmbedConfig, PowerBiError> {
    let report = &state.report;

    let embed_url = state
        .resolved_embed_url
        .get_or_try_init(|| async {
            if !report.embed_url.is_empty() {
                return Ok(report.embed_url.clone());
            }
            let info = state
                .powerbi
                .get_report_info(&report.group_id, &report.report_id)
                .await?;
            info!(report = %info.name, "Resolved embed URL from report metadata");
            Ok::<_, PowerBiError>(info.embed_url)
        })
        .await?
        .clone();

    let embed_token = state
        .powerbi
        .get_embed_token(&report.group_id, &report.report_id, None)
        .await?;

    Ok(EmbedConfig {
        report_id: report.report_id.clone(),
        embed_url,
        embed_token,
    })
}

/// GET /api/embed-token
///
/// Fresh embed token for the configured report. Used by the dashboard to
/// renew the viewer's token before it expires.
pub(crate) async fn embed_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EmbedConfig>, AppError> {
    debug!(report_id = %state.report.report_id, "Embed token requested");
    let config = fetch_embed_config(&state).await?;
    Ok(Json(config))
}
