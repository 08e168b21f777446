use super::embed::fetch_embed_config;
use super::render;
use super::{upstream_status, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

const HOME_TITLE: &str = "Calidad de Agua en Colombia";
const DASHBOARD_TITLE: &str = "Dashboard - Calidad de Agua";
const ABOUT_TITLE: &str = "Sobre el Proyecto";

/// GET /
pub(crate) async fn index() -> Html<String> {
    render::page(HOME_TITLE, render::INDEX)
}

/// GET /about
pub(crate) async fn about() -> Html<String> {
    render::page(ABOUT_TITLE, render::ABOUT)
}

/// GET /dashboard
///
/// Embeds the configured report. Token or API failures render an error
/// page (502, or 504 on timeout) instead of failing the request.
pub(crate) async fn dashboard(State(state): State<Arc<AppState>>) -> Response {
    let config = match fetch_embed_config(&state).await {
        Ok(config) => config,
        Err(e) => {
            error!(
                group_id = %state.report.group_id,
                report_id = %state.report.report_id,
                error = %e,
                "Failed to obtain embed token for dashboard"
            );
            let message = if e.is_timeout() {
                "El servicio de Power BI no respondió a tiempo. Intente de nuevo en unos minutos."
            } else {
                "No fue posible cargar el reporte de Power BI. Intente de nuevo más tarde."
            };
            return (upstream_status(&e), render::error_page(DASHBOARD_TITLE, message))
                .into_response();
        }
    };

    match render::dashboard(DASHBOARD_TITLE, &config) {
        Ok(page) => page.into_response(),
        Err(e) => {
            error!(error = %e, "Failed to serialize embed configuration");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                render::error_page(DASHBOARD_TITLE, "Error interno al preparar el reporte."),
            )
                .into_response()
        }
    }
}
