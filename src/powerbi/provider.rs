use super::error::{ApiError, AuthError, PowerBiError};
use super::exchange::request_client_credentials_token;
use super::models::{Dataset, DatasetList, EmbedTokenResult, GenerateTokenRequest, ReportInfo};
use super::token::{CachedToken, Clock, SystemClock, TokenCache};
use super::{Credentials, Endpoints, ACCESS_TOKEN_CACHE_MINUTES};
use chrono::Duration;
use reqwest::{Client, Response};
use std::sync::Arc;
use tracing::{debug, info, warn};


/// Token provider for Power BI embedding.
///
/// Built once at startup and shared (behind an `Arc`) by every request
/// handler. Holds the only mutable state in the service: the access token
/// cache slot.
pub struct PowerBiAuth {
    credentials: Credentials,
    endpoints: Endpoints,
    http_client: Client,
    cache: TokenCache,
    clock: Arc<dyn Clock>,
}

impl PowerBiAuth {
    /// Create a provider whose outbound requests give up after `timeout`.
    pub fn new(
        credentials: Credentials,
        endpoints: Endpoints,
        timeout: std::time::Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .user_agent(concat!("calidad-agua/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            credentials,
            endpoints,
            http_client,
            cache: TokenCache::new(),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the time source used for cache validity.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current cache slot contents (may be expired).
    pub fn cached_token(&self) -> Option<CachedToken> {
        self.cache.snapshot()
    }

    /// Bearer token for the Power BI API.
    ///
    /// Served from cache while `now < expiry`. Otherwise performs a
    /// client-credentials exchange and caches the result for 55 minutes.
    /// On failure the cache is left as it was.
    pub async fn get_access_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cache.valid_token(self.clock.now()) {
            debug!("Using cached Power BI access token");
            return Ok(token);
        }

        debug!(
            tenant_id = %self.credentials.tenant_id,
            "Access token absent or expired, requesting a new one"
        );

        let token_url = self.endpoints.token_url(&self.credentials.tenant_id);
        let access_token = request_client_credentials_token(
            &self.http_client,
            &token_url,
            &self.credentials,
            &self.endpoints.scope,
        )
        .await?;

        let expires_at = self.clock.now() + Duration::minutes(ACCESS_TOKEN_CACHE_MINUTES);
        self.cache.store(CachedToken {
            token: access_token.clone(),
            expires_at,
        });

        info!(
            tenant_id = %self.credentials.tenant_id,
            expires_at = %expires_at,
            "Power BI access token refreshed"
        );

        Ok(access_token)
    }

    /// Generate a view-only embed token (save-as disabled) for a report.
    ///
    /// `datasets`, when given and non-empty, is attached to the request so
    /// the token also covers those datasets.
    pub async fn get_embed_token(
        &self,
        group_id: &str,
        report_id: &str,
        datasets: Option<&[String]>,
    ) -> Result<EmbedTokenResult, PowerBiError> {
        let access_token = self.get_access_token().await?;

        let url = format!(
            "{}/GenerateToken",
            self.endpoints.report_url(group_id, report_id)
        );
        let body = GenerateTokenRequest::view_only(datasets);

        debug!(group_id, report_id, request = ?body, "Generating embed token");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from)?;

        let response = check_response_status(response).await?;
        let embed_token: EmbedTokenResult = response.json().await.map_err(ApiError::from)?;

        info!(
            group_id,
            report_id,
            token_id = %embed_token.token_id,
            expiration = %embed_token.expiration,
            "Embed token generated"
        );

        Ok(embed_token)
    }

    /// Report metadata (name, embed URL, dataset, ...).
    pub async fn get_report_info(
        &self,
        group_id: &str,
        report_id: &str,
    ) -> Result<ReportInfo, PowerBiError> {
        let url = self.endpoints.report_url(group_id, report_id);
        let response = self.authorized_get(&url).await?;
        let info = response.json().await.map_err(ApiError::from)?;
        Ok(info)
    }

    /// Datasets in a workspace. Empty when the response has no `value`.
    pub async fn get_datasets_in_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<Dataset>, PowerBiError> {
        let url = self.endpoints.datasets_url(group_id);
        let response = self.authorized_get(&url).await?;
        let list: DatasetList = response.json().await.map_err(ApiError::from)?;

        debug!(group_id, count = list.value.len(), "Listed datasets");
        Ok(list.value)
    }

    async fn authorized_get(&self, url: &str) -> Result<Response, PowerBiError> {
        let access_token = self.get_access_token().await?;

        debug!("GET {}", url);
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(ApiError::from)?;

        Ok(check_response_status(response).await?)
    }
}

/// Pass success responses through; turn anything else into
/// [`ApiError::Status`] carrying the raw body.
async fn check_response_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await?;
    warn!(status = %status, url = %url, "Power BI API request failed");

    Err(ApiError::Status { status, body })
}
