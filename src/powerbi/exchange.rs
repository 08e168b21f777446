//! OAuth client-credentials exchange against Azure AD.

use super::error::{AuthError, UNKNOWN_ERROR_DESCRIPTION};
use super::Credentials;
use reqwest::Client;
use serde::Deserialize;

/// Token endpoint response.
///
/// Azure AD answers errors with a 4xx status and `error`/`error_description`
/// instead of `access_token`, so every field is optional and the status code
/// is not consulted.
#[derive(Deserialize, Debug, Default)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Request an application access token for `scope`.
///
/// # Returns
/// * `Ok(String)` - The bearer access token
/// * `Err(AuthError::Rejected)` - No token in the response; carries
///   `error_description` or "unknown error"
pub async fn request_client_credentials_token(
    http_client: &Client,
    token_url: &str,
    credentials: &Credentials,
    scope: &str,
) -> Result<String, AuthError> {
    let form_data = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("scope", scope),
    ];

    tracing::debug!(
        client_id = %credentials.client_id,
        "Requesting client-credentials token from {}",
        token_url
    );

    let response = http_client
        .post(token_url)
        .header("Accept", "application/json")
        .form(&form_data)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    let token_response: TokenResponse =
        serde_json::from_str(&body).map_err(AuthError::InvalidResponse)?;

    match token_response.access_token {
        Some(access_token) => {
            tracing::debug!(
                expires_in = ?token_response.expires_in,
                token_type = ?token_response.token_type,
                "Client-credentials exchange successful"
            );
            Ok(access_token)
        }
        None => {
            let description = token_response
                .error_description
                .unwrap_or_else(|| UNKNOWN_ERROR_DESCRIPTION.to_string());
            tracing::warn!(
                status = %status,
                error = ?token_response.error,
                "Identity provider did not return an access token"
            );
            Err(AuthError::Rejected { description })
        }
    }
}
