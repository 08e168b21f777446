//! Power BI embedding support.
//!
//! [`PowerBiAuth`] turns long-lived Azure AD application credentials into
//! report embed tokens:
//!
//! ```text
//! get_embed_token ──► get_access_token ──(cache miss)──► Azure AD /oauth2/v2.0/token
//!        │                    │
//!        │              (cache hit: no network)
//!        ▼
//!  POST /groups/{group}/reports/{report}/GenerateToken
//! ```
//!
//! The access token is cached for 55 minutes (Azure AD issues ~60 minute
//! tokens). Embed tokens are never cached.

mod error;
mod exchange;
mod models;
mod provider;
mod token;

pub use error::{ApiError, AuthError, PowerBiError, UNKNOWN_ERROR_DESCRIPTION};
pub use models::{Dataset, EmbedTokenResult, ReportDescriptor, ReportInfo};
pub use provider::PowerBiAuth;
pub use token::{CachedToken, Clock, SystemClock, TokenCache};

use std::fmt;

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_API_BASE_URL: &str = "https://api.powerbi.com/v1.0/myorg";
pub const POWERBI_SCOPE: &str = "https://analysis.windows.net/powerbi/api/.default";

/// How long a freshly fetched access token is served from cache.
pub const ACCESS_TOKEN_CACHE_MINUTES: i64 = 55;

/// Azure AD application credentials. Immutable once constructed.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .finish()
    }
}

/// Remote endpoints used by the provider.
#[derive(Clone, Debug)]
pub struct Endpoints {
    /// Azure AD authority host, without tenant
    pub authority_host: String,
    /// Power BI REST base, up to and including `/myorg`
    pub api_base_url: String,
    /// Scope requested in the client-credentials grant
    pub scope: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            scope: POWERBI_SCOPE.to_string(),
        }
    }
}

impl Endpoints {
    /// `{authority}/{tenant}/oauth2/v2.0/token`
    pub fn token_url(&self, tenant_id: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            urlencoding::encode(tenant_id)
        )
    }

    /// `{api}/groups/{group}/reports/{report}`
    pub fn report_url(&self, group_id: &str, report_id: &str) -> String {
        format!(
            "{}/reports/{}",
            self.group_url(group_id),
            urlencoding::encode(report_id)
        )
    }

    /// `{api}/groups/{group}/datasets`
    pub fn datasets_url(&self, group_id: &str) -> String {
        format!("{}/datasets", self.group_url(group_id))
    }

    fn group_url(&self, group_id: &str) -> String {
        format!(
            "{}/groups/{}",
            self.api_base_url.trim_end_matches('/'),
            urlencoding::encode(group_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_urls() {
        let endpoints = Endpoints::default();

        assert_eq!(
            endpoints.token_url("contoso-tenant"),
            "https://login.microsoftonline.com/contoso-tenant/oauth2/v2.0/token"
        );
        assert_eq!(
            endpoints.report_url("G1", "R1"),
            "https://api.powerbi.com/v1.0/myorg/groups/G1/reports/R1"
        );
        assert_eq!(
            endpoints.datasets_url("G1"),
            "https://api.powerbi.com/v1.0/myorg/groups/G1/datasets"
        );
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let endpoints = Endpoints {
            api_base_url: "http://localhost:1234/".to_string(),
            ..Endpoints::default()
        };

        assert_eq!(
            endpoints.report_url("a/b", "r 1"),
            "http://localhost:1234/groups/a%2Fb/reports/r%201"
        );
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = Credentials {
            client_id: "client".to_string(),
            client_secret: "super-secret".to_string(),
            tenant_id: "tenant".to_string(),
        };

        let debug = format!("{:?}", credentials);
        assert!(debug.contains("client"));
        assert!(!debug.contains("super-secret"));
    }
}
