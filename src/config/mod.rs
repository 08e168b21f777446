use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::powerbi::{
    Credentials, Endpoints, ReportDescriptor, DEFAULT_API_BASE_URL, DEFAULT_AUTHORITY_HOST,
    POWERBI_SCOPE,
};

/// Complete service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub powerbi: PowerBiConfig,
    #[serde(default)]
    pub report: ReportDescriptor,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Azure AD application and Power BI endpoint configuration
#[derive(Clone, Deserialize)]
pub struct PowerBiConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default = "default_authority_host")]
    pub authority_host: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Per-request timeout for identity provider and API calls (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_authority_host() -> String {
    DEFAULT_AUTHORITY_HOST.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_scope() -> String {
    POWERBI_SCOPE.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for PowerBiConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            tenant_id: String::new(),
            authority_host: default_authority_host(),
            api_base_url: default_api_base_url(),
            scope: default_scope(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl fmt::Debug for PowerBiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PowerBiConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("authority_host", &self.authority_host)
            .field("api_base_url", &self.api_base_url)
            .field("scope", &self.scope)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl PowerBiConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            tenant_id: self.tenant_id.clone(),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            authority_host: self.authority_host.clone(),
            api_base_url: self.api_base_url.clone(),
            scope: self.scope.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl AppConfig {
    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// Unparseable numeric values are ignored and the previous value kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CALIDAD_AGUA_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("CALIDAD_AGUA_PORT") {
            match v.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(e) => tracing::warn!(
                    value = %v,
                    error = %e,
                    "Ignoring invalid CALIDAD_AGUA_PORT"
                ),
            }
        }
        if let Some(v) = lookup("POWERBI_CLIENT_ID") {
            self.powerbi.client_id = v;
        }
        if let Some(v) = lookup("POWERBI_CLIENT_SECRET") {
            self.powerbi.client_secret = v;
        }
        if let Some(v) = lookup("POWERBI_TENANT_ID") {
            self.powerbi.tenant_id = v;
        }
        if let Some(v) = lookup("POWERBI_TIMEOUT_SECONDS") {
            match v.parse::<u64>() {
                Ok(secs) => self.powerbi.timeout_seconds = secs,
                Err(e) => tracing::warn!(
                    value = %v,
                    error = %e,
                    "Ignoring invalid POWERBI_TIMEOUT_SECONDS"
                ),
            }
        }
        if let Some(v) = lookup("POWERBI_GROUP_ID") {
            self.report.group_id = v;
        }
        if let Some(v) = lookup("POWERBI_REPORT_ID") {
            self.report.report_id = v;
        }
        if let Some(v) = lookup("POWERBI_EMBED_URL") {
            self.report.embed_url = v;
        }
    }

    /// Apply overrides from environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Reject configurations the service cannot run with.
    ///
    /// `embed_url` may be empty; it is then resolved from report metadata.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("powerbi.client_id / POWERBI_CLIENT_ID", &self.powerbi.client_id),
            ("powerbi.client_secret / POWERBI_CLIENT_SECRET", &self.powerbi.client_secret),
            ("powerbi.tenant_id / POWERBI_TENANT_ID", &self.powerbi.tenant_id),
            ("report.group_id / POWERBI_GROUP_ID", &self.report.group_id),
            ("report.report_id / POWERBI_REPORT_ID", &self.report.report_id),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            bail!("Missing required configuration: {}", missing.join(", "));
        }

        if self.powerbi.timeout_seconds == 0 {
            bail!("powerbi.timeout_seconds must be greater than zero");
        }

        Ok(())
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Load the TOML file if it exists (defaults otherwise), then apply
/// environment overrides and validate.
pub fn load(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let mut config = if path.exists() {
        tracing::info!(path = %path.display(), "Loading configuration file");
        load_config(path)?
    } else {
        tracing::info!(path = %path.display(), "Config file not found, using defaults");
        AppConfig::default()
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn complete_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.powerbi.client_id = "client".to_string();
        config.powerbi.client_secret = "secret".to_string();
        config.powerbi.tenant_id = "tenant".to_string();
        config.report.group_id = "group".to_string();
        config.report.report_id = "report".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.powerbi.authority_host, "https://login.microsoftonline.com");
        assert_eq!(config.powerbi.api_base_url, "https://api.powerbi.com/v1.0/myorg");
        assert_eq!(
            config.powerbi.scope,
            "https://analysis.windows.net/powerbi/api/.default"
        );
        assert_eq!(config.powerbi.timeout(), Duration::from_secs(30));
        assert!(config.report.embed_url.is_empty());
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [powerbi]
            client_id = "app-id"
            client_secret = "app-secret"
            tenant_id = "tenant-id"
            timeout_seconds = 10

            [report]
            group_id = "group-id"
            report_id = "report-id"
            embed_url = "https://app.powerbi.com/reportEmbed?reportId=report-id"
        "#;

        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.powerbi.client_id, "app-id");
        assert_eq!(config.powerbi.timeout_seconds, 10);
        assert_eq!(config.powerbi.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.report.group_id, "group-id");
        assert_eq!(
            config.report.embed_url,
            "https://app.powerbi.com/reportEmbed?reportId=report-id"
        );
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [server]
            port = 3000
        "#;

        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0"); // Default
        assert_eq!(config.powerbi.timeout_seconds, 30); // Default
        assert!(config.report.report_id.is_empty());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = complete_config();
        let env: HashMap<&str, &str> = HashMap::from([
            ("CALIDAD_AGUA_PORT", "9000"),
            ("POWERBI_CLIENT_SECRET", "rotated"),
            ("POWERBI_REPORT_ID", "other-report"),
            ("POWERBI_EMBED_URL", "https://app.powerbi.com/reportEmbed?reportId=other-report"),
        ]);

        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.powerbi.client_secret, "rotated");
        assert_eq!(config.powerbi.client_id, "client"); // Untouched
        assert_eq!(config.report.report_id, "other-report");
        assert!(config.report.embed_url.ends_with("other-report"));
    }

    #[test]
    fn test_invalid_numeric_override_is_ignored() {
        let mut config = complete_config();
        let env: HashMap<&str, &str> = HashMap::from([
            ("CALIDAD_AGUA_PORT", "not-a-port"),
            ("POWERBI_TIMEOUT_SECONDS", "-1"),
        ]);

        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.powerbi.timeout_seconds, 30);
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(complete_config().validate().is_ok());
    }

    #[test]
    fn test_validate_lists_missing_values() {
        let mut config = complete_config();
        config.powerbi.client_secret = String::new();
        config.report.group_id = "   ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("POWERBI_CLIENT_SECRET"));
        assert!(err.contains("POWERBI_GROUP_ID"));
        assert!(!err.contains("POWERBI_CLIENT_ID"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = complete_config();
        config.powerbi.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [powerbi]
            client_id = "file-client"
            tenant_id = "file-tenant"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.powerbi.client_id, "file-client");
        assert_eq!(config.powerbi.tenant_id, "file-tenant");
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"five thousand\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_debug_redacts_client_secret() {
        let config = complete_config();
        let debug = format!("{:?}", config);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("\"secret\""));
    }
}
