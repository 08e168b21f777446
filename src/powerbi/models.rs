//! Power BI REST API payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Report to embed, as configured by the operator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDescriptor {
    /// Workspace (group) ID
    #[serde(default)]
    pub group_id: String,

    /// Report ID
    #[serde(default)]
    pub report_id: String,

    /// Embed URL. When empty it is resolved from the report metadata.
    #[serde(default)]
    pub embed_url: String,
}

/// Embed token returned by `GenerateToken`. Never cached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedTokenResult {
    pub token: String,
    pub token_id: String,
    /// UTC timestamp exactly as Power BI sent it.
    pub expiration: String,
}

/// Report metadata from `GET /groups/{group}/reports/{report}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInfo {
    pub id: String,
    pub name: String,
    pub embed_url: String,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub dataset_id: Option<String>,
    #[serde(default)]
    pub report_type: Option<String>,
    /// Remaining fields as returned by the API
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Dataset entry from `GET /groups/{group}/datasets`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub configured_by: Option<String>,
    #[serde(default)]
    pub is_refreshable: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `{ "value": [...] }` envelope used by list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct DatasetList {
    #[serde(default)]
    pub value: Vec<Dataset>,
}

/// Body of the `GenerateToken` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateTokenRequest<'a> {
    access_level: &'static str,
    allow_save_as: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    datasets: Option<Vec<DatasetReference<'a>>>,
}

#[derive(Debug, Serialize)]
struct DatasetReference<'a> {
    id: &'a str,
}

impl<'a> GenerateTokenRequest<'a> {
    /// View-only token with save-as disabled. An empty dataset list is
    /// treated the same as no list.
    pub fn view_only(datasets: Option<&'a [String]>) -> Self {
        let datasets = datasets.filter(|ids| !ids.is_empty()).map(|ids| {
            ids.iter()
                .map(|id| DatasetReference { id: id.as_str() })
                .collect()
        });

        Self {
            access_level: "View",
            allow_save_as: false,
            datasets,
        }
    }
}
