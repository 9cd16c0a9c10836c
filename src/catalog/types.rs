use serde::{Deserialize, Serialize};

/// One catalog entry, in the shape shared by every upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub id: String,
    pub title: String,
    pub poster: String,
    /// One-decimal rating, or empty.
    pub rate: String,
    /// Four-digit year, or empty.
    pub year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub code: u16,
    pub message: String,
    pub list: Vec<NormalizedItem>,
}

impl CatalogResponse {
    pub fn success(list: Vec<NormalizedItem>) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            list,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
