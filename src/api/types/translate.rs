//! Translation request and response bodies

use serde::{Deserialize, Serialize};

/// `POST /api/translate` body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslateRequest {
    /// Page URL used only to pick prompt rules
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub segments: Vec<String>,
}

/// Translations in the same order and count as the request segments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translations: Vec<String>,
}
