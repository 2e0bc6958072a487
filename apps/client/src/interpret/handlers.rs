use axum::Json;
use serde::{Deserialize, Serialize};

use crate::interpret::sources::{format_source, FormattedSource};

#[derive(Debug, Deserialize)]
pub struct FormatSourceRequest {
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct FormatSourceResponse {
    #[serde(flatten)]
    pub formatted: FormattedSource,
    /// Same content flattened to text, for clients without styling.
    pub display: String,
}

/// POST /api/v1/sources/format
pub async fn handle_format_source(
    Json(request): Json<FormatSourceRequest>,
) -> Json<FormatSourceResponse> {
    let formatted = format_source(&request.source);
    Json(FormatSourceResponse {
        display: formatted.to_display_string(),
        formatted,
    })
}
