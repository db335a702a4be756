use serde::{Deserialize, Serialize};

/// Query parameters for `GET /api/resolve`.
#[derive(Deserialize)]
pub struct ResolveQuery {
    /// The raw identifier/link to resolve.
    pub url: Option<String>,
}

/// Body of `POST /api/resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub url: Option<String>,
}

/// Query parameters for `GET /api/check`.
#[derive(Deserialize)]
pub struct CheckQuery {
    pub url: Option<String>,
}

/// Response of the provider health probe.
#[derive(Serialize)]
pub struct CheckResponse {
    pub status: u16,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
