use serde::{Deserialize, Serialize};

/// Body of every error response. `category` is stable and meant for
/// programmatic handling while `message` is for humans.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct APIErrorResponse {
    pub category: String,
    pub message: String,
}
