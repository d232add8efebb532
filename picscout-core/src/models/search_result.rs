use serde::{Deserialize, Serialize};

/// A single image hit returned to the client. Produced per-request,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub url: String,
    pub snippet: String,
    pub thumbnail: String,
    pub context: String,
}
