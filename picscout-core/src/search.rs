//! Image search gateway — outbound client for the image search API.
//!
//! Wraps a `reqwest::Client` that issues `GET {endpoint}/images/search`
//! with the query, a fixed result count and an offset, authenticated by
//! a subscription-key header. The upstream `value` array is flattened
//! into [`SearchResult`] records.
//!
//! The HTTP status code is deliberately not inspected: the body is
//! parsed as-is, so an upstream error page surfaces as a parse failure
//! rather than a distinct API error.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::SearchConfig;
use crate::models::search_result::SearchResult;

/// Number of results requested from the upstream API per call.
pub const RESULT_COUNT: u32 = 10;

/// Header carrying the API credential.
const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Image search gateway errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("missing search API key")]
    MissingApiKey,

    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected search response body: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// Upstream API structs (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct UpstreamResponse {
    value: Vec<UpstreamImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamImage {
    content_url: String,
    name: String,
    thumbnail_url: String,
    host_page_url: String,
}

impl From<UpstreamImage> for SearchResult {
    fn from(image: UpstreamImage) -> Self {
        Self {
            url: image.content_url,
            snippet: image.name,
            thumbnail: image.thumbnail_url,
            context: image.host_page_url,
        }
    }
}

// ============================================================================
// ImageSearchClient
// ============================================================================

/// Client for the external image search API.
#[derive(Debug, Clone)]
pub struct ImageSearchClient {
    client: Client,
    config: SearchConfig,
}

impl ImageSearchClient {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        if config.api_key.is_empty() {
            return Err(SearchError::MissingApiKey);
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { client, config })
    }

    /// Run one image search against the upstream API.
    pub async fn search(
        &self,
        query: &str,
        offset: u32,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!("{}/images/search", self.config.endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.to_string()),
                ("count", RESULT_COUNT.to_string()),
                ("offset", offset.to_string()),
            ])
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;

        let body = response.text().await?;
        let parsed: UpstreamResponse = serde_json::from_str(&body)?;

        Ok(parsed.value.into_iter().map(SearchResult::from).collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(endpoint: &str) -> SearchConfig {
        SearchConfig {
            endpoint: endpoint.to_string(),
            api_key: "test-api-key".to_string(),
        }
    }

    fn sample_upstream_body() -> serde_json::Value {
        serde_json::json!({
            "value": [{
                "contentUrl": "u",
                "name": "n",
                "thumbnailUrl": "t",
                "hostPageUrl": "c"
            }]
        })
    }

    #[tokio::test]
    async fn test_search_sends_query_count_and_offset() {
        let mock_server = MockServer::start().await;
        let client = ImageSearchClient::new(test_config(&mock_server.uri()))
            .expect("Failed to create client");

        Mock::given(method("GET"))
            .and(path("/images/search"))
            .and(query_param("q", "cats"))
            .and(query_param("count", "10"))
            .and(query_param("offset", "5"))
            .and(header(API_KEY_HEADER, "test-api-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": [] })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let results = client.search("cats", 5).await;

        assert!(results.is_ok(), "Expected Ok, got Err: {:?}", results.err());
        assert!(results.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_maps_upstream_fields() {
        let mock_server = MockServer::start().await;
        let client = ImageSearchClient::new(test_config(&mock_server.uri()))
            .expect("Failed to create client");

        Mock::given(method("GET"))
            .and(path("/images/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_upstream_body()))
            .mount(&mock_server)
            .await;

        let results = client.search("anything", 0).await.unwrap();

        assert_eq!(
            results,
            vec![SearchResult {
                url: "u".to_string(),
                snippet: "n".to_string(),
                thumbnail: "t".to_string(),
                context: "c".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_search_non_json_body_is_parse_error() {
        let mock_server = MockServer::start().await;
        let client = ImageSearchClient::new(test_config(&mock_server.uri()))
            .expect("Failed to create client");

        // The status code is not inspected, so an upstream error page
        // fails at the parse step.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let result = client.search("cats", 0).await;

        match result {
            Err(SearchError::Parse(_)) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_missing_value_field_is_parse_error() {
        let mock_server = MockServer::start().await;
        let client = ImageSearchClient::new(test_config(&mock_server.uri()))
            .expect("Failed to create client");

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "other": [] })),
            )
            .mount(&mock_server)
            .await;

        let result = client.search("cats", 0).await;

        assert!(matches!(result, Err(SearchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_search_transport_error_on_unreachable_host() {
        // Port 1 is never bound; the connection is refused.
        let client = ImageSearchClient::new(test_config("http://127.0.0.1:1"))
            .expect("Failed to create client");

        let result = client.search("cats", 0).await;

        assert!(matches!(result, Err(SearchError::Transport(_))));
    }

    #[test]
    fn test_client_fails_with_missing_api_key() {
        let config = SearchConfig {
            endpoint: "http://localhost".to_string(),
            api_key: String::new(),
        };

        let result = ImageSearchClient::new(config);

        assert!(matches!(result, Err(SearchError::MissingApiKey)));
    }
}
