use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_SOURCE_URL: &str = "https://metropole-europeenne-de-lille.opendatasoft.com/api/explore/v2.1/catalog/datasets/disponibilite-parkings/records";
pub const FETCH_LIMIT: u32 = 100;

pub trait ParkingSource {
    fn fetch(&self) -> Result<Value, FetchError>;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to open-data API failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("open-data API answered with status {status}")]
    Status { status: u16 },
    #[error("failed to decode open-data response as JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Blocking client for the explore v2.1 `records` endpoint.
///
/// Only the first page is requested; no timeout is applied.
#[derive(Debug, Clone)]
pub struct OpenDataClient {
    http: Client,
    url: String,
}

impl OpenDataClient {
    pub fn new(url: &str) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

impl ParkingSource for OpenDataClient {
    fn fetch(&self) -> Result<Value, FetchError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("limit", FETCH_LIMIT)])
            .send()
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().map_err(FetchError::Decode)?;
        let results = payload
            .get("results")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);

        tracing::debug!(url = %self.url, results, "open-data page fetched");

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{FetchError, OpenDataClient, ParkingSource};
    use crate::test_support::run_blocking;

    const RECORDS_PATH: &str = "/api/explore/v2.1/catalog/datasets/disponibilite-parkings/records";

    async fn fetch_from(url: String) -> Result<serde_json::Value, FetchError> {
        run_blocking(move || OpenDataClient::new(&url)?.fetch()).await
    }

    #[tokio::test]
    async fn requests_first_page_with_fixed_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RECORDS_PATH))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 1,
                "results": [{"id": "LIL0001"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let payload = fetch_from(format!("{}{RECORDS_PATH}", mock_server.uri()))
            .await
            .expect("fetch should succeed");

        assert_eq!(payload["results"][0]["id"], "LIL0001");
        let requests = mock_server
            .received_requests()
            .await
            .expect("requests should be recorded");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.query(), Some("limit=100"));
    }

    #[tokio::test]
    async fn fails_on_non_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/records"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = fetch_from(format!("{}/records", mock_server.uri())).await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn fails_on_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/records"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({"error_code": "ServiceUnavailable"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = fetch_from(format!("{}/records", mock_server.uri())).await;

        assert!(matches!(result, Err(FetchError::Status { status: 503 })));
    }

    #[tokio::test]
    async fn fails_when_host_is_unreachable() {
        let result = fetch_from("http://127.0.0.1:9/records".to_string()).await;

        assert!(matches!(result, Err(FetchError::Request(_))));
    }
}
