//! Integration tests for ReqwestHttpClient using wiremock.

use std::time::Duration;

use glimmer_core::{FetchError, HttpClient, HttpRequest, ReqwestHttpClient};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(server: &MockServer, route: &str) -> HttpRequest {
    let url = Url::parse(&format!("{}{}", server.uri(), route)).expect("mock url");
    HttpRequest::get(url, Duration::from_secs(2))
}

#[tokio::test]
async fn test_get_returns_body_and_sends_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/merge_requests"))
        .and(query_param("state", "opened"))
        .and(header("PRIVATE-TOKEN", "glpat-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ReqwestHttpClient::new().expect("client");
    let req = request(&mock_server, "/api/v4/projects/1/merge_requests?state=opened")
        .header("PRIVATE-TOKEN", "glpat-test");
    let body = client.get(&req).await.expect("body");

    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key"
        })))
        .mount(&mock_server)
        .await;

    let client = ReqwestHttpClient::new().expect("client");
    let result = client.get(&request(&mock_server, "/data/2.5/weather")).await;

    match result {
        Err(FetchError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"), "body: {}", body);
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let client = ReqwestHttpClient::new().expect("client");
    let url = Url::parse(&format!("{}/slow", mock_server.uri())).expect("mock url");
    let result = client
        .get(&HttpRequest::get(url, Duration::from_millis(50)))
        .await;

    assert!(matches!(result, Err(FetchError::Timeout)), "got {:?}", result);
}
