use serde::Deserialize;
use serde_json::json;
use teller_common_http::{error_message, parse_json, HttpClient, HttpError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize)]
struct Ack {
    ok: bool,
}

#[tokio::test]
async fn test_get_and_parse_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;

    let client = HttpClient::new(format!("{}/api", server.uri())).expect("client");
    let response = client.get("/ping").await.expect("request");
    let response = HttpClient::check_response(response).await.expect("status");
    let ack: Ack = parse_json(response).await.expect("json");
    assert!(ack.ok);
}

#[tokio::test]
async fn test_post_json_sends_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "email": "a@b.c" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(server.uri()).expect("client");
    let response = client
        .post_json("/login", &json!({ "email": "a@b.c" }))
        .await
        .expect("request");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_check_response_classifies_errors() {
    let server = MockServer::start().await;
    Mock::given(path("/denied"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthenticated." })),
        )
        .mount(&server)
        .await;
    Mock::given(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = HttpClient::new(server.uri()).expect("client");

    let denied = HttpClient::check_response(client.get("/denied").await.unwrap())
        .await
        .unwrap_err();
    assert!(denied.is_unauthorized());
    assert_eq!(
        denied.body().and_then(error_message),
        Some("Unauthenticated.".to_string())
    );

    let broken = HttpClient::check_response(client.get("/broken").await.unwrap())
        .await
        .unwrap_err();
    assert!(matches!(broken, HttpError::ServerError { status: 500, .. }));
}

#[test]
fn test_error_display() {
    let server_error = HttpError::ServerError {
        status: 500,
        body: "Internal Server Error".to_string(),
    };
    let error_string = format!("{}", server_error);
    assert!(error_string.contains("500"));
    assert!(error_string.contains("server error"));

    let client_error = HttpError::ClientError {
        status: 404,
        body: "Not Found".to_string(),
    };
    let client_error_string = format!("{}", client_error);
    assert!(client_error_string.contains("404"));
    assert!(client_error_string.contains("client error"));
}
