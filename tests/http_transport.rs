//! HttpTransport and health probing against a local mock server.

use bff_client::endpoints::Method;
use bff_client::health::HealthMonitor;
use bff_client::transport::{HttpTransport, Request, Transport};
use bff_client::ErrorKind;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn success_returns_parsed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/hospitals/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hospitals": []})))
        .mount(&server)
        .await;

    let t = HttpTransport::new(2_000).unwrap();
    let res = t
        .send(&Request::get(format!("{}/api/v1/hospitals/", server.uri())))
        .await
        .unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({"hospitals": []}));
}

#[tokio::test]
async fn post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .and(body_json(json!({"message": "hello", "conversation_id": "anonymous"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Hi!"})))
        .expect(1)
        .mount(&server)
        .await;

    let t = HttpTransport::new(2_000).unwrap();
    let req = Request::post(
        format!("{}/api/v1/chat/message", server.uri()),
        json!({"message": "hello", "conversation_id": "anonymous"}),
    );
    assert_eq!(req.method, Method::Post);
    let res = t.send(&req).await.unwrap();
    assert_eq!(res.body["response"], "Hi!");
}

#[tokio::test]
async fn non_2xx_is_http_status_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Error loading resources"})))
        .mount(&server)
        .await;

    let t = HttpTransport::new(2_000).unwrap();
    let err = t
        .send(&Request::get(format!("{}/api/v1/resources/", server.uri())))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HttpStatus);
    match err {
        bff_client::ClientError::HttpStatus { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, Some(json!({"detail": "Error loading resources"})));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn slow_response_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(3_000)),
        )
        .mount(&server)
        .await;

    let t = HttpTransport::new(1_000).unwrap();
    let err = t
        .send(&Request::get(format!("{}/slow", server.uri())))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn refused_connection_is_network() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let t = HttpTransport::new(2_000).unwrap();
    let err = t
        .send(&Request::get(format!("http://127.0.0.1:{port}/health")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn health_probe_checks_marker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
        .mount(&server)
        .await;

    let t = Arc::new(HttpTransport::new(2_000).unwrap());
    let monitor = HealthMonitor::new(t.clone(), format!("{}/health", server.uri()));
    assert!(monitor.check_health().await);
    assert!(monitor.state().reachable);

    let missing = HealthMonitor::new(t, format!("{}/nope", server.uri()));
    assert!(!missing.check_health().await);
}
