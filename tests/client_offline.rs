//! Façade behaviour under network failure, with a scripted transport.

use bff_client::cache::{CacheStore, MemoryStore};
use bff_client::client::{BffClient, DataSource, HospitalFilter};
use bff_client::fallback;
use bff_client::normalize::{Normalizer, RATING_RANGE, WAIT_TIME_RANGE};
use bff_client::transport::{RawResponse, ScriptedTransport};
use bff_client::{Config, ErrorKind, RecordKind};
use serde_json::json;
use std::sync::Arc;

const BASE: &str = "http://backend.test";

fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

async fn client_with(
    transport: Arc<ScriptedTransport>,
    store: Arc<MemoryStore>,
    generation: &str,
) -> BffClient {
    let config = Config::for_base_url(BASE).with_cache_generation(generation);
    BffClient::with_parts(config, transport, store, Normalizer::seeded(1))
        .await
        .unwrap()
}

async fn client(transport: Arc<ScriptedTransport>) -> BffClient {
    client_with(transport, Arc::new(MemoryStore::new()), "v1").await
}

#[tokio::test]
async fn hospitals_network_error_without_cache_gives_defaults() {
    let t = Arc::new(ScriptedTransport::new());
    t.fail(url("/api/v1/hospitals/"));
    let c = client(t.clone()).await;

    let got = c.get_hospitals(&HospitalFilter::default()).await.unwrap();
    assert_eq!(got.source, DataSource::Fallback);
    assert_eq!(got.data, fallback::defaults_for(RecordKind::Hospital));
    assert_eq!(t.calls(&url("/api/v1/hospitals/")), 1);
}

#[tokio::test]
async fn hospitals_from_backend_are_normalized() {
    let t = Arc::new(ScriptedTransport::new());
    t.respond(
        url("/api/v1/hospitals/"),
        Ok(RawResponse::ok(json!({"data": [
            {"Facility_N": "Mama Lucy Kibaki", "Location": "Kayole"},
            {"Facility_Name": "Mbagathi", "rating": 4.0},
        ]}))),
    );
    let c = client(t).await;

    let got = c.get_hospitals(&HospitalFilter::default()).await.unwrap();
    assert_eq!(got.source, DataSource::Network);
    assert_eq!(got.data.len(), 2);
    assert_eq!(got.data[0].text("name"), Some("Mama Lucy Kibaki"));
    assert_eq!(got.data[0].text("address"), Some("Kayole"));
    assert_eq!(got.data[1].number("rating"), Some(4.0));

    let rating = got.data[0].number("rating").unwrap();
    assert!((RATING_RANGE.0..=RATING_RANGE.1).contains(&rating));
    let wait = got.data[1].integer("waitTime").unwrap();
    assert!((WAIT_TIME_RANGE.0..=WAIT_TIME_RANGE.1).contains(&wait));
}

#[tokio::test]
async fn hospital_filter_becomes_query() {
    let t = Arc::new(ScriptedTransport::new());
    let filtered = url("/api/v1/hospitals/?city=Nairobi&state=Nairobi%20County");
    t.respond(filtered.clone(), Ok(RawResponse::ok(json!([{"name": "KNH"}]))));
    let c = client(t.clone()).await;

    let filter = HospitalFilter {
        city: Some("Nairobi".into()),
        state: Some("Nairobi County".into()),
    };
    let got = c.get_hospitals(&filter).await.unwrap();
    assert_eq!(got.data[0].text("name"), Some("KNH"));
    assert_eq!(t.calls(&filtered), 1);
}

#[tokio::test]
async fn empty_payload_triggers_fallback() {
    let t = Arc::new(ScriptedTransport::new());
    t.respond(url("/api/v1/resources/"), Ok(RawResponse::ok(json!({"resources": []}))));
    let c = client(t).await;

    let got = c.get_resources().await.unwrap();
    assert!(got.is_fallback());
    assert_eq!(got.data, fallback::defaults_for(RecordKind::Resource));
}

#[tokio::test]
async fn chat_message_field_maps_to_response() {
    let t = Arc::new(ScriptedTransport::new());
    t.respond(url("/api/v1/chat/message"), Ok(RawResponse::ok(json!({"message": "Hi!"}))));
    let c = client(t).await;

    let got = c.send_chat_message("hello").await.unwrap();
    assert_eq!(got.source, DataSource::Network);
    assert_eq!(got.data.response, "Hi!");
    assert!(!got.data.is_offline);
}

#[tokio::test]
async fn chat_failure_gives_offline_reply() {
    let t = Arc::new(ScriptedTransport::new());
    t.fail(url("/api/v1/chat/message"));
    let c = client(t).await;

    let got = c.send_chat_message("hello").await.unwrap();
    assert_eq!(got.source, DataSource::Fallback);
    assert_eq!(got.data, fallback::default_chat_reply());
}

#[tokio::test]
async fn network_first_serves_cached_after_failure() {
    let t = Arc::new(ScriptedTransport::new());
    let resources = url("/api/v1/resources/");
    t.respond(
        resources.clone(),
        Ok(RawResponse::ok(json!([{"title": "Screening 101"}]))),
    );
    let c = client(t.clone()).await;

    let live = c.get_resources().await.unwrap();
    assert_eq!(live.source, DataSource::Network);

    t.fail(resources.clone());
    let stale = c.get_resources().await.unwrap();
    assert_eq!(stale.source, DataSource::Cache);
    assert_eq!(stale.data[0].text("title"), Some("Screening 101"));
    assert_eq!(t.calls(&resources), 2);
}

#[tokio::test]
async fn prefixed_base_url_keeps_api_data_network_first() {
    let base = "https://gateway.example/bff";
    let resources = format!("{base}/api/v1/resources/");
    let t = Arc::new(ScriptedTransport::new());
    t.respond(resources.clone(), Ok(RawResponse::ok(json!([{"title": "Old"}]))));
    let c = BffClient::with_parts(
        Config::for_base_url(base),
        t.clone(),
        Arc::new(MemoryStore::new()),
        Normalizer::seeded(1),
    )
    .await
    .unwrap();

    let first = c.get_resources().await.unwrap();
    assert_eq!(first.source, DataSource::Network);
    assert_eq!(first.data[0].text("title"), Some("Old"));

    t.respond(resources.clone(), Ok(RawResponse::ok(json!([{"title": "New"}]))));
    let second = c.get_resources().await.unwrap();
    assert_eq!(second.source, DataSource::Network);
    assert_eq!(second.data[0].text("title"), Some("New"));
    assert_eq!(t.calls(&resources), 2);
}

#[tokio::test]
async fn generation_bump_refetches_once() {
    let store = Arc::new(MemoryStore::new());
    let t = Arc::new(ScriptedTransport::new());
    let steps = url("/api/v1/self_exam/steps");
    t.respond(steps.clone(), Ok(RawResponse::ok(json!({"steps": [{"title": "Look"}]}))));

    let old = client_with(t.clone(), store.clone(), "v1").await;
    old.get_self_exam_steps().await.unwrap();
    assert_eq!(store.count("v1").await.unwrap(), 1);

    let before = t.calls(&steps);
    let new = client_with(t.clone(), store.clone(), "v2").await;
    assert_eq!(store.count("v1").await.unwrap(), 0);
    assert_eq!(t.calls(&steps), before);

    new.get_self_exam_steps().await.unwrap();
    assert_eq!(t.calls(&steps), before + 1);
    assert_eq!(store.count("v2").await.unwrap(), 1);
}

#[tokio::test]
async fn post_encouragement_pending_when_offline() {
    let t = Arc::new(ScriptedTransport::new());
    t.fail(url("/api/v1/encouragement/"));
    let c = client(t).await;

    let got = c.post_encouragement("Stay strong", None).await.unwrap();
    assert_eq!(got.source, DataSource::Fallback);
    assert_eq!(got.data.text("message"), Some("Stay strong"));
    assert_eq!(got.data.text("type"), Some("💖 General Support"));
    assert_eq!(got.data.flag("pending"), Some(true));
    assert!(!got.data.text("timestamp").unwrap_or("").is_empty());
}

#[tokio::test]
async fn post_encouragement_uses_echo() {
    let t = Arc::new(ScriptedTransport::new());
    t.respond(
        url("/api/v1/encouragement/"),
        Ok(RawResponse::ok(json!({"id": 42, "timestamp": "2026-01-01T00:00:00Z"}))),
    );
    let c = client(t).await;

    let got = c.post_encouragement("You've got this", Some("tip")).await.unwrap();
    assert_eq!(got.source, DataSource::Network);
    assert_eq!(got.data.integer("id"), Some(42));
    assert_eq!(got.data.text("type"), Some("tip"));
    assert_eq!(got.data.flag("pending"), None);
}

#[tokio::test]
async fn features_fallback_on_offline_stub() {
    let t = Arc::new(ScriptedTransport::new());
    t.fail(url("/api/v1/mobile/"));
    let c = client(t).await;

    let got = c.get_mobile_features().await.unwrap();
    assert_eq!(got.source, DataSource::Fallback);
    assert_eq!(got.data.exclusive.len(), 6);
    assert_eq!(got.data.upcoming.len(), 3);
}

#[tokio::test]
async fn greeting_from_backend() {
    let t = Arc::new(ScriptedTransport::new());
    t.respond(
        url("/api/v1/chat/greeting"),
        Ok(RawResponse::ok(json!({"response": "Welcome back", "suggestions": ["Self-exam guide"]}))),
    );
    let c = client(t).await;

    let got = c.get_chat_greeting().await.unwrap();
    assert_eq!(got.data.response, "Welcome back");
    assert_eq!(got.data.suggestions, vec!["Self-exam guide".to_string()]);
}

#[tokio::test]
async fn unknown_operation_is_the_only_error() {
    let t = Arc::new(ScriptedTransport::new());
    let c = client(t.clone()).await;

    let err = c
        .fetch_records("getWeather", RecordKind::Resource)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownOperation);
    assert_eq!(t.total_calls(), 0);
}

#[tokio::test]
async fn health_never_fails_and_skips_cache() {
    let t = Arc::new(ScriptedTransport::new());
    let health = url("/health");
    t.respond(health.clone(), Ok(RawResponse::ok(json!({"status": "healthy"}))));
    let c = client(t.clone()).await;

    assert!(c.check_health().await);
    assert!(c.check_health().await);
    assert_eq!(t.calls(&health), 2);
    assert_eq!(c.cache().len().await.unwrap(), 0);

    t.fail(health);
    assert!(!c.check_health().await);
    assert!(!c.connectivity().reachable);
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let t = Arc::new(ScriptedTransport::new());
    let config = Config::for_base_url(BASE).with_timeout_ms(5);
    let err = BffClient::with_parts(config, t, Arc::new(MemoryStore::new()), Normalizer::seeded(1))
        .await
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}
