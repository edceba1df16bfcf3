//! End-to-end tests of request translation through the proxy route.

use reqwest::multipart::{Form, Part};
use serde_json::json;

mod common;

use common::{http_client, parse_multipart, start_capturing_upstream, start_gateway, test_config, EVENT_CODE};

const OK_JSON: &str = r#"{"ok":true}"#;

#[tokio::test]
async fn test_get_joins_path_and_sends_no_body() {
    let mut upstream = start_capturing_upstream(200, "application/json", OK_JSON).await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url("/v1"))).await;

    let res = http_client()
        .get(format!("http://{}/api/proxy/Public-Api/Events/42?ignored=1", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.text().await.unwrap(), OK_JSON);

    let seen = upstream.next_request().await;
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.path, "/v1/Public-Api/Events/42");
    assert_eq!(seen.header("content-type"), Some("application/json"));
    assert!(seen.header("authorization").is_none());
    assert!(seen.body.is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_explicit_authorization_forwarded_verbatim() {
    let mut upstream = start_capturing_upstream(200, "application/json", OK_JSON).await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url(""))).await;
    let client = http_client();

    for path in ["Registration-Page-Api/GetCategories", "Public-Api/Events"] {
        client
            .get(format!("http://{}/api/proxy/{}", addr, path))
            .header("Authorization", "Bearer caller-token")
            .send()
            .await
            .unwrap();

        let seen = upstream.next_request().await;
        assert_eq!(seen.header("authorization"), Some("Bearer caller-token"), "path {path}");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_event_code_substituted_on_registration_api() {
    let mut upstream = start_capturing_upstream(200, "application/json", OK_JSON).await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url(""))).await;

    http_client()
        .get(format!("http://{}/api/proxy/Registration-Page-Api/GetCategories", addr))
        .send()
        .await
        .unwrap();

    let seen = upstream.next_request().await;
    assert_eq!(seen.header("authorization"), Some(EVENT_CODE));

    shutdown.trigger();
}

#[tokio::test]
async fn test_other_paths_get_no_authorization() {
    let mut upstream = start_capturing_upstream(200, "application/json", OK_JSON).await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url(""))).await;

    http_client()
        .post(format!("http://{}/api/proxy/Abstracts/Submit", addr))
        .body(r#"{"title":"x"}"#)
        .send()
        .await
        .unwrap();

    let seen = upstream.next_request().await;
    assert!(seen.header("authorization").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_registration_multipart_injects_event_code_once() {
    let mut upstream = start_capturing_upstream(200, "application/json", OK_JSON).await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url(""))).await;

    let form = Form::new()
        .text("first_name", "Ada")
        .text("event_code", "FORGED")
        .text("category_id", "7")
        .part(
            "photo",
            Part::bytes(b"\x89PNG-data".to_vec())
                .file_name("me.png")
                .mime_str("image/png")
                .unwrap(),
        );

    let res = http_client()
        .post(format!("http://{}/api/proxy/Registration-Page-Api/RegisterDelegate", addr))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let seen = upstream.next_request().await;
    assert!(seen
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data; boundary="));

    let fields = parse_multipart(&seen).await;
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["event_code", "first_name", "category_id", "photo"]);
    assert_eq!(fields[0].data, EVENT_CODE.as_bytes());
    assert_eq!(fields[1].data, "Ada".as_bytes());
    assert_eq!(fields[3].file_name.as_deref(), Some("me.png"));
    assert_eq!(fields[3].data, b"\x89PNG-data".as_slice());

    shutdown.trigger();
}

#[tokio::test]
async fn test_registration_json_becomes_urlencoded() {
    let mut upstream = start_capturing_upstream(200, "application/json", OK_JSON).await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url(""))).await;

    http_client()
        .post(format!("http://{}/api/proxy/Registration-Page-Api/GetCategoryFormInputs", addr))
        .json(&json!({ "category_id": 7, "event_code": "FORGED", "lang": "en" }))
        .send()
        .await
        .unwrap();

    let seen = upstream.next_request().await;
    assert_eq!(seen.header("content-type"), Some("application/x-www-form-urlencoded"));

    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(&seen.body)
        .into_owned()
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("event_code".to_string(), EVENT_CODE.to_string()),
            ("category_id".to_string(), "7".to_string()),
            ("lang".to_string(), "en".to_string()),
        ]
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_registration_empty_json_array_sends_event_code() {
    let mut upstream = start_capturing_upstream(200, "application/json", OK_JSON).await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url(""))).await;

    http_client()
        .post(format!("http://{}/api/proxy/Registration-Page-Api/RegisterDelegate", addr))
        .header("content-type", "application/json")
        .body("[]")
        .send()
        .await
        .unwrap();

    let seen = upstream.next_request().await;
    assert_eq!(seen.header("content-type"), Some("application/x-www-form-urlencoded"));
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(&seen.body)
        .into_owned()
        .collect();
    assert_eq!(pairs, vec![("event_code".to_string(), EVENT_CODE.to_string())]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_registration_unparseable_body_dropped() {
    let mut upstream = start_capturing_upstream(200, "application/json", OK_JSON).await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url(""))).await;

    http_client()
        .post(format!("http://{}/api/proxy/GetCategories", addr))
        .header("content-type", "text/plain")
        .body("definitely not json")
        .send()
        .await
        .unwrap();

    let seen = upstream.next_request().await;
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.header("content-type"), Some("application/json"));
    assert!(seen.body.is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_plain_post_forwarded_as_raw_text() {
    let mut upstream = start_capturing_upstream(201, "application/json", r#"{"id":9}"#).await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url(""))).await;

    let raw = r#"{"title":"Ownership in practice","authors":["A. Lovelace"]}"#;
    let res = http_client()
        .post(format!("http://{}/api/proxy/Abstracts/Submit", addr))
        .header("content-type", "text/plain")
        .header("x-custom", "not forwarded")
        .body(raw)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let seen = upstream.next_request().await;
    assert_eq!(seen.header("content-type"), Some("application/json"));
    assert!(seen.header("x-custom").is_none());
    assert_eq!(seen.body, raw.as_bytes());

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_status_and_body_relayed_as_json() {
    let upstream = start_capturing_upstream(404, "text/html", "<h1>Not Found</h1>").await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url(""))).await;

    let res = http_client()
        .get(format!("http://{}/api/proxy/missing", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.text().await.unwrap(), "<h1>Not Found</h1>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unsupported_method_rejected() {
    let upstream = start_capturing_upstream(200, "application/json", OK_JSON).await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url(""))).await;

    let res = http_client()
        .delete(format!("http://{}/api/proxy/Abstracts/1", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 405);

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_echoed() {
    let upstream = start_capturing_upstream(200, "application/json", OK_JSON).await;
    let (addr, shutdown) = start_gateway(test_config(upstream.base_url(""))).await;
    let client = http_client();

    let res = client
        .get(format!("http://{}/api/proxy/Events", addr))
        .header("x-request-id", "req-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "req-123");

    let res = client.get(format!("http://{}/health", addr)).send().await.unwrap();
    let generated = res.headers()["x-request-id"].to_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&generated).is_ok());

    shutdown.trigger();
}
