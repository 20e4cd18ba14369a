use std::time::{Duration, Instant};

use hostagent_api::{Client, Error, Outcome, Request, RequestContext, ResponseBody};
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(server: &MockServer) -> RequestContext {
    RequestContext::parse(&server.uri()).unwrap()
}

#[tokio::test]
async fn ping_returns_text_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ui/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let outcome = client
        .request(&context(&mock_server), &Request::get("ui/ping"))
        .await;

    assert_eq!(outcome, Outcome::Success(ResponseBody::Text("pong".to_string())));
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({ "ok": true, "body": "pong" })
    );
}

#[tokio::test]
async fn server_error_message_embeds_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let request = Request::post("api/config", Some("{\"x\":1}".to_string())).json();
    let outcome = client.request(&context(&mock_server), &request).await;

    assert!(!outcome.is_ok());
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({ "ok": false, "body": "POST api/config failed: 500 Internal Server Error: boom" })
    );
}

#[tokio::test]
async fn non_success_statuses_fail_with_details() {
    let mock_server = MockServer::start().await;

    for (p, status) in [("/ui/a", 400u16), ("/ui/b", 404), ("/ui/c", 502)] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(status))
            .mount(&mock_server)
            .await;
    }

    let client = Client::new().unwrap();
    let ctx = context(&mock_server);
    for (p, status) in [("ui/a", 400u16), ("ui/b", 404), ("ui/c", 502)] {
        let outcome = client.get(&ctx, p, false).await;
        let message = outcome.message().unwrap();
        assert!(message.contains("GET"), "{}", message);
        assert!(message.contains(p), "{}", message);
        assert!(message.contains(&status.to_string()), "{}", message);
        assert_eq!(outcome.error().unwrap().status(), Some(status));
    }
}

#[tokio::test]
async fn forbidden_is_logged_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ui/profile"))
        .respond_with(ResponseTemplate::new(403).set_body_string("nope"))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let outcome = client.get(&context(&mock_server), "ui/profile", true).await;

    assert!(outcome.is_logged_out());
    assert_eq!(outcome, Outcome::Failure(Error::LoggedOut));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ui/ping"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let started = Instant::now();
    let request = Request::get("ui/ping").timeout(Duration::from_millis(200));
    let outcome = client.request(&context(&mock_server), &request).await;

    assert!(outcome.is_timed_out());
    assert_eq!(outcome.message().as_deref(), Some("request timed out"));
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn context_timeout_is_the_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ui/ping"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let ctx = context(&mock_server).with_timeout(Duration::from_millis(150));
    let outcome = client.ping(&ctx).await;

    assert!(outcome.is_timed_out());
}

#[tokio::test]
async fn connection_refused_is_transport_failure() {
    let client = Client::new().unwrap();
    let ctx = RequestContext::parse("http://127.0.0.1:1").unwrap();
    let outcome = client.ping(&ctx).await;

    assert!(matches!(outcome, Outcome::Failure(Error::Transport(_))));
    assert!(!outcome.is_timed_out());
    assert!(!outcome.message().unwrap().is_empty());
}

#[tokio::test]
async fn json_body_is_parsed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "0.8.3" })))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let outcome = client.get(&context(&mock_server), "api/info", true).await;

    assert_eq!(
        outcome.body().and_then(|b| b.as_json()),
        Some(&json!({ "version": "0.8.3" }))
    );
}

#[tokio::test]
async fn malformed_json_is_parse_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/info"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let outcome = client.get(&context(&mock_server), "api/info", true).await;

    assert!(matches!(outcome, Outcome::Failure(Error::Parse(_))));
}

#[tokio::test]
async fn empty_response_passes_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ui/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let ctx = context(&mock_server);

    let text = client.get(&ctx, "ui/empty", false).await;
    assert_eq!(text, Outcome::Success(ResponseBody::Text(String::new())));

    let json = client.get(&ctx, "ui/empty", true).await;
    assert_eq!(json, Outcome::Success(ResponseBody::Json(serde_json::Value::Null)));
}

#[tokio::test]
async fn content_type_only_with_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/config"))
        .and(header("content-type", "application/json"))
        .and(body_string("{\"x\":1}"))
        .respond_with(ResponseTemplate::new(200).set_body_string("saved"))
        .mount(&mock_server)
        .await;

    Mock::given(path("/ui/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let ctx = context(&mock_server);

    let saved = client
        .post(&ctx, "api/config", Some("{\"x\":1}".to_string()), false)
        .await;
    assert!(saved.is_ok());

    assert!(client.ping(&ctx).await.is_ok());
    assert!(client.post(&ctx, "ui/ping", Some(String::new()), false).await.is_ok());
    assert!(client.post(&ctx, "ui/ping", None, false).await.is_ok());

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 4);
    assert!(received[0].headers.get("content-type").is_some());
    for req in &received[1..] {
        assert!(req.headers.get("content-type").is_none());
    }
}

#[tokio::test]
async fn api_key_only_on_api_routes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let ctx = context(&mock_server).with_api_key(Some("secret".to_string()));

    assert!(client.get(&ctx, "api/info", false).await.is_ok());
    assert!(client.get(&ctx, "ui/ping", false).await.is_ok());

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(
        received[0].headers.get("x-api-key").map(|v| v.to_str().unwrap()),
        Some("secret")
    );
    assert!(received[1].headers.get("x-api-key").is_none());
}

#[tokio::test]
async fn locale_and_base_path_are_applied() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/base/ui/ping"))
        .and(header("accept-language", "de"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&mock_server)
        .await;

    let client = Client::new().unwrap();
    let ctx = context(&mock_server)
        .with_base_path("/base/")
        .with_locale("de");

    assert!(client.get(&ctx, "/ui/ping", false).await.is_ok());
    let ctx = ctx.with_base_path("/base");
    assert!(client.get(&ctx, "ui/ping", false).await.is_ok());
}
