//! Client integration tests against a mock upstream.
//!
//! These tests verify:
//! - No network I/O happens until an operation runs
//! - The password grant body and the self lookup that follows it
//! - URL construction and bearer authentication on the wire
//! - Upstream and auth errors surface with status and body intact

use eksi_client::{Credentials, EksiClient, Endpoint, Error, Params, SessionInfo, Vote};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> EksiClient {
    EksiClient::builder()
        .uri(server.uri())
        .client_secret("app-secret")
        .build()
        .unwrap()
}

fn bound_client(server: &MockServer) -> EksiClient {
    let client = client_for(server);
    client.bind(SessionInfo {
        access_token: "tok".to_string(),
        nick: "foo".to_string(),
        user_id: 7,
    });
    client
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|r| r.len())
        .unwrap_or_default()
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

// ─────────────────────────────────────────────────────────────────────────────
// Construction and local preconditions
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_construction_performs_no_io() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let _clone = client.clone();
    let _users = client.users();

    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_operations_before_authenticate_fail_locally() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client.users().my_entries(None).await.unwrap_err();
    assert!(matches!(err, Error::Unauthenticated(_)));

    let err = client.entries().get(12345).await.unwrap_err();
    assert!(matches!(err, Error::Unauthenticated(_)));

    let err = client.users().follow("bar").await.unwrap_err();
    assert!(matches!(err, Error::Unauthenticated(_)));

    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_invalid_parameter_sends_nothing() {
    let server = MockServer::start().await;
    let client = bound_client(&server);

    let err = client
        .invoke(Endpoint::Entry, &Params::new().with("id", "abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { .. }));

    let err = client.invoke_named("nope", &Params::new()).await.unwrap_err();
    assert!(matches!(err, Error::UnknownOperation(_)));

    assert_eq!(request_count(&server).await, 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_token_request_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("client_secret=app-secret"))
        .and(body_string_contains("username=foo"))
        .and(body_string_contains("password=p%40ss"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let grant = client
        .request_token(Credentials::new("foo", "p@ss"))
        .await
        .unwrap();

    assert_eq!(grant.access_token, "abc");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_token_request_has_no_authorization() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let client = bound_client(&server);
    client
        .request_token(Credentials::new("foo", "bar"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_authenticate_binds_session() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/account/me"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Success": true,
            "Data": { "Nick": "foo", "UserId": 42 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let info = client
        .authenticate(Credentials::new("foo", "bar"))
        .await
        .unwrap();

    assert_eq!(info.nick, "foo");
    assert_eq!(info.user_id, 42);
    assert_eq!(info.access_token, "fresh-token");
    assert_eq!(client.session().info(), Some(info));
    assert_eq!(
        client.session().authorization_header().unwrap(),
        "Bearer fresh-token"
    );
}

#[tokio::test]
async fn test_rejected_grant_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .authenticate(Credentials::new("foo", "wrong"))
        .await
        .unwrap_err();

    match err {
        Error::Auth { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, r#"{"error":"invalid_grant"}"#);
        }
        other => panic!("expected auth error, got {:?}", other),
    }
    assert!(!client.is_authenticated());
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_failed_self_lookup_leaves_session_empty() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/account/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .authenticate(Credentials::new("foo", "bar"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upstream { status: 500, .. }));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_invoke_token_by_name() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let client = client_for(&server);
    let params = Params::new()
        .with("username", "foo")
        .with("password", "bar")
        .with("client_secret", "forged");
    let response = client.invoke_named("token", &params).await.unwrap();
    assert_eq!(response.status, 200);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(body.contains("client_secret=app-secret"));
    assert!(!body.contains("forged"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog dispatch
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_my_entries_url_and_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/user/foo/entries"))
        .and(query_param("p", "2"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("page two"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/user/foo/entries"))
        .and(query_param("p", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("page one"))
        .expect(1)
        .mount(&server)
        .await;

    let client = bound_client(&server);
    let two = client.users().my_entries(Some(2)).await.unwrap();
    assert_eq!(two.text(), "page two");

    let one = client.users().my_entries(None).await.unwrap();
    assert_eq!(one.text(), "page one");
}

#[tokio::test]
async fn test_entry_without_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/entry/12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Id": 12345 })))
        .mount(&server)
        .await;

    let client = bound_client(&server);
    let response = client.entries().get(12345).await.unwrap();
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["Id"], 12345);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_vote_posts_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/entry/vote"))
        .and(body_string_contains("id=99"))
        .and(body_string_contains("rate=-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = bound_client(&server);
    client.entries().vote(99, Vote::Down).await.unwrap();
}

#[tokio::test]
async fn test_upstream_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/user/nobody"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
        .mount(&server)
        .await;

    let client = bound_client(&server);
    let err = client.users().get("nobody").await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::Upstream { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such user");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_custom_api_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/index/debe"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = EksiClient::builder()
        .uri(server.uri())
        .client_secret("app-secret")
        .api_version("v2/")
        .build()
        .unwrap();
    client.bind(SessionInfo {
        access_token: "tok".to_string(),
        nick: "foo".to_string(),
        user_id: 1,
    });
    client.feeds().debe().await.unwrap();
}
