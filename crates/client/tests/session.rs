mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use client::{Client, ClientConfig, ClientError};
use common::MockServer;
use serde_json::json;

#[tokio::test]
async fn scoped_session_is_opened_and_closed_once() {
    let server = MockServer::spawn().await;
    let client = server.client();

    let categories = client.fetch_categories("5").await.unwrap();

    assert!(categories.is_empty());
    assert_eq!(server.state.sessions_created(), 1);
    assert_eq!(server.state.sessions_closed(), 1);
    assert_eq!(server.state.open_sessions(), 0);
    assert!(!client.store().has().await);
}

#[tokio::test]
async fn failed_operation_still_closes_its_session() {
    let server = MockServer::spawn().await;
    server.state.set_find_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "response": {}, "messages": [{ "code": "1630", "message": "URL format is incorrect" }] }),
    );
    let client = server.client();

    let err = client.fetch_expenses("5").await.unwrap_err();

    assert!(matches!(err, ClientError::Api { ref code, .. } if code == "1630"));
    assert_eq!(server.state.sessions_created(), 1);
    assert_eq!(server.state.sessions_closed(), 1);
    assert!(!client.store().has().await);
}

#[tokio::test]
async fn existing_session_is_reused_and_left_open() {
    let server = MockServer::spawn().await;
    let client = server.client();

    let token = client.authenticate().await.unwrap();
    client.fetch_categories("5").await.unwrap();
    client.fetch_expenses("5").await.unwrap();

    assert_eq!(server.state.sessions_created(), 1);
    assert_eq!(server.state.sessions_closed(), 0);
    assert_eq!(client.store().get().await, Some(token.clone()));
    let bearer = format!("Bearer {token}");
    assert!(
        server
            .state
            .requests()
            .iter()
            .filter(|req| req.path.ends_with("/_find"))
            .all(|req| req.auth.as_deref() == Some(bearer.as_str()))
    );

    client.logout().await;
    assert_eq!(server.state.sessions_closed(), 1);
    assert_eq!(server.state.open_sessions(), 0);
}

#[tokio::test]
async fn authenticate_discards_the_previous_token() {
    let server = MockServer::spawn().await;
    let client = server.client();

    let first = client.authenticate().await.unwrap();
    let second = client.authenticate().await.unwrap();

    assert_ne!(first, second);
    assert_eq!(client.store().get().await, Some(second));
}

#[tokio::test]
async fn capacity_exceeded_leaves_store_empty() {
    let server = MockServer::spawn().await;
    server.state.set_capacity_exceeded(true);
    let client = server.client();
    client.store().set("stale".to_string()).await;

    let err = client.authenticate().await.unwrap_err();
    assert!(matches!(err, ClientError::CapacityExceeded));
    assert!(!client.store().has().await);

    let err = client.fetch_categories("5").await.unwrap_err();
    assert!(matches!(err, ClientError::CapacityExceeded));
    assert!(!client.store().has().await);
    assert_eq!(server.state.count(Method::POST, "/_find"), 0);
}

#[tokio::test]
async fn wrong_service_credentials_fail_authentication() {
    let server = MockServer::spawn().await;
    let client = Client::new(ClientConfig {
        password: "nope".to_string(),
        ..server.config()
    })
    .unwrap();

    let err = client.fetch_categories("5").await.unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationFailed));
    assert_eq!(server.state.sessions_closed(), 0);
}

#[tokio::test]
async fn logout_twice_is_harmless() {
    let server = MockServer::spawn().await;
    let client = server.client();
    client.authenticate().await.unwrap();

    client.logout().await;
    client.logout().await;

    assert_eq!(server.state.sessions_closed(), 1);
    assert!(!client.store().has().await);
}

#[tokio::test]
async fn expired_session_fails_the_operation_only() {
    let server = MockServer::spawn().await;
    let client = server.client();
    client.authenticate().await.unwrap();
    server.state.expire_sessions();

    let err = client.fetch_categories("5").await.unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationFailed));
    assert!(!client.store().has().await);

    assert!(client.fetch_categories("5").await.unwrap().is_empty());
    assert_eq!(server.state.sessions_created(), 2);
    assert_eq!(server.state.open_sessions(), 0);
    assert!(!client.store().has().await);
}

#[tokio::test]
async fn expired_scoped_session_is_closed_once_and_replaced() {
    let server = MockServer::spawn().await;
    server.state.set_find_delay(Duration::from_millis(200));
    let client = server.client();

    let running = tokio::spawn({
        let client = client.clone();
        async move { client.fetch_categories("5").await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    server.state.expire_sessions();

    let err = running.await.unwrap().unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationFailed));
    assert_eq!(server.state.sessions_closed(), 1);

    assert!(client.fetch_categories("5").await.unwrap().is_empty());
    assert_eq!(server.state.sessions_created(), 2);
    assert_eq!(server.state.sessions_closed(), 2);
}

#[tokio::test]
async fn logout_during_an_operation_closes_its_session_once() {
    let server = MockServer::spawn().await;
    server.state.set_find_delay(Duration::from_millis(200));
    let client = server.client();

    let running = tokio::spawn({
        let client = client.clone();
        async move { client.fetch_categories("5").await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.logout().await;
    assert_eq!(server.state.sessions_closed(), 0);
    assert!(!client.store().has().await);

    assert!(running.await.unwrap().unwrap().is_empty());
    assert_eq!(server.state.sessions_created(), 1);
    assert_eq!(server.state.sessions_closed(), 1);
    assert_eq!(server.state.open_sessions(), 0);
}

#[tokio::test]
async fn placeholder_database_fails_before_any_request() {
    let server = MockServer::spawn().await;
    let client = Client::new(ClientConfig {
        database: client::DATABASE_PLACEHOLDER.to_string(),
        ..server.config()
    })
    .unwrap();

    let err = client.fetch_expenses("5").await.unwrap_err();
    assert!(matches!(err, ClientError::Configuration(_)));
    assert!(server.state.requests().is_empty());
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::new(ClientConfig {
        server_url: format!("http://{addr}"),
        database: "Wallet".to_string(),
        ..ClientConfig::default()
    })
    .unwrap();

    let err = client.fetch_categories("5").await.unwrap_err();
    assert!(matches!(err, ClientError::Network { .. }));
}

#[tokio::test]
async fn concurrent_operations_share_one_session() {
    let server = MockServer::spawn().await;
    server.state.set_find_delay(Duration::from_millis(100));
    let client = server.client();

    let (categories, expenses) =
        tokio::join!(client.fetch_categories("5"), client.fetch_expenses("5"));

    assert!(categories.unwrap().is_empty());
    assert!(expenses.unwrap().is_empty());
    assert_eq!(server.state.sessions_created(), 1);
    assert_eq!(server.state.sessions_closed(), 1);
    assert!(!client.store().has().await);
}

#[tokio::test]
async fn cancelled_operation_still_releases_its_session() {
    let server = MockServer::spawn().await;
    server.state.set_find_delay(Duration::from_millis(500));
    let client = server.client();

    let cancelled =
        tokio::time::timeout(Duration::from_millis(100), client.fetch_categories("5")).await;
    assert!(cancelled.is_err());

    for _ in 0..50 {
        if server.state.sessions_closed() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(server.state.sessions_created(), 1);
    assert_eq!(server.state.sessions_closed(), 1);
    assert!(!client.store().has().await);
}

#[tokio::test]
async fn cancelled_while_opening_still_closes_the_session() {
    let server = MockServer::spawn().await;
    server.state.set_session_delay(Duration::from_millis(300));
    let client = server.client();

    let cancelled =
        tokio::time::timeout(Duration::from_millis(50), client.fetch_categories("5")).await;
    assert!(cancelled.is_err());

    for _ in 0..50 {
        if server.state.sessions_closed() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(server.state.sessions_created(), 1);
    assert_eq!(server.state.sessions_closed(), 1);
    assert_eq!(server.state.open_sessions(), 0);
    assert!(!client.store().has().await);
    assert_eq!(server.state.count(Method::POST, "/_find"), 0);
}
