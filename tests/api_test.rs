mod common;

use std::sync::{Arc, atomic::Ordering};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use common::{FakeChat, FakeMusic, state_of};
use playlistbot::api::{AppState, router};
use playlistbot::management::{AuthorizationBroker, SessionDirectory};
use playlistbot::types::SessionId;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    music: Arc<FakeMusic>,
    chat: Arc<FakeChat>,
    sessions: Arc<SessionDirectory>,
    broker: Arc<AuthorizationBroker>,
}

fn create_test_app() -> TestApp {
    let music = Arc::new(FakeMusic::default());
    let chat = Arc::new(FakeChat::default());
    let sessions = Arc::new(SessionDirectory::new());
    let broker = Arc::new(AuthorizationBroker::new(
        music.clone(),
        chat.clone(),
        sessions.clone(),
    ));
    let app = router(AppState {
        broker: broker.clone(),
        sessions: sessions.clone(),
    });
    TestApp {
        app,
        music,
        chat,
        sessions,
        broker,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health() {
    let t = create_test_app();
    t.sessions.session(SessionId(1)).await;

    let (status, body) = get(&t.app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sessions"], 1);
    assert_eq!(json["pending_authorizations"], 0);
}

#[tokio::test]
async fn test_callback_success() {
    let t = create_test_app();
    let state = state_of(&t.broker.begin_authorization(SessionId(77)).await);

    let (status, body) = get(&t.app, &format!("/callback?code=xyz&state={state}")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("connected"));
    assert!(t.sessions.is_authorized(SessionId(77)).await);
    let sent = t.chat.wait_for_sent(1).await;
    assert_eq!(sent[0].0, SessionId(77));
}

#[tokio::test]
async fn test_callback_replay_is_gone() {
    let t = create_test_app();
    let state = state_of(&t.broker.begin_authorization(SessionId(77)).await);
    let uri = format!("/callback?code=xyz&state={state}");

    let (first, _) = get(&t.app, &uri).await;
    let (second, body) = get(&t.app, &uri).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::GONE);
    assert!(body.contains("expired"));
}

#[tokio::test]
async fn test_callback_missing_parameters() {
    let t = create_test_app();

    let (status, _) = get(&t.app, "/callback?code=xyz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&t.app, "/callback?state=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_denied_consent() {
    let t = create_test_app();
    let state = state_of(&t.broker.begin_authorization(SessionId(1)).await);

    let (status, body) = get(&t.app, &format!("/callback?error=access_denied&state={state}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("cancelled"));
    assert!(!t.sessions.is_authorized(SessionId(1)).await);
}

#[tokio::test]
async fn test_callback_exchange_failure() {
    let t = create_test_app();
    t.music.exchange_fails.store(true, Ordering::SeqCst);
    let state = state_of(&t.broker.begin_authorization(SessionId(1)).await);

    let (status, body) = get(&t.app, &format!("/callback?code=bad&state={state}")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Login failed"));
    assert!(!t.sessions.is_authorized(SessionId(1)).await);
}
