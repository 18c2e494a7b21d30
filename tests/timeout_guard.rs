//! End-to-end tests for the request timeout guard.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::{routing::get, Router};
use tower::ServiceExt;

use timeout_guard::config::PolicyKind;
use timeout_guard::http::BufferedResponse;
use timeout_guard::{Completion, FallbackPolicy, TimeoutGuard, TimeoutGuardLayer};

mod common;

#[tokio::test]
async fn fast_request_is_untouched() {
    let server = common::start_server(common::config_with_timeout(200)).await;

    let res = reqwest::get(server.url("/sleep/10")).await.expect("server unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn slow_request_gets_408() {
    let server = common::start_server(common::config_with_timeout(100)).await;

    let res = reqwest::get(server.url("/sleep/1000")).await.expect("server unreachable");
    assert_eq!(res.status(), 408);
    let content_type = res.headers()[header::CONTENT_TYPE.as_str()].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(res.text().await.unwrap(), "Request Timeout");
}

#[tokio::test]
async fn service_unavailable_policy_from_config() {
    let mut config = common::config_with_timeout(100);
    config.timeout.policy = PolicyKind::ServiceUnavailable;
    let server = common::start_server(config).await;

    let res = reqwest::get(server.url("/sleep/1000")).await.expect("server unreachable");
    assert_eq!(res.status(), 503);
    assert_eq!(res.text().await.unwrap(), "Request Timeout");
}

#[tokio::test]
async fn requests_are_guarded_independently() {
    let server = common::start_server(common::config_with_timeout(150)).await;
    let client = reqwest::Client::new();

    let slow = client.get(server.url("/sleep/1000")).send();
    let fast = client.get(server.url("/")).send();
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.unwrap().status(), 408);
    assert_eq!(fast.unwrap().status(), 200);
}

#[tokio::test]
async fn layer_on_custom_router() {
    let app = Router::new()
        .route(
            "/report",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                "report"
            }),
        )
        .layer(TimeoutGuardLayer::with_policy(
            Duration::from_millis(50),
            FallbackPolicy::request_timeout().with_status(StatusCode::GATEWAY_TIMEOUT),
        ));

    let response = app
        .oneshot(Request::get("/report").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"Request Timeout");
}

#[tokio::test]
async fn handler_writing_in_time() {
    let guard = TimeoutGuard::from_millis(50);
    let res = Arc::new(guard.arm(BufferedResponse::new()));

    let handler = {
        let res = Arc::clone(&res);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            res.send("ok").unwrap();
            res.complete()
        })
    };

    assert_eq!(handler.await.unwrap(), Completion::Finished);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!res.is_timed_out());
    res.with_writer(|w| {
        assert_eq!(w.status(), StatusCode::OK);
        assert_eq!(w.body(), Some(&b"ok"[..]));
        assert_eq!(w.writes(), 1);
    });
}

#[tokio::test]
async fn handler_writing_too_late() {
    let guard = TimeoutGuard::from_millis(50);
    let res = Arc::new(guard.arm(BufferedResponse::new()));

    let handler = {
        let res = Arc::clone(&res);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let returned = res.send("ok").is_ok();
            (returned, res.complete())
        })
    };

    let (send_ok, completion) = handler.await.unwrap();
    assert!(send_ok);
    assert_eq!(completion, Completion::TimedOut);

    res.with_writer(|w| {
        assert_eq!(w.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(w.body(), Some(&b"Request Timeout"[..]));
        assert_eq!(w.writes(), 1);
    });
}
