//! Server-Sent Events delivery of list changes.

#![cfg(feature = "sqlite")]

use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use rstest::{fixture, rstest};
use serde_json::json;
use test_util::TestApp;
use tokio::time::timeout;

#[fixture]
async fn app() -> TestApp { TestApp::new().await.expect("failed to build test app") }

async fn open_stream(app: &TestApp, list_id: i64, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/lists/{list_id}/events"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    app.send(request).await.expect("subscribe")
}

/// Read body frames until one complete SSE event has arrived.
async fn next_event(response: &mut Response) -> String {
    let mut text = String::new();
    while !text.contains("\n\n") {
        let frame = timeout(Duration::from_secs(5), response.body_mut().frame())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("body error");
        if let Ok(data) = frame.into_data() {
            text.push_str(std::str::from_utf8(&data).expect("utf-8"));
        }
    }
    text
}

#[rstest]
#[tokio::test]
async fn collaborator_receives_item_events(#[future] app: TestApp) {
    let app = app.await;
    let owner = app.register("owner@example.com").await.expect("owner");
    app.register("viewer@example.com").await.expect("viewer");
    let list_id = app.create_list(&owner, "Chores").await.expect("list");
    app.share(&owner, list_id, "viewer@example.com", "view")
        .await
        .expect("share");
    let viewer = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "viewer@example.com", "password": test_util::PASSWORD })),
        )
        .await
        .expect("login")
        .body["token"]
        .as_str()
        .expect("token")
        .to_owned();

    let mut stream = open_stream(&app, list_id, &viewer).await;
    assert_eq!(stream.status(), StatusCode::OK);
    assert_eq!(
        stream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );

    let added = app
        .call(
            Method::POST,
            &format!("/api/lists/{list_id}/items"),
            Some(&owner),
            Some(json!({ "content": "sweep" })),
        )
        .await
        .expect("add item");
    let item_id = added.body["id"].as_i64().expect("id");

    let event = next_event(&mut stream).await;
    assert!(event.contains("event: item-added"), "got {event:?}");
    assert!(event.contains("\"content\":\"sweep\""), "got {event:?}");

    app.call(
        Method::DELETE,
        &format!("/api/lists/{list_id}/items"),
        Some(&owner),
        Some(json!({ "itemId": item_id })),
    )
    .await
    .expect("delete item");
    let event = next_event(&mut stream).await;
    assert!(event.contains("event: item-deleted"), "got {event:?}");
    assert!(event.contains(&format!("\"itemId\":{item_id}")), "got {event:?}");
}

#[rstest]
#[tokio::test]
async fn strangers_cannot_subscribe(#[future] app: TestApp) {
    let app = app.await;
    let owner = app.register("owner@example.com").await.expect("owner");
    let stranger = app.register("stranger@example.com").await.expect("stranger");
    let list_id = app.create_list(&owner, "Private").await.expect("list");

    let response = open_stream(&app, list_id, &stranger).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn subscription_requires_a_session(#[future] app: TestApp) {
    let app = app.await;
    let res = app
        .call(Method::GET, "/api/lists/1/events", None, None)
        .await
        .expect("request");
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[tokio::test]
async fn revoked_collaborator_stream_closes(#[future] app: TestApp) {
    let app = app.await;
    let owner = app.register("owner@example.com").await.expect("owner");
    let guest = app.register("guest@example.com").await.expect("guest");
    let list_id = app.create_list(&owner, "Shared").await.expect("list");
    app.share(&owner, list_id, "guest@example.com", "edit")
        .await
        .expect("share");

    let mut stream = open_stream(&app, list_id, &guest).await;
    assert_eq!(stream.status(), StatusCode::OK);

    let revoked = app
        .call(
            Method::DELETE,
            "/api/lists/share",
            Some(&owner),
            Some(json!({ "listId": list_id, "userEmail": "guest@example.com" })),
        )
        .await
        .expect("unshare");
    assert_eq!(revoked.status, StatusCode::OK);

    let event = next_event(&mut stream).await;
    assert!(event.contains("event: access-revoked"), "got {event:?}");

    let end = timeout(Duration::from_secs(5), stream.body_mut().frame())
        .await
        .expect("stream stayed open after revocation");
    assert!(end.is_none(), "expected end of stream, got {end:?}");
}
