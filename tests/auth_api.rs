//! Registration, login and session handling over the HTTP API.

#![cfg(feature = "sqlite")]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use test_util::{PASSWORD, TestApp};

#[fixture]
async fn app() -> TestApp { TestApp::new().await.expect("failed to build test app") }

#[rstest]
#[tokio::test]
async fn register_returns_token_and_normalises_email(#[future] app: TestApp) {
    let app = app.await;
    let res = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "  Ada@Example.COM ", "password": PASSWORD, "name": "Ada" })),
        )
        .await
        .expect("register");
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["message"], "User created successfully");
    let token = res.body["token"].as_str().expect("token");
    assert_eq!(token.len(), 48);

    let me = app
        .call(Method::GET, "/api/users/me", Some(token), None)
        .await
        .expect("me");
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "ada@example.com");
    assert_eq!(me.body["name"], "Ada");
    assert!(me.body.get("password").is_none());
}

#[rstest]
#[case(json!({ "password": PASSWORD }), "Email and password are required")]
#[case(json!({ "email": "ada@example.com" }), "Email and password are required")]
#[case(json!({ "email": "nope", "password": PASSWORD }), "A valid email is required")]
#[case(
    json!({ "email": "ada@example.com", "password": "short" }),
    "Password must be at least 8 characters"
)]
#[tokio::test]
async fn register_validates_input(
    #[future] app: TestApp,
    #[case] body: Value,
    #[case] expected: &str,
) {
    let app = app.await;
    let res = app
        .call(Method::POST, "/api/auth/register", None, Some(body))
        .await
        .expect("register");
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), Some(expected));
}

#[rstest]
#[tokio::test]
async fn duplicate_registration_is_rejected(#[future] app: TestApp) {
    let app = app.await;
    app.register("ada@example.com").await.expect("first");
    let res = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "ADA@example.com", "password": PASSWORD })),
        )
        .await
        .expect("second");
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), Some("User already exists"));
}

#[rstest]
#[case("ghost@example.com", PASSWORD, "User not found")]
#[case("ada@example.com", "wrong-password", "Invalid password")]
#[tokio::test]
async fn login_failures(
    #[future] app: TestApp,
    #[case] email: &str,
    #[case] password: &str,
    #[case] expected: &str,
) {
    let app = app.await;
    app.register("ada@example.com").await.expect("register");
    let res = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
        .expect("login");
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), Some(expected));
}

#[rstest]
#[tokio::test]
async fn login_issues_fresh_token_and_logout_revokes_it(#[future] app: TestApp) {
    let app = app.await;
    let first = app.register("ada@example.com").await.expect("register");
    let res = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": PASSWORD })),
        )
        .await
        .expect("login");
    assert_eq!(res.status, StatusCode::OK);
    let second = res.body["token"].as_str().expect("token").to_owned();
    assert_ne!(first, second);

    let out = app
        .call(Method::POST, "/api/auth/logout", Some(&second), None)
        .await
        .expect("logout");
    assert_eq!(out.status, StatusCode::NO_CONTENT);

    let revoked = app
        .call(Method::GET, "/api/users/me", Some(&second), None)
        .await
        .expect("me");
    assert_eq!(revoked.status, StatusCode::UNAUTHORIZED);
    assert_eq!(revoked.error(), Some("Unauthorized"));

    let still_valid = app
        .call(Method::GET, "/api/users/me", Some(&first), None)
        .await
        .expect("me");
    assert_eq!(still_valid.status, StatusCode::OK);
}

#[rstest]
#[tokio::test]
async fn token_cookie_authenticates(#[future] app: TestApp) {
    let app = app.await;
    let token = app.register("ada@example.com").await.expect("register");
    let request = Request::get("/api/users/me")
        .header(header::COOKIE, format!("theme=dark; token={token}"))
        .body(Body::empty())
        .expect("request");
    let response = app.send(request).await.expect("send");
    assert_eq!(response.status(), StatusCode::OK);
}

#[rstest]
#[tokio::test]
async fn profile_update_sets_and_clears_name(#[future] app: TestApp) {
    let app = app.await;
    let token = app.register("ada@example.com").await.expect("register");
    let res = app
        .call(
            Method::POST,
            "/api/users",
            Some(&token),
            Some(json!({ "name": "  Ada Lovelace " })),
        )
        .await
        .expect("update");
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "User saved successfully");
    let me = app
        .call(Method::GET, "/api/users/me", Some(&token), None)
        .await
        .expect("me");
    assert_eq!(me.body["name"], "Ada Lovelace");

    app.call(
        Method::POST,
        "/api/users",
        Some(&token),
        Some(json!({ "name": "" })),
    )
    .await
    .expect("clear");
    let cleared = app
        .call(Method::GET, "/api/users/me", Some(&token), None)
        .await
        .expect("me");
    assert!(cleared.body["name"].is_null());
}
