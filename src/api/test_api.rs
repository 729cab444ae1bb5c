#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use chrono::Duration;
    use futures::future::join_all;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::build_router;
    use crate::core::{CredentialStore, PasswordHasher, TokenService};
    use crate::models::AppState;

    const SECRET: &[u8] = b"api-test-secret-0123456789abcdef";

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            store: CredentialStore::new(),
            hasher: PasswordHasher::new(4).unwrap(),
            tokens: TokenService::with_secret(SECRET),
        })
    }

    struct TestResponse {
        status: StatusCode,
        www_authenticate: Option<String>,
        body: Value,
    }

    async fn send(app: &Router, request: Request<Body>) -> TestResponse {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let www_authenticate = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            www_authenticate,
            body,
        }
    }

    fn register_request(email: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"email": email, "password": password}).to_string(),
            ))
            .unwrap()
    }

    fn login_request(username: &str, password: &str) -> Request<Body> {
        let body = format!(
            "username={}&password={}",
            username.replace('@', "%40"),
            password
        );
        Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn me_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri("/me");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn register_and_login(app: &Router, email: &str, password: &str) -> String {
        let registered = send(app, register_request(email, password)).await;
        assert_eq!(registered.status, StatusCode::CREATED);
        let logged_in = send(app, login_request(email, password)).await;
        assert_eq!(logged_in.status, StatusCode::OK);
        logged_in.body["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_register_returns_user_without_hash() {
        let app = build_router(test_state());
        let response = send(&app, register_request("ana@example.com", "s3cret")).await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(
            response.body,
            json!({"id": 1, "email": "ana@example.com", "is_active": true, "role": "user"})
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let state = test_state();
        let app = build_router(state.clone());

        let first = send(&app, register_request("ana@example.com", "one")).await;
        assert_eq!(first.status, StatusCode::CREATED);

        let second = send(&app, register_request("ana@example.com", "two")).await;
        assert_eq!(second.status, StatusCode::BAD_REQUEST);
        assert_eq!(second.body["error"], "duplicate_email");
        assert_eq!(second.body["status"], 400);
        assert_eq!(state.store.len(), 1);
    }

    #[tokio::test]
    async fn test_register_invalid_email() {
        let state = test_state();
        let app = build_router(state.clone());
        let response = send(&app, register_request("not-an-email", "pw")).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.body["error"], "validation_error");
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_register_malformed_bodies_use_error_body() {
        let state = test_state();
        let app = build_router(state.clone());

        let missing_field = Request::builder()
            .method("POST")
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"email": "a@b.io"}).to_string()))
            .unwrap();
        let response = send(&app, missing_field).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.body["error"], "invalid_body");
        assert_eq!(response.body["status"], 422);

        let wrong_content_type = Request::builder()
            .method("POST")
            .uri("/register")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("email=a@b.io"))
            .unwrap();
        let response = send(&app, wrong_content_type).await;
        assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(response.body["error"], "invalid_body");
        assert_eq!(response.body["status"], 415);

        let broken_json = Request::builder()
            .method("POST")
            .uri("/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"email\": "))
            .unwrap();
        let response = send(&app, broken_json).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"], "invalid_body");

        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_login_missing_password_uses_error_body() {
        let app = build_router(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=ana%40example.com"))
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.body["error"], "invalid_body");
        assert_eq!(response.body["status"], 422);
    }

    #[tokio::test]
    async fn test_register_password_with_nul_rejected() {
        let state = test_state();
        let app = build_router(state.clone());
        let password = format!("{}\0", "a".repeat(71));
        let response = send(&app, register_request("ana@example.com", &password)).await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.body["error"], "validation_error");
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_login_nul_suffix_does_not_match() {
        let app = build_router(test_state());
        let password = "a".repeat(71);
        register_and_login(&app, "ana@example.com", &password).await;

        let with_nul = format!("{}%00", password);
        let response = send(&app, login_request("ana@example.com", &with_nul)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["error"], "invalid_credentials");
    }

    #[tokio::test]
    async fn test_login_overlong_password_looks_like_any_failure() {
        let app = build_router(test_state());
        send(&app, register_request("ana@example.com", "s3cret")).await;

        let long = "a".repeat(100);
        let unknown_user = send(&app, login_request("bob@example.com", &long)).await;
        let known_user = send(&app, login_request("ana@example.com", &long)).await;
        let wrong_password = send(&app, login_request("ana@example.com", "wrong")).await;

        assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
        assert_eq!(known_user.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.body, wrong_password.body);
        assert_eq!(known_user.body, wrong_password.body);
    }

    #[tokio::test]
    async fn test_login_then_me_returns_registered_user() {
        let app = build_router(test_state());

        let registered = send(&app, register_request("ana@example.com", "s3cret")).await;
        assert_eq!(registered.status, StatusCode::CREATED);

        let logged_in = send(&app, login_request("ana@example.com", "s3cret")).await;
        assert_eq!(logged_in.status, StatusCode::OK);
        assert_eq!(logged_in.body["token_type"], "bearer");
        let token = logged_in.body["access_token"].as_str().unwrap();

        let me = send(&app, me_request(Some(token))).await;
        assert_eq!(me.status, StatusCode::OK);
        assert_eq!(me.body, registered.body);
    }

    #[tokio::test]
    async fn test_login_failures_do_not_leak_cause() {
        let app = build_router(test_state());
        send(&app, register_request("ana@example.com", "s3cret")).await;

        let wrong_password = send(&app, login_request("ana@example.com", "wrong")).await;
        let unknown_user = send(&app, login_request("bob@example.com", "s3cret")).await;

        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.body, unknown_user.body);
        assert_eq!(wrong_password.body["message"], "Incorrect email or password");
        assert_eq!(wrong_password.www_authenticate.as_deref(), Some("Bearer"));
    }

    #[tokio::test]
    async fn test_me_with_tampered_token() {
        let app = build_router(test_state());
        let token = register_and_login(&app, "ana@example.com", "s3cret").await;

        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        let idx = chars.len() / 2;
        chars[idx] = if chars[idx] == 'x' { 'y' } else { 'x' };
        let tampered = format!("{}.{}", head, chars.into_iter().collect::<String>());

        let tampered_response = send(&app, me_request(Some(&tampered))).await;
        let garbage_response = send(&app, me_request(Some("garbage"))).await;

        assert_eq!(tampered_response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(tampered_response.body["message"], "Could not validate credentials");
        assert_eq!(tampered_response.body, garbage_response.body);
        assert_eq!(tampered_response.www_authenticate.as_deref(), Some("Bearer"));
    }

    #[tokio::test]
    async fn test_me_with_expired_token() {
        let state = test_state();
        let app = build_router(state.clone());
        send(&app, register_request("ana@example.com", "s3cret")).await;

        let expired = state
            .tokens
            .issue_with_ttl("ana@example.com", Duration::seconds(-1))
            .unwrap();
        let response = send(&app, me_request(Some(&expired))).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["error"], "invalid_token");
    }

    #[tokio::test]
    async fn test_me_without_token() {
        let app = build_router(test_state());
        let response = send(&app, me_request(None)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["error"], "not_authenticated");

        let request = Request::builder()
            .uri("/me")
            .header(header::AUTHORIZATION, "Basic YW5hOnMzY3JldA==")
            .body(Body::empty())
            .unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_for_unknown_subject() {
        let state = test_state();
        let app = build_router(state.clone());

        let token = state.tokens.issue("ghost@example.com").unwrap();
        let response = send(&app, me_request(Some(&token))).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["message"], "User not found");
    }

    #[tokio::test]
    async fn test_token_from_other_secret_rejected() {
        let app = build_router(test_state());
        register_and_login(&app, "ana@example.com", "s3cret").await;

        let forged = TokenService::with_secret(b"someone-else")
            .issue("ana@example.com")
            .unwrap();
        let response = send(&app, me_request(Some(&forged))).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_concurrent_registration_ids() {
        const N: usize = 24;
        let state = test_state();
        let app = build_router(state.clone());

        let responses = join_all((0..N).map(|i| {
            let app = app.clone();
            async move {
                send(&app, register_request(&format!("user{}@example.com", i), "pw")).await
            }
        }))
        .await;

        let ids: HashSet<i64> = responses
            .iter()
            .map(|r| {
                assert_eq!(r.status, StatusCode::CREATED);
                r.body["id"].as_i64().unwrap()
            })
            .collect();
        assert_eq!(ids, (1..=N as i64).collect::<HashSet<_>>());
        assert_eq!(state.store.len(), N);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = build_router(test_state());
        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let response = send(&app, request).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["error"], "not_found");
    }
}
