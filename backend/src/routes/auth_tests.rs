//! Property-based tests for the authentication pipeline
//!
//! Invalid or missing credentials never reach a protected handler, and a
//! successful login yields a token carrying the account's roles.

#[cfg(test)]
mod tests {
    use crate::auth::{PasswordService, TokenCodec};
    use crate::config::AppConfig;
    use crate::error::{INVALID_TOKEN_MESSAGE, LOGIN_FAILED_MESSAGE};
    use crate::repositories::{
        InMemoryProductRepository, InMemoryUserRepository, NewUser, StoreResult, UserChanges,
        UserRecord, UserRepository,
    };
    use crate::routes::create_users_router;
    use crate::state::AppState;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use storefront_shared::RoleName;
    use tower::ServiceExt;

    /// Credential store whose username lookup never finishes in time
    struct StalledUsers;

    #[async_trait]
    impl UserRepository for StalledUsers {
        async fn find_all(&self) -> StoreResult<Vec<UserRecord>> {
            Ok(Vec::new())
        }

        async fn find_by_id(&self, _id: i64) -> StoreResult<Option<UserRecord>> {
            Ok(None)
        }

        async fn find_by_username(&self, _username: &str) -> StoreResult<Option<UserRecord>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        async fn save(&self, _user: NewUser) -> StoreResult<UserRecord> {
            unreachable!("login never saves")
        }

        async fn update(&self, _id: i64, _changes: UserChanges) -> StoreResult<Option<UserRecord>> {
            Ok(None)
        }

        async fn delete_by_id(&self, _id: i64) -> StoreResult<bool> {
            Ok(false)
        }

        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    fn create_test_state() -> AppState {
        AppState::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryProductRepository::new()),
            AppConfig::default(),
        )
    }

    async fn seeded_state() -> AppState {
        let state = create_test_state();
        let password_hash = PasswordService::hash("12345").unwrap();
        state
            .users()
            .save(NewUser {
                username: "pepe".to_string(),
                email: "pepe@correo.com".to_string(),
                password_hash: password_hash.clone(),
                roles: vec![RoleName::User],
            })
            .await
            .unwrap();
        state
            .users()
            .save(NewUser {
                username: "admin".to_string(),
                email: "admin@correo.com".to_string(),
                password_hash,
                roles: vec![RoleName::User, RoleName::Admin],
            })
            .await
            .unwrap();
        state
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn login_request(body: &str) -> Request<Body> {
        Request::builder()
            .uri("/login")
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Generate random invalid tokens
    fn invalid_token_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            // Empty token
            Just("".to_string()),
            // Random string (not a valid JWT)
            "[a-zA-Z0-9]{10,50}",
            // Malformed JWT (wrong number of parts)
            "[a-zA-Z0-9]{10}\\.[a-zA-Z0-9]{10}",
            // Valid format but invalid signature
            "[a-zA-Z0-9_-]{20}\\.[a-zA-Z0-9_-]{20}\\.[a-zA-Z0-9_-]{20}",
        ]
    }

    /// Generate random authorization header formats
    fn auth_header_strategy() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            // No header
            Just(None),
            // Missing Bearer prefix
            invalid_token_strategy().prop_map(Some),
            // Wrong prefix
            invalid_token_strategy().prop_map(|t| Some(format!("Basic {}", t))),
            // Bearer with invalid token
            invalid_token_strategy().prop_map(|t| Some(format!("Bearer {}", t))),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: requests to a secured route without a valid token get 401
        #[test]
        fn prop_unauthenticated_requests_return_401(
            auth_header in auth_header_strategy()
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let app = create_users_router(create_test_state());

                let mut request_builder = Request::builder()
                    .uri("/users/1")
                    .method("GET");

                if let Some(header) = auth_header {
                    request_builder = request_builder.header("Authorization", header);
                }

                let request = request_builder.body(Body::empty()).unwrap();
                let response = app.oneshot(request).await.unwrap();

                prop_assert_eq!(
                    response.status(),
                    StatusCode::UNAUTHORIZED,
                    "Expected 401 for unauthenticated request"
                );

                Ok(())
            })?;
        }
    }

    proptest! {
        // Every case hashes and verifies with argon2
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Property: any password other than the real one is rejected
        #[test]
        fn prop_wrong_password_never_signs_in(password in "[a-zA-Z0-9]{0,16}") {
            prop_assume!(password != "12345");

            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let app = create_users_router(seeded_state().await);
                let body = serde_json::json!({"username": "pepe", "password": password});

                let response = app.oneshot(login_request(&body.to_string())).await.unwrap();

                prop_assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
                prop_assert!(response.headers().get(header::AUTHORIZATION).is_none());

                Ok(())
            })?;
        }
    }

    #[tokio::test]
    async fn test_login_issues_token_with_roles() {
        let state = seeded_state().await;
        let app = create_users_router(state.clone());

        let response = app
            .oneshot(login_request(r#"{"username":"admin","password":"12345"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let header_value = response
            .headers()
            .get(header::AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = body_json(response).await;

        assert_eq!(body["username"], "admin");
        assert_eq!(body["message"], "Hello admin, you have signed in successfully!");
        let token = body["token"].as_str().unwrap();
        assert_eq!(header_value, format!("Bearer {}", token));

        let claims = state.tokens().decode(token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.authorities, vec![RoleName::User, RoleName::Admin]);
        assert!(claims.is_admin);
    }

    #[tokio::test]
    async fn test_login_timeout_counts_as_bad_credentials() {
        let mut config = AppConfig::default();
        config.auth.login_timeout_ms = 100;
        let state = AppState::new(
            Arc::new(StalledUsers),
            Arc::new(InMemoryProductRepository::new()),
            config,
        );
        let app = create_users_router(state);

        let started = Instant::now();
        let response = app
            .oneshot(login_request(r#"{"username":"pepe","password":"12345"}"#))
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::AUTHORIZATION).is_none());

        let json = body_json(response).await;
        assert_eq!(json["error"], "bad credentials");
        assert_eq!(json["message"], LOGIN_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_unknown_user_costs_a_password_check() {
        const ROUNDS: u32 = 3;
        let state = seeded_state().await;

        async fn average_login(state: &AppState, body: &str) -> Duration {
            let mut total = Duration::ZERO;
            for _ in 0..ROUNDS {
                let app = create_users_router(state.clone());
                let started = Instant::now();
                let response = app.oneshot(login_request(body)).await.unwrap();
                total += started.elapsed();
                assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            }
            total / ROUNDS
        }

        let known = average_login(&state, r#"{"username":"pepe","password":"wrong"}"#).await;
        let unknown = average_login(&state, r#"{"username":"ghost","password":"wrong"}"#).await;

        // Without the dummy verification the unknown user answers ~40x faster
        assert!(
            unknown * 4 >= known,
            "unknown user took {:?}, known user {:?}",
            unknown,
            known
        );
    }

    #[tokio::test]
    async fn test_login_failures_return_401() {
        for body in [
            r#"{"username":"pepe","password":"wrong"}"#,
            r#"{"username":"nobody","password":"12345"}"#,
            r#"{"username":"pepe"}"#,
            "not json",
        ] {
            let app = create_users_router(seeded_state().await);
            let response = app.oneshot(login_request(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "body: {}", body);
            assert!(response.headers().get(header::AUTHORIZATION).is_none());

            let json = body_json(response).await;
            assert_eq!(json["message"], LOGIN_FAILED_MESSAGE);
            assert_eq!(json["error"], "bad credentials");
        }
    }

    #[tokio::test]
    async fn test_public_list_needs_no_token() {
        let app = create_users_router(seeded_state().await);

        let request = Request::builder()
            .uri("/users")
            .method("GET")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_token_with_wrong_secret_returns_401() {
        let state = seeded_state().await;

        // Token signed by a codec with a different key
        let foreign = TokenCodec::new(&TokenCodec::generate_secret(), 3600);
        let token = foreign.issue("admin", &[RoleName::User, RoleName::Admin]).unwrap();

        let app = create_users_router(state);
        let request = Request::builder()
            .uri("/users")
            .method("GET")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        // Even a public route rejects a bad token
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let json = body_json(response).await;
        assert_eq!(json["error"], "invalid token signature");
        assert_eq!(json["message"], INVALID_TOKEN_MESSAGE);
    }

    #[tokio::test]
    async fn test_expired_token_returns_401() {
        let state = seeded_state().await;
        let issued_at = chrono::Utc::now() - chrono::Duration::hours(2);
        let token = state
            .tokens()
            .issue_at("pepe", &[RoleName::User], issued_at)
            .unwrap();

        let app = create_users_router(state);
        let request = Request::builder()
            .uri("/users/1")
            .method("GET")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "token expired");
    }

    #[tokio::test]
    async fn test_user_token_cannot_create_users() {
        let state = seeded_state().await;
        let token = state.tokens().issue("pepe", &[RoleName::User]).unwrap();

        let app = create_users_router(state);
        let request = Request::builder()
            .uri("/users")
            .method("POST")
            .header("Authorization", format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"username":"nuevo","password":"12345","email":"nuevo@correo.com"}"#,
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_valid_token_passes_auth() {
        let state = seeded_state().await;
        let token = state.tokens().issue("pepe", &[RoleName::User]).unwrap();

        let app = create_users_router(state);
        let request = Request::builder()
            .uri("/users/1")
            .method("GET")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["username"], "pepe");
    }
}
