//! Authentication handlers: login, refresh token rotation, registration and
//! access token introspection.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};

use crate::extract::{AuthState, Json, ValidateJson};
use crate::handler::Result;
use crate::handler::request::{LoginRequest, RefreshTokenRequest, RegisterRequest};
use crate::handler::response::{RegisterResponse, TokenDataResponse, TokenPairResponse};
use crate::service::{ServiceState, SessionService};
use crate::utility::tracing_targets::TRACING_TARGET_AUTHENTICATION as TRACING_TARGET;

/// Authenticates a user and issues an access token and a refresh token.
#[tracing::instrument(skip_all)]
async fn login(
    State(session_service): State<SessionService>,
    ValidateJson(request): ValidateJson<LoginRequest>,
) -> Result<Json<TokenPairResponse>> {
    tracing::trace!(
        target: TRACING_TARGET,
        username = %request.username,
        "login attempt"
    );

    let pair = session_service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(pair.into()))
}

/// Exchanges a refresh token for a new token pair, invalidating it.
#[tracing::instrument(skip_all)]
async fn refresh_token(
    State(session_service): State<SessionService>,
    ValidateJson(request): ValidateJson<RefreshTokenRequest>,
) -> Result<Json<TokenPairResponse>> {
    let pair = session_service.refresh(&request.refresh_token).await?;
    Ok(Json(pair.into()))
}

/// Registers a new user.
#[tracing::instrument(skip_all)]
async fn register(
    State(session_service): State<SessionService>,
    ValidateJson(request): ValidateJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let user = session_service
        .register(&request.username, &request.password, &request.email)
        .await?;

    let response = RegisterResponse {
        message: "User registered successfully.".to_owned(),
        user_id: user.id,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Returns the presented access token together with its validated claims.
#[tracing::instrument(skip_all)]
async fn token_data(auth_state: AuthState) -> Result<Json<TokenDataResponse>> {
    let (token, claims) = auth_state.into_parts();
    Ok(Json(TokenDataResponse { token, claims }))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh-token", post(refresh_token))
        .route("/api/auth/register", post(register))
        .route("/api/auth/token-data", get(token_data))
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use jiff::{SignedDuration, Timestamp};
    use serde_json::{Value, json};
    use tessera_directory::MemoryDirectory;
    use tessera_directory::query::{TokenSwap, UserDirectory};

    use crate::handler::authentication::routes;
    use crate::handler::response::{RegisterResponse, TokenDataResponse, TokenPairResponse};
    use crate::handler::test::{create_test_server_with_directory, create_test_server_with_router};

    async fn register_alice(server: &TestServer) -> RegisterResponse {
        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "alice",
                "password": "correct-pw",
                "email": "alice@example.com"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.json::<RegisterResponse>()
    }

    async fn login_alice(server: &TestServer) -> TokenPairResponse {
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": "alice", "password": "correct-pw" }))
            .await;

        response.assert_status_ok();
        response.json::<TokenPairResponse>()
    }

    #[tokio::test]
    async fn register_then_login() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        let registered = register_alice(&server).await;
        assert_eq!(registered.message, "User registered successfully.");

        let pair = login_alice(&server).await;
        assert_eq!(pair.token.split('.').count(), 3);
        assert_eq!(pair.refresh_token.len(), 88);

        let response = server
            .get("/api/auth/token-data")
            .authorization_bearer(&pair.token)
            .await;
        response.assert_status_ok();

        let data = response.json::<TokenDataResponse>();
        assert_eq!(data.token, pair.token);
        assert_eq!(data.claims.user_id, registered.user_id);
        assert_eq!(data.claims.name, "alice");

        Ok(())
    }

    #[tokio::test]
    async fn login_failures_look_identical() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;
        let _registered = register_alice(&server).await;

        let wrong_password = server
            .post("/api/auth/login")
            .json(&json!({ "username": "alice", "password": "wrong-pw" }))
            .await;
        let unknown_user = server
            .post("/api/auth/login")
            .json(&json!({ "username": "mallory", "password": "correct-pw" }))
            .await;

        wrong_password.assert_status(StatusCode::UNAUTHORIZED);
        unknown_user.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.json::<Value>(), unknown_user.json::<Value>());
        assert_eq!(wrong_password.json::<Value>()["name"], "unauthorized");

        Ok(())
    }

    #[tokio::test]
    async fn refresh_rotates_and_rejects_reuse() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;
        let _registered = register_alice(&server).await;
        let first = login_alice(&server).await;

        let response = server
            .post("/api/auth/refresh-token")
            .json(&json!({ "refreshToken": first.refresh_token }))
            .await;
        response.assert_status_ok();
        let second = response.json::<TokenPairResponse>();
        assert_ne!(second.refresh_token, first.refresh_token);

        let reused = server
            .post("/api/auth/refresh-token")
            .json(&json!({ "refreshToken": first.refresh_token }))
            .await;
        reused.assert_status(StatusCode::UNAUTHORIZED);

        let body = reused.json::<Value>();
        assert_eq!(body["name"], "invalid_refresh_token");
        assert_eq!(body["message"], "Invalid or expired refresh token");

        Ok(())
    }

    #[tokio::test]
    async fn expired_refresh_token_gets_same_response() -> anyhow::Result<()> {
        let directory = MemoryDirectory::new();
        let server = create_test_server_with_directory(directory.clone()).await?;
        let registered = register_alice(&server).await;

        let past = Timestamp::now().checked_sub(SignedDuration::from_secs(60))?;
        directory
            .update_refresh_token(
                registered.user_id,
                TokenSwap::Unconditional,
                "expired-token".to_owned(),
                past,
            )
            .await?;

        let expired = server
            .post("/api/auth/refresh-token")
            .json(&json!({ "refreshToken": "expired-token" }))
            .await;
        let unknown = server
            .post("/api/auth/refresh-token")
            .json(&json!({ "refreshToken": "unknown-token" }))
            .await;

        expired.assert_status(StatusCode::UNAUTHORIZED);
        unknown.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(expired.json::<Value>(), unknown.json::<Value>());

        Ok(())
    }

    #[tokio::test]
    async fn register_conflict_and_validation() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;
        let _registered = register_alice(&server).await;

        let conflict = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "alice",
                "password": "another-pw",
                "email": "other@example.com"
            }))
            .await;
        conflict.assert_status(StatusCode::CONFLICT);
        assert_eq!(conflict.json::<Value>()["name"], "conflict");

        let invalid = server
            .post("/api/auth/register")
            .json(&json!({
                "username": "bo",
                "password": "short",
                "email": "not-an-email"
            }))
            .await;
        invalid.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(invalid.json::<Value>()["name"], "bad_request");

        Ok(())
    }

    #[tokio::test]
    async fn token_data_requires_valid_bearer() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        let missing = server.get("/api/auth/token-data").await;
        missing.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(missing.json::<Value>()["name"], "missing_auth_token");

        let garbage = server
            .get("/api/auth/token-data")
            .authorization_bearer("not.a.jwt")
            .await;
        garbage.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(garbage.json::<Value>()["name"], "malformed_auth_token");

        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes()).await?;

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "user": "alice" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        Ok(())
    }
}
