//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use tessera_directory::MemoryDirectory;
//! use tessera_server::handler::routes;
//! use tessera_server::service::{AuthConfig, ServiceState};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = AuthConfig::builder()
//!     .with_jwt_secret("0123456789abcdef0123456789abcdef")
//!     .with_jwt_lifespan(15u32)
//!     .with_jwt_audience("tessera:api")
//!     .build()?;
//!
//! let state = ServiceState::from_config(&config, MemoryDirectory::new())?;
//! let app: axum::Router = routes().with_state(state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod authentication;
mod error;
pub mod request;
pub mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::ErrorResponse;
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with all routes and a JSON `404` fallback.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(authentication::routes())
        .fallback(handler)
}

#[cfg(test)]
mod test {
    use axum::Router;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use tessera_directory::MemoryDirectory;

    use crate::handler::routes;
    use crate::service::{AuthConfig, ServiceState};

    fn test_config() -> anyhow::Result<AuthConfig> {
        let config = AuthConfig::builder()
            .with_jwt_secret("0123456789abcdef0123456789abcdef")
            .with_jwt_lifespan(15u32)
            .with_jwt_audience("tessera:api")
            .build()?;
        Ok(config)
    }

    /// Returns a new [`TestServer`] with the given router.
    pub async fn create_test_server_with_router(
        router: impl Fn(ServiceState) -> Router<ServiceState>,
    ) -> anyhow::Result<TestServer> {
        let state = ServiceState::from_config(&test_config()?, MemoryDirectory::new())?;
        let router = router(state.clone());
        create_test_server_with_state(router, state).await
    }

    /// Returns a new [`TestServer`] with the default router over `directory`.
    pub async fn create_test_server_with_directory(
        directory: MemoryDirectory,
    ) -> anyhow::Result<TestServer> {
        let state = ServiceState::from_config(&test_config()?, directory)?;
        create_test_server_with_state(routes(), state).await
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub async fn create_test_server_with_state(
        router: Router<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router.with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with the default router and state.
    pub async fn create_test_server() -> anyhow::Result<TestServer> {
        create_test_server_with_router(|_| routes()).await
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/api/unknown").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<serde_json::Value>()["name"], "not_found");

        Ok(())
    }
}
