//! Application state and dependency injection.

use tessera_directory::MemoryDirectory;

use crate::service::{AuthConfig, AuthSessionService, Result, TokenSigner};

/// Session service over the in-memory directory, as served over HTTP.
pub type SessionService = AuthSessionService<MemoryDirectory>;

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    directory: MemoryDirectory,

    token_signer: TokenSigner,
    session_service: SessionService,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Fails if the configuration is invalid, so a misconfigured service
    /// never starts accepting requests.
    pub fn from_config(config: &AuthConfig, directory: MemoryDirectory) -> Result<Self> {
        config.validate()?;

        let token_signer = config.create_token_signer()?;
        let session_service = AuthSessionService::new(
            directory.clone(),
            config.create_password_hasher(),
            token_signer.clone(),
            config.create_refresh_token_generator(),
            config.refresh_token_lifetime(),
        );

        let service_state = Self {
            directory,
            token_signer,
            session_service,
        };

        Ok(service_state)
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(directory: MemoryDirectory);

impl_di!(token_signer: TokenSigner);
impl_di!(session_service: SessionService);
