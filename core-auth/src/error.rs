use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Correlation token {token} is already registered")]
    TokenCollision { token: i32 },

    #[error("Client identifier resource '{resource}' could not be resolved")]
    ConfigurationMissing { resource: String },

    #[error("External identity provider is not configured")]
    ProviderUnavailable,

    #[error("Host context not initialized")]
    NotInitialized,

    #[error("Failed to launch sign-in UI: {0}")]
    LaunchFailed(String),

    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
