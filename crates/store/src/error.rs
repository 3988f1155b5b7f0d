use caviar_client::ApiError;
use caviar_core::error::CoreError;

/// Errors returned by the orchestration services.
///
/// Validation and permission failures are raised locally before any remote
/// call; remote failures carry the user-facing message that was also
/// recorded in the store.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A domain-level error from `caviar_core` (validation, permission).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The remote call failed.
    #[error("{message}")]
    Remote {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl ServiceError {
    /// Whether the failure was detected locally, before any remote call.
    pub fn is_local(&self) -> bool {
        matches!(self, ServiceError::Core(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Core(CoreError::Validation(_)))
    }

    /// Text suitable for a toast or inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Core(CoreError::Validation(msg)) => msg.clone(),
            ServiceError::Core(CoreError::Forbidden(_)) => {
                "You are not allowed to perform this action".to_string()
            }
            ServiceError::Core(CoreError::NotFound { entity, .. }) => {
                format!("This {entity} no longer exists")
            }
            ServiceError::Core(CoreError::Internal(_)) => "An internal error occurred".to_string(),
            ServiceError::Remote { message, .. } => message.clone(),
        }
    }
}

/// Invalid or missing configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be set")]
    Missing { key: &'static str },

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}
