//! Unified error handling for the catalog services.
//!
//! Provides a single error type whose kinds are stable across transports and
//! which converts to Tonic gRPC status codes.

use domain::DomainError;
use thiserror::Error;
use tonic::Status;

/// Application error types.
///
/// `InvalidInput`, `NotFound` and `InvalidState` are caller-actionable and
/// keep their message on the wire. Remote, database and internal failures are
/// logged and reported with a generic message.
#[derive(Error, Debug)]
pub enum AppError {
    // Caller errors
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),

    // External service errors
    #[error("{service} request failed: {message}")]
    RemoteDependency { service: String, message: String },

    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::RemoteDependency { .. } => "REMOTE_DEPENDENCY_FAILURE",
            #[cfg(feature = "database")]
            AppError::Database(_) => "INTERNAL_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get gRPC status code
    pub fn grpc_code(&self) -> tonic::Code {
        match self {
            AppError::InvalidInput(_) => tonic::Code::InvalidArgument,
            AppError::NotFound(_) => tonic::Code::NotFound,
            AppError::InvalidState(_) => tonic::Code::FailedPrecondition,
            AppError::RemoteDependency { .. } => tonic::Code::Unavailable,
            _ => tonic::Code::Internal,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::NotFound(msg) | AppError::InvalidState(msg) => {
                msg.clone()
            }
            // Already logged where the remote call failed
            AppError::RemoteDependency { service, .. } => format!("Service {} is unavailable", service),
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        }
    }
}

// =============================================================================
// gRPC Status (Tonic)
// =============================================================================

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        Status::new(err.grpc_code(), err.user_message())
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::InvalidInput(msg),
            DomainError::InvalidState(msg) => AppError::InvalidState(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, msg: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(msg.into()))
    }
}

/// Convenience constructors
impl AppError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        AppError::InvalidState(msg.into())
    }

    pub fn remote_dependency(service: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::RemoteDependency {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
