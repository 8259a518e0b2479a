//! Mapping of usecase errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{RepositoryError, ValueObjectError},
    infrastructure::dto::http::ErrorResponse,
    usecase::{AccountError, ChannelError, ProfileError, RoomError},
};

/// A failed request: status code plus `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthenticated")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {}", self.message);
        } else {
            tracing::debug!("Request rejected ({}): {}", self.status, self.message);
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(e: ValueObjectError) -> Self {
        match e {
            ValueObjectError::PasswordHashing(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            _ => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::Invalid(e) => e.into(),
            AccountError::Unauthenticated => Self::unauthenticated(),
            AccountError::InvalidCredentials => Self::new(StatusCode::UNAUTHORIZED, e.to_string()),
            AccountError::Internal(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AccountError::Repository(e) => e.into(),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::Invalid(e) => e.into(),
            ProfileError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, e.to_string()),
            ProfileError::NotCreator => Self::new(StatusCode::FORBIDDEN, e.to_string()),
            ProfileError::Repository(e) => e.into(),
        }
    }
}

impl From<RoomError> for ApiError {
    fn from(e: RoomError) -> Self {
        match e {
            RoomError::EmptyTitle => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
            RoomError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, e.to_string()),
            RoomError::NotCreator => Self::new(StatusCode::FORBIDDEN, e.to_string()),
            RoomError::Repository(e) => e.into(),
        }
    }
}

impl From<ChannelError> for ApiError {
    fn from(e: ChannelError) -> Self {
        match e {
            ChannelError::NotFound(_) | ChannelError::Closed => {
                Self::new(StatusCode::NOT_FOUND, e.to_string())
            }
            ChannelError::Repository(e) => e.into(),
        }
    }
}
