use std::fmt;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorCode {
    Unsubscribable,
    NoPermission,
    DiscussionLocked,
    CannotTrack,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppError {
    Generic { description: String },
    AuthenticationFail,
    EntityFailIdNotFound { ident: String },
    PermissionDenied { code: ErrorCode, required: String },
    InvalidArgument { description: String },
    StateConflict { code: ErrorCode, description: String },
    Serde { source: String },
    SurrealDb { source: String },
}

/// Any error produced below the route layer.
pub type AppResult<T> = core::result::Result<T, AppError>;

/// Route level error, carries the request id reported to the client.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CtxError {
    pub error: AppError,
    pub req_id: Uuid,
}

pub type CtxResult<T> = core::result::Result<T, CtxError>;

impl std::error::Error for AppError {}

impl AppError {
    pub fn not_found(ident: impl Into<String>) -> Self {
        Self::EntityFailIdNotFound {
            ident: ident.into(),
        }
    }

    pub fn no_permission(required: impl Into<String>) -> Self {
        Self::PermissionDenied {
            code: ErrorCode::NoPermission,
            required: required.into(),
        }
    }

    pub fn invalid(description: impl Into<String>) -> Self {
        Self::InvalidArgument {
            description: description.into(),
        }
    }

    /// Machine readable code, lets clients render a specific message.
    pub fn code(&self) -> String {
        match self {
            Self::PermissionDenied { code, .. } | Self::StateConflict { code, .. } => {
                code.to_string()
            }
            Self::EntityFailIdNotFound { .. } => "notfound".to_string(),
            Self::InvalidArgument { .. } => "invalidargument".to_string(),
            Self::AuthenticationFail => "authentication".to_string(),
            Self::SurrealDb { .. } => "storefailure".to_string(),
            Self::Generic { .. } | Self::Serde { .. } => "generic".to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EntityFailIdNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            AppError::AuthenticationFail => StatusCode::UNAUTHORIZED,
            AppError::StateConflict { .. } => StatusCode::CONFLICT,
            AppError::SurrealDb { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InvalidArgument { .. } | AppError::Serde { .. } | AppError::Generic { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

const INTERNAL: &str = "Internal error";

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { description } => write!(f, "{description}"),
            Self::AuthenticationFail => write!(f, "Authentication failed"),
            Self::EntityFailIdNotFound { ident } => write!(f, "Record id= {ident} not found"),
            Self::PermissionDenied { required, .. } => write!(f, "not permitted: {required}"),
            Self::InvalidArgument { description } => write!(f, "{description}"),
            Self::StateConflict { description, .. } => write!(f, "{description}"),
            Self::Serde { source } => write!(f, "Serde error - {source}"),
            Self::SurrealDb { .. } => write!(f, "{INTERNAL}"),
        }
    }
}

impl From<AppError> for CtxError {
    fn from(value: AppError) -> Self {
        CtxError {
            req_id: Uuid::new_v4(),
            error: value,
        }
    }
}

impl From<surrealdb::Error> for CtxError {
    fn from(value: surrealdb::Error) -> Self {
        AppError::from(value).into()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponseBody {
    pub error: String,
    pub code: String,
    pub req_id: String,
}

// REST error response
impl IntoResponse for CtxError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.error.status_code();
        if status_code.is_server_error() {
            warn!(req_id = %self.req_id, error = ?self.error, "request failed");
        } else {
            debug!(req_id = %self.req_id, error = ?self.error, "request rejected");
        }
        let body = ErrorResponseBody {
            error: self.error.to_string(),
            code: self.error.code(),
            req_id: self.req_id.to_string(),
        };
        let mut response = (status_code, Json(body)).into_response();
        response.extensions_mut().insert(self.error);
        response
    }
}

/// Marks a call whose failure must not fail the surrounding action.
/// The caller opts in explicitly and the failure is still logged.
pub trait BestEffort {
    fn or_log(self, action: &str);
}

impl<T> BestEffort for AppResult<T> {
    fn or_log(self, action: &str) {
        if let Err(err) = self {
            warn!(action, error = %err, source = ?err, "best-effort action failed");
        }
    }
}

// External Errors
impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde {
            source: value.to_string(),
        }
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(value: surrealdb::Error) -> Self {
        Self::SurrealDb {
            source: value.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(value: validator::ValidationErrors) -> Self {
        Self::InvalidArgument {
            description: value.to_string(),
        }
    }
}

impl From<CtxError> for AppError {
    fn from(value: CtxError) -> Self {
        value.error
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_value: jsonwebtoken::errors::Error) -> Self {
        Self::AuthenticationFail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_error_kind() {
        let err = AppError::PermissionDenied {
            code: ErrorCode::Unsubscribable,
            required: "subscription mode".to_string(),
        };
        assert_eq!(err.code(), "unsubscribable");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = AppError::StateConflict {
            code: ErrorCode::DiscussionLocked,
            description: "locked".to_string(),
        };
        assert_eq!(err.code(), "discussionlocked");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        assert_eq!(AppError::not_found("post:x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::invalid("bad").code(), "invalidargument");
    }
}
