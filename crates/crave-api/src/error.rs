//! Error types for the portal API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//! Every response body has the shape `{"error": <message>, "status": <code>}`.
//!
//! Server-side failures never leak their detail to the client: the
//! cause is logged and the body carries a generic message.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crave_economy::EconomyError;
use crave_store::StoreError;

/// Message sent for every 500 response.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or parameters failed validation.
    #[error("{0}")]
    Validation(String),

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// No session user, bad credentials, or an unverified admin session.
    #[error("{0}")]
    Unauthenticated(String),

    /// The session user lacks the required role.
    #[error("{0}")]
    Forbidden(String),

    /// The requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// The write collides with existing state.
    #[error("{0}")]
    Conflict(String),

    /// The request body exceeds the upload limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The caller is acting faster than allowed.
    #[error("{0}")]
    RateLimited(String),

    /// The data layer failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The session store failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A feature the request needs is not configured on this server.
    /// Unlike the other 500s the message is shown to the client.
    #[error("{0}")]
    Misconfigured(String),

    /// Any other server-side failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status this error renders as.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidUuid(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Store(_) | Self::Session(_) | Self::Misconfigured(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Shorthand for a [`Self::NotFound`] with a fixed message.
    pub fn not_found(message: &str) -> Self {
        Self::NotFound(message.to_owned())
    }

    /// The 401 returned whenever a route needs a logged-in user.
    pub fn not_authenticated() -> Self {
        Self::Unauthenticated(String::from("Not authenticated"))
    }
}

impl From<EconomyError> for ApiError {
    fn from(err: EconomyError) -> Self {
        match err {
            EconomyError::RatingOutOfRange
            | EconomyError::AlreadyOwned
            | EconomyError::InsufficientFunds { .. } => Self::Validation(err.to_string()),
            EconomyError::NegativeAmount(_) | EconomyError::BalanceOverflow => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        if rejection.status().is_server_error() {
            Self::Internal(rejection.body_text())
        } else {
            Self::Validation(rejection.body_text())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(String::from("File too large"))
        } else {
            Self::Validation(err.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Store(_) | Self::Session(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                String::from(INTERNAL_MESSAGE)
            }
            _ => self.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
