//! HTTP handlers for the portal API, grouped by area.
//!
//! Handlers return `Result<impl IntoResponse, ApiError>`. Shared request
//! plumbing lives here: extractors whose rejections render as JSON
//! errors, path id parsing and ordered validation.

pub mod account;
pub mod admin;
pub mod catalog;
pub mod economy;
pub mod interaction;
pub mod play;
pub mod upload;

use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;

/// `axum::Json` whose rejections render as [`ApiError`] bodies.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` whose rejections render as [`ApiError`] bodies.
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `axum::extract::Path` whose rejections render as [`ApiError`] bodies.
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Multipart` whose rejections render as [`ApiError`]
/// bodies. A request without a multipart content type is a 400.
#[derive(Debug)]
pub struct ApiMultipart(pub Multipart);

impl<S: Send + Sync> FromRequest<S> for ApiMultipart {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Multipart::from_request(req, state)
            .await
            .map(Self)
            .map_err(ApiError::from)
    }
}

/// `{"success": true}`
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Success {
    /// Always `true`.
    pub success: bool,
}

impl Success {
    /// The success body.
    pub const OK: Self = Self { success: true };
}

/// `GET /health` -- liveness probe.
#[allow(clippy::unused_async)] // Axum handlers must be async.
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

/// Parse a UUID path segment, returning a 400 on failure.
pub fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}

/// Run `value`'s validation rules and report the first failure.
///
/// `fields` lists the struct's fields in the order they should be
/// reported; failures on unlisted fields come last, by name.
pub fn validate_in_order<T: Validate>(value: &T, fields: &[&str]) -> Result<(), ApiError> {
    let Err(errors) = value.validate() else {
        return Ok(());
    };

    let field_errors = errors.field_errors();
    let mut failed: Vec<(&str, String)> = field_errors
        .iter()
        .filter_map(|(field, errs)| {
            let message = errs.first().map(|err| {
                err.message
                    .as_ref()
                    .map_or_else(|| format!("Invalid {field}"), ToString::to_string)
            })?;
            Some((field.as_ref(), message))
        })
        .collect();
    failed.sort_by_key(|(field, _)| {
        (
            fields.iter().position(|f| f == field).unwrap_or(usize::MAX),
            *field,
        )
    });

    let message = failed
        .into_iter()
        .next()
        .map_or_else(|| String::from("Invalid request"), |(_, message)| message);
    Err(ApiError::Validation(message))
}
