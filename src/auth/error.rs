// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Authorization errors.
//!
//! Only authorization failures produce error responses. Authentication
//! failures are always recovered inside the gate and collapse to an
//! anonymous context, so they never appear here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authorization error type.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// The route requires an authenticated principal and none is attached.
    NotAuthenticated,
    /// The attached principal does not carry a required role.
    InsufficientRole,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "not_authenticated",
            AuthError::InsufficientRole => "insufficient_role",
        }
    }

    /// Get the HTTP status code for this error.
    ///
    /// Both variants map to 403: the outcome of the authorization policy,
    /// applied after the gate has already settled the principal question.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::FORBIDDEN
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NotAuthenticated => write!(f, "Authentication required"),
            AuthError::InsufficientRole => {
                write!(f, "Insufficient permissions for this operation")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_variants_are_forbidden() {
        assert_eq!(AuthError::NotAuthenticated.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::InsufficientRole.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn error_codes_are_distinct() {
        assert_ne!(
            AuthError::NotAuthenticated.error_code(),
            AuthError::InsufficientRole.error_code()
        );
    }
}
