// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Axum extractor for the gate's output.
//!
//! Handlers that need the calling principal take `Auth(user)`. The
//! extractor only reads what the gate attached to the request extensions;
//! it never performs authentication itself. An absent principal rejects
//! with 403, the authorization-policy outcome, since by the time a handler
//! runs the gate has already settled the authentication question.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for the authenticated caller.
///
/// ```rust,ignore
/// async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
///     // user is AuthenticatedUser
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::NotAuthenticated)
    }
}
