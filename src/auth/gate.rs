// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Per-request authentication gate.
//!
//! The gate inspects the `Authorization` header once per request and either
//! attaches an [`AuthenticatedUser`] to the request extensions or leaves the
//! request anonymous. It is total: no failure inside the gate ever becomes
//! an error response. Every invalid, expired, or tampered credential
//! degrades to anonymous and the request proceeds; the authorization policy
//! downstream (`policy.rs`) makes the final access decision.
//!
//! Supported credential shapes:
//! - `Authorization: Bearer <token>` — token authentication against the
//!   [`TokenService`](super::TokenService) and the user directory.
//! - `Authorization: Basic <base64(subject:secret)>` — deferred to the
//!   [`CredentialVerifier`](super::CredentialVerifier); the gate does no
//!   token work in this branch.
//! - Anything else — anonymous.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, Extensions, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64ct::{Base64, Encoding};

use super::AuthenticatedUser;
use crate::state::AppState;

/// Paths that bypass the gate entirely, regardless of header.
pub const GATE_EXEMPT_PATHS: &[&str] = &[
    "/api/users/request-password-reset",
    "/api/users/reset-password",
];

/// Minimum plausible length of a Bearer header value. Anything shorter is
/// skipped before any decoding work.
const MIN_BEARER_HEADER_LEN: usize = 10;

/// Authentication gate middleware.
pub async fn authentication_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if GATE_EXEMPT_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    if let Some(user) = resolve_principal(request.headers(), request.extensions(), &state).await {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

/// Evaluate the credential header and produce a principal, or nothing.
///
/// Every early return is "remain anonymous". This function must stay total:
/// it returns `Option`, never `Result`.
pub async fn resolve_principal(
    headers: &HeaderMap,
    extensions: &Extensions,
    state: &AppState,
) -> Option<AuthenticatedUser> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;

    if header.starts_with("Bearer ") {
        authenticate_bearer(header, extensions, state).await
    } else if header.starts_with("Basic ") {
        authenticate_basic(header, state).await
    } else {
        // Unrecognized scheme: pass through anonymous.
        None
    }
}

/// Token authentication sub-flow. Each guard falls back to anonymous.
async fn authenticate_bearer(
    header: &str,
    extensions: &Extensions,
    state: &AppState,
) -> Option<AuthenticatedUser> {
    // Shape checks before any cryptographic work.
    if header.len() < MIN_BEARER_HEADER_LEN {
        tracing::debug!("bearer credential too short, skipping authentication");
        return None;
    }
    let token = &header["Bearer ".len()..];
    if !token.contains('.') {
        tracing::debug!("bearer credential has no segment separator, skipping authentication");
        return None;
    }

    let subject = match state.tokens.extract_subject(token) {
        Ok(subject) => subject,
        Err(_) => {
            tracing::debug!("could not extract subject from token");
            return None;
        }
    };

    // Idempotent: an already-authenticated context is never re-authenticated.
    if extensions.get::<AuthenticatedUser>().is_some() {
        return None;
    }

    let user = state.store.read().await.user_by_email(&subject)?;

    if let Err(e) = state.tokens.validate(token) {
        tracing::debug!(subject = %subject, error = %e, "token validation failed");
        return None;
    }

    Some(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
        role: user.role,
    })
}

/// Basic scheme: decode the credential pair and defer to the verifier.
async fn authenticate_basic(header: &str, state: &AppState) -> Option<AuthenticatedUser> {
    let encoded = header["Basic ".len()..].trim();
    let decoded = Base64::decode_vec(encoded).ok()?;
    let pair = String::from_utf8(decoded).ok()?;
    let (subject, secret) = pair.split_once(':')?;

    let user = state.store.read().await.user_by_email(subject)?;
    if !state.verifier.verify(secret, &user.password_hash) {
        tracing::debug!(subject, "basic credential rejected");
        return None;
    }

    Some(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
        role: user.role,
    })
}
