// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Password reset endpoints.
//!
//! Both endpoints bypass the authentication gate (see
//! [`crate::auth::gate::GATE_EXEMPT_PATHS`]) and are public in the policy
//! table. The request endpoint answers 200 no matter what, so callers
//! cannot probe which accounts exist.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    models::{RequestPasswordResetRequest, ResetPasswordRequest},
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Request a password reset code by email.
///
/// Always answers 200. For a known account a fresh code is stored and
/// handed to the notification sender; if the send fails, the stored code is
/// rolled back so no valid-looking code exists without an email behind it.
#[utoipa::path(
    post,
    path = "/api/users/request-password-reset",
    request_body = RequestPasswordResetRequest,
    tag = "Users",
    responses(
        (status = 200, description = "Always, regardless of account existence", body = MessageResponse)
    )
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<RequestPasswordResetRequest>,
) -> Json<MessageResponse> {
    let user = {
        let store = state.store.read().await;
        store.user_by_email(&request.email)
    };

    if let Some(user) = user {
        let code = state.reset_codes.put(&user.email);
        if let Err(e) = state.notifier.send_password_reset(&user.email, &code) {
            // Roll back: the code must not survive an unsent email.
            state.reset_codes.remove(&user.email);
            tracing::warn!(email = %user.email, error = %e, "reset code delivery failed");
        }
    } else {
        tracing::debug!(email = %request.email, "reset requested for unknown email");
    }

    Json(MessageResponse {
        message: "Reset code sent if the email exists.".to_string(),
    })
}

/// Redeem a reset code for a new password.
#[utoipa::path(
    post,
    path = "/api/users/reset-password",
    request_body = ResetPasswordRequest,
    tag = "Users",
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired reset code")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.reset_codes.consume(&request.email, &request.code) {
        return Err(ApiError::bad_request("Invalid reset code"));
    }

    let hash = state
        .verifier
        .hash(&request.new_password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;

    state
        .store
        .write()
        .await
        .set_password_hash(&request.email, hash)?;

    tracing::info!(email = %request.email, "password reset");
    Ok(Json(MessageResponse {
        message: "Password reset successful.".to_string(),
    }))
}
