// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Login and registration endpoints.

use axum::{extract::State, Json};

use crate::{
    auth::Role,
    error::ApiError,
    models::{AuthResponse, LoginRequest, RegisterPatientRequest, User},
    state::AppState,
};

fn auth_response(state: &AppState, user: &User) -> Result<AuthResponse, ApiError> {
    let token = state
        .tokens
        .issue(user)
        .map_err(|e| ApiError::internal(format!("Failed to issue token: {e}")))?;
    Ok(AuthResponse {
        token,
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
    })
}

/// Authenticate with email and password and receive an access token.
///
/// Unknown email and wrong password produce the same response, so the
/// endpoint does not leak which accounts exist.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Bad credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = {
        let store = state.store.read().await;
        store.user_by_email(&request.email)
    };

    let user = match user {
        Some(user) if state.verifier.verify(&request.password, &user.password_hash) => user,
        _ => {
            tracing::debug!(email = %request.email, "login rejected");
            return Err(ApiError::bad_request("Invalid credentials"));
        }
    };

    tracing::info!(email = %user.email, role = %user.role, "login successful");
    Ok(Json(auth_response(&state, &user)?))
}

/// Register a patient account and log it straight in.
#[utoipa::path(
    post,
    path = "/api/auth/register/patient",
    request_body = RegisterPatientRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Registered", body = AuthResponse),
        (status = 400, description = "Duplicate email or invalid input")
    )
)]
pub async fn register_patient(
    State(state): State<AppState>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if request.email.is_empty() || request.password.is_empty() || request.name.is_empty() {
        return Err(ApiError::bad_request("Name, email, and password are required"));
    }

    let hash = state
        .verifier
        .hash(&request.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;

    let user = state.store.write().await.insert_user(
        request.email,
        request.name,
        Role::Patient,
        hash,
        None,
    )?;

    tracing::info!(email = %user.email, "patient registered");
    Ok(Json(auth_response(&state, &user)?))
}
