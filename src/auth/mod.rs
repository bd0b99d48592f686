// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! # Authentication and Authorization
//!
//! Two independent layers gate every request:
//!
//! 1. The [`gate`] middleware inspects the `Authorization` header and
//!    attaches an [`AuthenticatedUser`] to the request, or leaves it
//!    anonymous. The gate is fail-open: every credential failure degrades
//!    to anonymous, never to an error response.
//! 2. The [`policy`] middleware checks the route's requirement against the
//!    attached principal and rejects violations with 403.
//!
//! Splitting the layers keeps authentication total (no exception can escape
//! the gate) while authorization stays a pure table lookup.

pub mod error;
pub mod extractor;
pub mod gate;
pub mod password;
pub mod policy;
pub mod roles;
pub mod token;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use error::AuthError;
pub use extractor::Auth;
pub use password::CredentialVerifier;
pub use roles::Role;
pub use token::{TokenError, TokenService};

/// The principal attached to a request by the gate.
///
/// Carries only what handlers need: the directory id, the subject, and the
/// role the authorization policy dispatches on.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Directory id of the principal.
    pub user_id: i64,
    /// Subject (email) the token or credential pair resolved to.
    pub email: String,
    /// Role, as recorded in the directory (not taken from the token).
    pub role: Role,
}
