// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TOKEN_SECRET` | HMAC secret for signing access tokens | Required |
//! | `TOKEN_TTL_SECS` | Access token lifetime in seconds | `3600` |
//! | `RESET_CODE_TTL_SECS` | Password reset code lifetime in seconds | `600` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

/// Environment variable name for the token signing secret.
///
/// The secret is shared between token issuance and validation. Its absence
/// is a startup failure, never a per-request one.
pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";

/// Environment variable name for the access token lifetime.
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";

/// Environment variable name for the reset code lifetime.
pub const RESET_CODE_TTL_ENV: &str = "RESET_CODE_TTL_SECS";

/// Default access token lifetime: one hour.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Default reset code lifetime: ten minutes (matches the wording of the
/// reset email).
pub const DEFAULT_RESET_CODE_TTL_SECS: u64 = 600;

/// Configuration loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Secret used to sign and verify access tokens.
    pub token_secret: String,
    /// Access token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Reset code lifetime in seconds.
    pub reset_code_ttl_secs: u64,
}

impl ServerConfig {
    /// Load configuration from the environment.
    ///
    /// Returns an error message if `TOKEN_SECRET` is missing or empty.
    pub fn from_env() -> Result<Self, String> {
        let token_secret =
            env::var(TOKEN_SECRET_ENV).map_err(|_| format!("{TOKEN_SECRET_ENV} must be set"))?;
        if token_secret.is_empty() {
            return Err(format!("{TOKEN_SECRET_ENV} must not be empty"));
        }

        let token_ttl_secs = env::var(TOKEN_TTL_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        let reset_code_ttl_secs = env::var(RESET_CODE_TTL_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RESET_CODE_TTL_SECS);

        Ok(Self {
            token_secret,
            token_ttl_secs,
            reset_code_ttl_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        assert_eq!(DEFAULT_TOKEN_TTL_SECS, 3600);
        assert_eq!(DEFAULT_RESET_CODE_TTL_SECS, 600);
    }
}
