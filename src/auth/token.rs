// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Token issuance and validation.
//!
//! Tokens are compact JWTs signed with a shared HS256 secret: three
//! dot-separated base64url segments (header, payload, signature). They are
//! never persisted; a token is reconstructible only from its serialized form
//! plus the signing secret.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::User;

/// Token validation failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Current time is at or past the token's expiry.
    #[error("token has expired")]
    Expired,
    /// Signature does not match header and payload.
    #[error("token signature is invalid")]
    BadSignature,
    /// Token is not a structurally valid JWT.
    #[error("token is malformed")]
    Malformed,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the principal's email.
    pub sub: String,
    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,
    /// Expiry timestamp (Unix seconds).
    pub exp: i64,
}

/// Stateless token service: a pure function of the shared secret and claims.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No clock-skew allowance.
        validation.leeway = 0;
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
            validation,
        }
    }

    /// Issue a token for the given principal.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now().timestamp())
    }

    /// Issue a token with an explicit issue timestamp.
    pub fn issue_at(&self, user: &User, issued_at: i64) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: user.email.clone(),
            iat: issued_at,
            exp: issued_at + self.ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Malformed)
    }

    /// Verify the signature and expiry of a token and return its claims.
    ///
    /// Expiry is exclusive: a token is rejected from the instant the clock
    /// reaches `exp`, not one second after.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?;

        // The library's expiry check still passes at exactly `exp`.
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Extract the subject without verifying the signature.
    ///
    /// Used only as a fast pre-check before full validation; never treat the
    /// result as authenticated.
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
            .map(|data| data.claims.sub)
            .map_err(|_| TokenError::Malformed)
    }
}
