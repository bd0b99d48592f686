// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Credential verification for the Basic scheme and login.
//!
//! Passwords are hashed with Argon2 and compared in constant time by the
//! `argon2` crate. This is the only place password material is handled.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes and verifies principal passwords.
#[derive(Default)]
pub struct CredentialVerifier {
    argon2: Argon2<'static>,
}

impl CredentialVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash a password for storage.
    pub fn hash(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }

    /// Check a candidate password against a stored hash.
    ///
    /// Returns `false` for any failure, including an unparseable stored hash.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
