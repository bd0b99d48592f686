// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Password reset code store.
//!
//! An owned, in-process map from subject email to its latest reset code.
//! A code is invalidated three ways: overwritten by a newer code for the
//! same subject, consumed exactly once by a successful reset, or aged past
//! its TTL. The TTL matches the expiry promised in the reset email; there
//! is no background eviction, stale entries are rejected lazily at consume
//! time.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use argon2::password_hash::rand_core::{OsRng, RngCore};

struct StoredCode {
    code: String,
    issued_at: Instant,
}

/// Single-process reset code store. Constructed once and shared via
/// [`crate::state::AppState`].
pub struct ResetCodeStore {
    codes: Mutex<HashMap<String, StoredCode>>,
    ttl: Duration,
}

impl ResetCodeStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Generate and store a fresh 6-digit code for the subject, replacing
    /// any previous one.
    pub fn put(&self, email: &str) -> String {
        let code = format!("{:06}", OsRng.next_u32() % 900_000 + 100_000);
        self.put_code(email, code.clone());
        code
    }

    /// Store an explicit code for the subject.
    pub fn put_code(&self, email: &str, code: String) {
        let mut codes = self.codes.lock().expect("reset code lock poisoned");
        codes.insert(
            email.to_string(),
            StoredCode {
                code,
                issued_at: Instant::now(),
            },
        );
    }

    /// Remove the subject's code without consuming it.
    ///
    /// Used to roll back a stored code when the notification send fails, so
    /// no valid-looking code survives without an email behind it.
    pub fn remove(&self, email: &str) {
        let mut codes = self.codes.lock().expect("reset code lock poisoned");
        codes.remove(email);
    }

    /// Whether a code is currently stored for the subject.
    #[cfg(test)]
    pub(crate) fn contains(&self, email: &str) -> bool {
        self.codes
            .lock()
            .expect("reset code lock poisoned")
            .contains_key(email)
    }

    /// Consume a code: succeeds at most once per stored code, and only if
    /// the candidate matches and the code is inside its TTL.
    pub fn consume(&self, email: &str, candidate: &str) -> bool {
        let mut codes = self.codes.lock().expect("reset code lock poisoned");
        match codes.get(email) {
            Some(stored) if stored.code == candidate => {
                let expired = stored.issued_at.elapsed() > self.ttl;
                codes.remove(email);
                !expired
            }
            // A mismatched candidate does not burn the stored code.
            _ => false,
        }
    }
}
