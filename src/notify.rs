// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Outbound notifications.
//!
//! Email delivery is an external collaborator. The server depends only on
//! the [`NotificationSender`] trait; the default implementation logs the
//! delivery instead of speaking SMTP.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to deliver notification: {0}")]
    Delivery(String),
}

/// Delivers reset codes to principals.
pub trait NotificationSender: Send + Sync {
    fn send_password_reset(&self, to: &str, code: &str) -> Result<(), NotifyError>;
}

/// Default sender: logs the delivery.
///
/// Stands in for a real mail relay in development and tests. The code is
/// deliberately not logged at info level.
#[derive(Default)]
pub struct LogSender;

impl NotificationSender for LogSender {
    fn send_password_reset(&self, to: &str, code: &str) -> Result<(), NotifyError> {
        tracing::info!(to, "password reset code issued");
        tracing::debug!(to, code, "reset code contents");
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Test sender that records deliveries and can be made to fail.
    #[derive(Default)]
    pub struct RecordingSender {
        pub fail: bool,
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSender {
        pub fn failing() -> Self {
            Self {
                fail: true,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl NotificationSender for RecordingSender {
        fn send_password_reset(&self, to: &str, code: &str) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Delivery("smtp unavailable".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), code.to_string()));
            Ok(())
        }
    }
}
