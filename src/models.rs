// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! # API Data Models
//!
//! Request and response structures plus the two domain records: the
//! [`User`] principal and the [`Appointment`]. All types derive `Serialize`,
//! `Deserialize`, and `ToSchema` for JSON handling and OpenAPI documentation.
//!
//! ## Principal Shape
//!
//! There is one `User` record for every role. Role-specific data (a doctor's
//! specialization) lives in optional fields on the same record; code
//! dispatches by matching on the role tag, never by downcasting.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

// =============================================================================
// Principal
// =============================================================================

/// A registered principal: patient, doctor, or admin.
///
/// The email is the unique subject used in tokens and lookups. Identity is
/// immutable after creation; the role is fixed at registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Unique subject (login identifier).
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role, fixed at registration.
    pub role: Role,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Doctor-only payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

// =============================================================================
// Appointment
// =============================================================================

/// Workflow state of a booking request.
///
/// `Cancelled` is declared but never assigned: cancellation hard-deletes the
/// appointment instead of transitioning it. The variant is kept because the
/// counts projection reports it (always zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl AppointmentStatus {
    /// Parse any declared status, `cancelled` included.
    pub fn from_str(s: &str) -> Option<AppointmentStatus> {
        match s {
            "pending" => Some(AppointmentStatus::Pending),
            "accepted" => Some(AppointmentStatus::Accepted),
            "rejected" => Some(AppointmentStatus::Rejected),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }

    /// Parse a status-update target.
    ///
    /// Only `pending`, `accepted`, and `rejected` are valid targets;
    /// `cancelled` and unknown values are rejected.
    pub fn parse_update_target(s: &str) -> Option<AppointmentStatus> {
        match Self::from_str(s) {
            Some(AppointmentStatus::Cancelled) | None => None,
            status => status,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Accepted => write!(f, "accepted"),
            AppointmentStatus::Rejected => write!(f, "rejected"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A booked appointment between a patient and a doctor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Appointment {
    /// Unique identifier.
    pub id: i64,
    /// The doctor the appointment is with.
    pub doctor_id: i64,
    /// The patient who booked it.
    pub patient_id: i64,
    /// Appointment date.
    pub date: NaiveDate,
    /// Appointment time.
    pub time: NaiveTime,
    /// Free-text note from the patient.
    pub comment: String,
    /// Workflow state.
    pub status: AppointmentStatus,
    /// Set once at booking, never changed by later status updates.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Appointment Requests/Responses
// =============================================================================

/// Request to book an appointment. The patient is the authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookAppointmentRequest {
    /// Doctor to book with. Must reference a doctor-role principal.
    pub doctor_id: i64,
    /// Requested date.
    pub date: NaiveDate,
    /// Requested time.
    pub time: NaiveTime,
    /// Free-text note.
    #[serde(default)]
    pub comment: String,
}

/// Request to change an appointment's status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Target status: `pending`, `accepted`, or `rejected`.
    pub status: String,
}

/// One page of a doctor's appointments.
///
/// Field names match the envelope the frontend consumes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPage {
    pub content: Vec<Appointment>,
    pub total_pages: u64,
    pub total_elements: u64,
    pub current_page: u64,
    pub page_size: u64,
    pub is_last_page: bool,
}

/// Appointment counts by status for one doctor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AppointmentCounts {
    pub pending: u64,
    pub accepted: u64,
    pub rejected: u64,
    /// Always zero: no code path assigns the cancelled status.
    pub cancelled: u64,
}

// =============================================================================
// Auth Requests/Responses
// =============================================================================

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Patient self-registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterPatientRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Successful login or registration response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Signed access token.
    pub token: String,
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
}

// =============================================================================
// Password Reset Requests
// =============================================================================

/// Request a password reset code by email.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestPasswordResetRequest {
    pub email: String,
}

/// Redeem a reset code for a new password.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}
