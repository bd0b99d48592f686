// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! In-memory backing store: the user directory and the appointment table.
//!
//! Every mutation takes `&mut self` and runs to completion under the write
//! half of the `RwLock` in [`crate::state::AppState`]. That makes each
//! operation a single atomic read-check-write unit, which is the transaction
//! boundary the appointment workflow relies on: a concurrent cancel and
//! status update against the same id serialize, and the loser observes
//! NotFound instead of acting on a stale row.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::auth::Role;
use crate::error::ApiError;
use crate::models::{
    Appointment, AppointmentCounts, AppointmentPage, AppointmentStatus, User,
};

#[derive(Default)]
pub struct InMemoryStore {
    users: HashMap<i64, User>,
    appointments: HashMap<i64, Appointment>,
    next_user_id: i64,
    next_appointment_id: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // User directory
    // -------------------------------------------------------------------------

    /// Insert a principal. Fails if the email is already registered.
    pub fn insert_user(
        &mut self,
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        password_hash: impl Into<String>,
        specialization: Option<String>,
    ) -> Result<User, ApiError> {
        let email = email.into();
        if self.user_by_email(&email).is_some() {
            return Err(ApiError::bad_request(format!(
                "User already exists with email: {email}"
            )));
        }

        self.next_user_id += 1;
        let user = User {
            id: self.next_user_id,
            email,
            name: name.into(),
            role,
            password_hash: password_hash.into(),
            specialization,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.users.values().find(|u| u.email == email).cloned()
    }

    pub fn user_by_id(&self, user_id: i64) -> Option<User> {
        self.users.get(&user_id).cloned()
    }

    /// Replace a principal's password hash.
    pub fn set_password_hash(&mut self, email: &str, hash: String) -> Result<(), ApiError> {
        let user = self
            .users
            .values_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| ApiError::not_found(format!("No user with email: {email}")))?;
        user.password_hash = hash;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Appointment workflow
    // -------------------------------------------------------------------------

    /// Book an appointment for the calling patient with the given doctor.
    ///
    /// The caller must resolve to a patient-role principal and the doctor id
    /// to a doctor-role principal. No slot-exclusivity check is performed:
    /// any number of appointments may share a doctor, date, and time.
    pub fn book_appointment(
        &mut self,
        doctor_id: i64,
        caller_email: &str,
        date: NaiveDate,
        time: NaiveTime,
        comment: String,
        now: DateTime<Utc>,
    ) -> Result<Appointment, ApiError> {
        let patient = self
            .user_by_email(caller_email)
            .ok_or_else(|| ApiError::forbidden("Patient not found for the logged-in user"))?;
        if patient.role != Role::Patient {
            return Err(ApiError::forbidden("Only patients can book appointments"));
        }

        let doctor = self
            .user_by_id(doctor_id)
            .ok_or_else(|| ApiError::not_found(format!("Doctor not found with id {doctor_id}")))?;
        if doctor.role != Role::Doctor {
            return Err(ApiError::bad_request("Selected user is not a doctor"));
        }

        self.next_appointment_id += 1;
        let appointment = Appointment {
            id: self.next_appointment_id,
            doctor_id: doctor.id,
            patient_id: patient.id,
            date,
            time,
            comment,
            status: AppointmentStatus::Pending,
            created_at: now,
        };
        self.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    /// Cancel an appointment by deleting its row.
    ///
    /// Cancellation never assigns the `cancelled` status; the row simply
    /// ceases to exist.
    pub fn cancel_appointment(&mut self, appointment_id: i64) -> Result<(), ApiError> {
        if self.appointments.remove(&appointment_id).is_some() {
            Ok(())
        } else {
            Err(ApiError::not_found("Appointment not found"))
        }
    }

    /// Set an appointment's status to one of `pending`/`accepted`/`rejected`.
    ///
    /// The target set is validated before the row lookup, so a bad status
    /// value is a 400 even when the appointment is also missing. No
    /// transition-origin check is made: any current status may move to any
    /// valid target.
    pub fn update_status(
        &mut self,
        appointment_id: i64,
        new_status: &str,
    ) -> Result<Appointment, ApiError> {
        let status = AppointmentStatus::parse_update_target(new_status).ok_or_else(|| {
            ApiError::bad_request(format!("Invalid appointment status: {new_status}"))
        })?;

        let appointment = self
            .appointments
            .get_mut(&appointment_id)
            .ok_or_else(|| {
                ApiError::not_found(format!("Appointment not found with id: {appointment_id}"))
            })?;
        appointment.status = status;
        Ok(appointment.clone())
    }

    /// One page of a doctor's appointments.
    ///
    /// Ordered by date ascending, id ascending as the tie-break, so repeated
    /// calls paginate identically when nothing was written in between.
    pub fn list_for_doctor(&self, doctor_id: i64, page: u64, page_size: u64) -> AppointmentPage {
        let mut rows: Vec<Appointment> = self
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

        let total_elements = rows.len() as u64;
        let page_size = page_size.max(1);
        let total_pages = total_elements.div_ceil(page_size);

        // `page` is caller-supplied; an offset past u64 (or past the rows)
        // is just an empty page, never an overflow.
        let content: Vec<Appointment> = match page.checked_mul(page_size) {
            Some(start) => rows
                .into_iter()
                .skip(usize::try_from(start).unwrap_or(usize::MAX))
                .take(page_size as usize)
                .collect(),
            None => Vec::new(),
        };

        AppointmentPage {
            content,
            total_pages,
            total_elements,
            current_page: page,
            page_size,
            is_last_page: page.saturating_add(1) >= total_pages,
        }
    }

    /// All appointments booked by one patient.
    pub fn list_for_patient(&self, patient_id: i64) -> Vec<Appointment> {
        let mut rows: Vec<Appointment> = self
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        rows
    }

    /// A doctor's appointments holding one particular status.
    pub fn list_for_doctor_with_status(
        &self,
        doctor_id: i64,
        status: AppointmentStatus,
    ) -> Vec<Appointment> {
        let mut rows: Vec<Appointment> = self
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.status == status)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        rows
    }

    /// A doctor's most recent appointments, newest date first.
    pub fn recent_for_doctor(&self, doctor_id: i64, limit: usize) -> Vec<Appointment> {
        let mut rows: Vec<Appointment> = self
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        rows.truncate(limit);
        rows
    }

    /// Appointment counts by status for one doctor.
    ///
    /// `cancelled` is reported for completeness but is always zero, since
    /// cancellation deletes rows instead of transitioning them.
    pub fn counts_for_doctor(&self, doctor_id: i64) -> AppointmentCounts {
        let mut counts = AppointmentCounts {
            pending: 0,
            accepted: 0,
            rejected: 0,
            cancelled: 0,
        };
        for a in self.appointments.values().filter(|a| a.doctor_id == doctor_id) {
            match a.status {
                AppointmentStatus::Pending => counts.pending += 1,
                AppointmentStatus::Accepted => counts.accepted += 1,
                AppointmentStatus::Rejected => counts.rejected += 1,
                AppointmentStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    pub fn appointment_by_id(&self, appointment_id: i64) -> Option<Appointment> {
        self.appointments.get(&appointment_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn seeded_store() -> (InMemoryStore, User, User) {
        let mut store = InMemoryStore::new();
        let doctor = store
            .insert_user("doc@example.com", "Doc", Role::Doctor, "hash", Some("cardiology".into()))
            .unwrap();
        let patient = store
            .insert_user("pat1@example.com", "Pat", Role::Patient, "hash", None)
            .unwrap();
        (store, doctor, patient)
    }

    fn book(
        store: &mut InMemoryStore,
        doctor_id: i64,
        date: &str,
        time: &str,
    ) -> Appointment {
        store
            .book_appointment(
                doctor_id,
                "pat1@example.com",
                date.parse().unwrap(),
                time.parse().unwrap(),
                "checkup".into(),
                Utc::now(),
            )
            .unwrap()
    }

    #[test]
    fn duplicate_email_rejected() {
        let (mut store, _, _) = seeded_store();
        let err = store
            .insert_user("doc@example.com", "Dup", Role::Patient, "hash", None)
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn booking_creates_pending_appointment() {
        let (mut store, doctor, patient) = seeded_store();
        let appointment = book(&mut store, doctor.id, "2024-06-01", "10:00:00");

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.doctor_id, doctor.id);
        assert_eq!(appointment.patient_id, patient.id);
        assert_eq!(appointment.comment, "checkup");
    }

    #[test]
    fn booking_unknown_doctor_is_not_found() {
        let (mut store, _, _) = seeded_store();
        let err = store
            .book_appointment(
                999,
                "pat1@example.com",
                "2024-06-01".parse().unwrap(),
                "10:00:00".parse().unwrap(),
                String::new(),
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn booking_patient_as_doctor_is_role_mismatch() {
        let (mut store, _, patient) = seeded_store();
        // doctor_id pointing at a patient-role principal
        let err = store
            .book_appointment(
                patient.id,
                "pat1@example.com",
                "2024-06-01".parse().unwrap(),
                "10:00:00".parse().unwrap(),
                String::new(),
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn booking_caller_must_be_patient() {
        let (mut store, doctor, _) = seeded_store();
        let err = store
            .book_appointment(
                doctor.id,
                "doc@example.com",
                "2024-06-01".parse().unwrap(),
                "10:00:00".parse().unwrap(),
                String::new(),
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn double_booking_same_slot_is_allowed() {
        let (mut store, doctor, _) = seeded_store();
        let first = book(&mut store, doctor.id, "2024-06-01", "10:00:00");
        let second = book(&mut store, doctor.id, "2024-06-01", "10:00:00");
        assert_ne!(first.id, second.id);
        assert_eq!(store.list_for_doctor(doctor.id, 0, 10).total_elements, 2);
    }

    #[test]
    fn cancel_deletes_instead_of_marking_cancelled() {
        let (mut store, doctor, _) = seeded_store();
        let appointment = book(&mut store, doctor.id, "2024-06-01", "10:00:00");

        store.cancel_appointment(appointment.id).unwrap();
        assert!(store.appointment_by_id(appointment.id).is_none());

        let err = store.cancel_appointment(appointment.id).unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn update_status_rejects_cancelled_before_lookup() {
        let (mut store, _, _) = seeded_store();
        // Validation error even though the id does not exist either.
        let err = store.update_status(12345, "cancelled").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = store.update_status(12345, "approved").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn update_status_missing_row_is_not_found() {
        let (mut store, _, _) = seeded_store();
        let err = store.update_status(12345, "accepted").unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn update_status_ignores_transition_origin() {
        let (mut store, doctor, _) = seeded_store();
        let appointment = book(&mut store, doctor.id, "2024-06-01", "10:00:00");

        let rejected = store.update_status(appointment.id, "rejected").unwrap();
        assert_eq!(rejected.status, AppointmentStatus::Rejected);

        // rejected -> pending is permitted; there is no origin check.
        let pending = store.update_status(appointment.id, "pending").unwrap();
        assert_eq!(pending.status, AppointmentStatus::Pending);
    }

    #[test]
    fn created_at_survives_status_updates() {
        let (mut store, doctor, _) = seeded_store();
        let appointment = book(&mut store, doctor.id, "2024-06-01", "10:00:00");
        let created_at = appointment.created_at;

        let updated = store.update_status(appointment.id, "accepted").unwrap();
        assert_eq!(updated.created_at, created_at);
    }

    #[test]
    fn doctor_listing_orders_by_date_then_id() {
        let (mut store, doctor, _) = seeded_store();
        let b = book(&mut store, doctor.id, "2024-06-02", "09:00:00");
        let a = book(&mut store, doctor.id, "2024-06-01", "11:00:00");
        let c = book(&mut store, doctor.id, "2024-06-02", "08:00:00");

        let page = store.list_for_doctor(doctor.id, 0, 10);
        let ids: Vec<i64> = page.content.iter().map(|x| x.id).collect();
        // Same date sorts by id, not by time.
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn doctor_listing_is_stable_across_calls() {
        let (mut store, doctor, _) = seeded_store();
        for day in 1..=7 {
            book(&mut store, doctor.id, &format!("2024-06-0{day}"), "10:00:00");
        }

        let first = store.list_for_doctor(doctor.id, 0, 5);
        let second = store.list_for_doctor(doctor.id, 0, 5);
        assert_eq!(first.content, second.content);
        assert_eq!(first.total_elements, second.total_elements);
    }

    #[test]
    fn pagination_envelope_math() {
        let (mut store, doctor, _) = seeded_store();
        for day in 1..=7 {
            book(&mut store, doctor.id, &format!("2024-06-0{day}"), "10:00:00");
        }

        let first = store.list_for_doctor(doctor.id, 0, 5);
        assert_eq!(first.content.len(), 5);
        assert_eq!(first.total_elements, 7);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.current_page, 0);
        assert!(!first.is_last_page);

        let last = store.list_for_doctor(doctor.id, 1, 5);
        assert_eq!(last.content.len(), 2);
        assert!(last.is_last_page);

        let empty = store.list_for_doctor(999, 0, 5);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.is_last_page);
    }

    #[test]
    fn pagination_survives_extreme_page_numbers() {
        let (mut store, doctor, _) = seeded_store();
        book(&mut store, doctor.id, "2024-06-01", "10:00:00");

        let page = store.list_for_doctor(doctor.id, u64::MAX, 5);
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 1);
        assert!(page.is_last_page);

        // Offset overflow (page * size past u64) also yields an empty page.
        let page = store.list_for_doctor(doctor.id, u64::MAX, u64::MAX);
        assert!(page.content.is_empty());
    }

    #[test]
    fn recent_for_doctor_is_newest_first_and_limited() {
        let (mut store, doctor, _) = seeded_store();
        for day in 1..=5 {
            book(&mut store, doctor.id, &format!("2024-06-0{day}"), "10:00:00");
        }

        let recent = store.recent_for_doctor(doctor.id, 3);
        assert_eq!(recent.len(), 3);
        let dates: Vec<String> = recent.iter().map(|a| a.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-06-05", "2024-06-04", "2024-06-03"]);
    }

    #[test]
    fn counts_track_statuses_and_cancelled_stays_zero() {
        let (mut store, doctor, _) = seeded_store();
        let a = book(&mut store, doctor.id, "2024-06-01", "10:00:00");
        let b = book(&mut store, doctor.id, "2024-06-02", "10:00:00");
        book(&mut store, doctor.id, "2024-06-03", "10:00:00");

        store.update_status(a.id, "accepted").unwrap();
        store.update_status(b.id, "rejected").unwrap();

        let counts = store.counts_for_doctor(doctor.id);
        assert_eq!(
            counts,
            AppointmentCounts {
                pending: 1,
                accepted: 1,
                rejected: 1,
                cancelled: 0,
            }
        );
    }

    #[test]
    fn status_listing_filters_and_orders() {
        let (mut store, doctor, _) = seeded_store();
        let a = book(&mut store, doctor.id, "2024-06-02", "10:00:00");
        let b = book(&mut store, doctor.id, "2024-06-01", "10:00:00");
        book(&mut store, doctor.id, "2024-06-03", "10:00:00");

        store.update_status(a.id, "rejected").unwrap();
        store.update_status(b.id, "rejected").unwrap();

        let rejected = store.list_for_doctor_with_status(doctor.id, AppointmentStatus::Rejected);
        let ids: Vec<i64> = rejected.iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);

        // No row can hold cancelled, so the filter is always empty for it.
        let cancelled =
            store.list_for_doctor_with_status(doctor.id, AppointmentStatus::Cancelled);
        assert!(cancelled.is_empty());
    }

    #[test]
    fn patient_listing_filters_by_patient() {
        let (mut store, doctor, patient) = seeded_store();
        let other = store
            .insert_user("pat2@example.com", "Other", Role::Patient, "hash", None)
            .unwrap();
        book(&mut store, doctor.id, "2024-06-01", "10:00:00");
        store
            .book_appointment(
                doctor.id,
                &other.email,
                "2024-06-02".parse().unwrap(),
                "10:00:00".parse().unwrap(),
                String::new(),
                Utc::now(),
            )
            .unwrap();

        let mine = store.list_for_patient(patient.id);
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].patient_id, patient.id);
    }
}
