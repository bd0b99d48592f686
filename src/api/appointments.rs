// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Appointment lifecycle endpoints.
//!
//! The route-level role requirements live in the authorization policy;
//! handlers re-check the caller's role against the directory before acting,
//! so a handler invoked outside the middleware stack behaves the same way.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth::{Auth, Role},
    error::ApiError,
    models::{
        Appointment, AppointmentCounts, AppointmentPage, AppointmentStatus,
        BookAppointmentRequest, UpdateStatusRequest,
    },
    state::AppState,
};

/// How many appointments the recent listing returns.
const RECENT_LIMIT: usize = 3;

#[derive(Deserialize, IntoParams)]
pub struct PageQuery {
    /// Zero-based page number.
    #[serde(default)]
    pub page: u64,
    /// Page size.
    #[serde(default = "default_page_size")]
    pub size: u64,
}

fn default_page_size() -> u64 {
    5
}

/// Book an appointment with a doctor. The caller is the patient.
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = BookAppointmentRequest,
    tag = "Appointments",
    responses(
        (status = 200, description = "Appointment created with pending status", body = Appointment),
        (status = 400, description = "Referenced user is not a doctor"),
        (status = 403, description = "Caller is not a patient"),
        (status = 404, description = "Doctor not found")
    )
)]
pub async fn book_appointment(
    State(state): State<AppState>,
    Auth(user): Auth,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = state.store.write().await.book_appointment(
        request.doctor_id,
        &user.email,
        request.date,
        request.time,
        request.comment,
        Utc::now(),
    )?;

    tracing::info!(
        appointment_id = appointment.id,
        doctor_id = appointment.doctor_id,
        patient_id = appointment.patient_id,
        "appointment booked"
    );
    Ok(Json(appointment))
}

/// Cancel an appointment. The row is deleted outright; nothing is ever
/// marked with the `cancelled` status.
#[utoipa::path(
    delete,
    path = "/api/appointments/{appointment_id}",
    params(
        ("appointment_id" = i64, Path, description = "Identifier of the appointment to cancel")
    ),
    tag = "Appointments",
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn cancel_appointment(
    Path(appointment_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.store.write().await.cancel_appointment(appointment_id)?;
    tracing::info!(appointment_id, "appointment cancelled");
    Ok(StatusCode::NO_CONTENT)
}

/// Move an appointment to `pending`, `accepted`, or `rejected`.
#[utoipa::path(
    put,
    path = "/api/appointments/{appointment_id}/status",
    params(
        ("appointment_id" = i64, Path, description = "Identifier of the appointment")
    ),
    request_body = UpdateStatusRequest,
    tag = "Appointments",
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 400, description = "Invalid status value"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn update_status(
    Path(appointment_id): Path<i64>,
    State(state): State<AppState>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = state
        .store
        .write()
        .await
        .update_status(appointment_id, &request.status)?;
    tracing::info!(appointment_id, status = %appointment.status, "appointment status updated");
    Ok(Json(appointment))
}

/// One page of the calling doctor's appointments, date then id ascending.
#[utoipa::path(
    get,
    path = "/api/appointments/doctor",
    params(PageQuery),
    tag = "Appointments",
    responses(
        (status = 200, description = "Page of appointments", body = AppointmentPage),
        (status = 403, description = "Caller is not a doctor")
    )
)]
pub async fn doctor_appointments(
    State(state): State<AppState>,
    Auth(user): Auth,
    Query(params): Query<PageQuery>,
) -> Result<Json<AppointmentPage>, ApiError> {
    if user.role != Role::Doctor {
        return Err(ApiError::forbidden("Only doctors can view their appointments"));
    }
    let store = state.store.read().await;
    Ok(Json(store.list_for_doctor(user.user_id, params.page, params.size)))
}

/// The calling patient's appointments.
#[utoipa::path(
    get,
    path = "/api/appointments/patient",
    tag = "Appointments",
    responses(
        (status = 200, description = "Appointments booked by the caller", body = [Appointment]),
        (status = 403, description = "Caller is not a patient")
    )
)]
pub async fn patient_appointments(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    if user.role != Role::Patient {
        return Err(ApiError::forbidden("Only patients can view their appointments"));
    }
    let store = state.store.read().await;
    Ok(Json(store.list_for_patient(user.user_id)))
}

/// The calling doctor's appointments holding one particular status.
#[utoipa::path(
    get,
    path = "/api/appointments/doctor/status/{status}",
    params(
        ("status" = String, Path, description = "Status to filter by")
    ),
    tag = "Appointments",
    responses(
        (status = 200, description = "Appointments with the given status", body = [Appointment]),
        (status = 400, description = "Unknown status value"),
        (status = 403, description = "Caller is not a doctor")
    )
)]
pub async fn doctor_appointments_by_status(
    Path(status): Path<String>,
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    if user.role != Role::Doctor {
        return Err(ApiError::forbidden("Only doctors can view their appointments"));
    }
    let status = AppointmentStatus::from_str(&status)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid appointment status: {status}")))?;
    let store = state.store.read().await;
    Ok(Json(store.list_for_doctor_with_status(user.user_id, status)))
}

/// The calling doctor's most recent appointments, newest first.
#[utoipa::path(
    get,
    path = "/api/appointments/doctor/recent",
    tag = "Appointments",
    responses(
        (status = 200, description = "Most recent appointments", body = [Appointment]),
        (status = 403, description = "Caller is not a doctor")
    )
)]
pub async fn recent_appointments(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    if user.role != Role::Doctor {
        return Err(ApiError::forbidden("Only doctors can view their appointments"));
    }
    let store = state.store.read().await;
    Ok(Json(store.recent_for_doctor(user.user_id, RECENT_LIMIT)))
}

/// Appointment counts by status for the calling doctor.
#[utoipa::path(
    get,
    path = "/api/appointments/doctor/counts",
    tag = "Appointments",
    responses(
        (status = 200, description = "Counts keyed by status", body = AppointmentCounts),
        (status = 403, description = "Caller is not a doctor")
    )
)]
pub async fn appointment_counts(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<AppointmentCounts>, ApiError> {
    if user.role != Role::Doctor {
        return Err(ApiError::forbidden("Only doctors can view their appointments"));
    }
    let store = state.store.read().await;
    Ok(Json(store.counts_for_doctor(user.user_id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;

    struct Fixture {
        state: AppState,
        doctor: AuthenticatedUser,
        patient: AuthenticatedUser,
    }

    async fn fixture() -> Fixture {
        let state = AppState::default();
        let (doctor, patient) = {
            let mut store = state.store.write().await;
            let doctor = store
                .insert_user("doc@example.com", "Doc", Role::Doctor, "hash", Some("gp".into()))
                .unwrap();
            let patient = store
                .insert_user("pat1@example.com", "Pat", Role::Patient, "hash", None)
                .unwrap();
            (doctor, patient)
        };
        Fixture {
            state,
            doctor: AuthenticatedUser {
                user_id: doctor.id,
                email: doctor.email,
                role: doctor.role,
            },
            patient: AuthenticatedUser {
                user_id: patient.id,
                email: patient.email,
                role: patient.role,
            },
        }
    }

    fn booking(doctor_id: i64, date: &str) -> BookAppointmentRequest {
        BookAppointmentRequest {
            doctor_id,
            date: date.parse().unwrap(),
            time: "10:00:00".parse().unwrap(),
            comment: "checkup".into(),
        }
    }

    #[tokio::test]
    async fn booking_scenario_produces_pending_appointment() {
        let f = fixture().await;
        let Json(appointment) = book_appointment(
            State(f.state.clone()),
            Auth(f.patient.clone()),
            Json(booking(f.doctor.user_id, "2024-06-01")),
        )
        .await
        .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.doctor_id, f.doctor.user_id);
        assert_eq!(appointment.patient_id, f.patient.user_id);
        assert_eq!(appointment.comment, "checkup");

        // created_at is set once and survives a later status update.
        let Json(updated) = update_status(
            Path(appointment.id),
            State(f.state),
            Json(UpdateStatusRequest {
                status: "accepted".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.created_at, appointment.created_at);
    }

    #[tokio::test]
    async fn booking_a_patient_id_as_doctor_fails_regardless_of_caller() {
        let f = fixture().await;
        let err = book_appointment(
            State(f.state),
            Auth(f.patient.clone()),
            Json(booking(f.patient.user_id, "2024-06-01")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_status_to_cancelled_is_a_validation_error() {
        let f = fixture().await;
        let Json(appointment) = book_appointment(
            State(f.state.clone()),
            Auth(f.patient),
            Json(booking(f.doctor.user_id, "2024-06-01")),
        )
        .await
        .unwrap();

        let err = update_status(
            Path(appointment.id),
            State(f.state.clone()),
            Json(UpdateStatusRequest {
                status: "cancelled".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        // The appointment itself is untouched.
        let stored = f
            .state
            .store
            .read()
            .await
            .appointment_by_id(appointment.id)
            .unwrap();
        assert_eq!(stored.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn cancel_deletes_and_second_cancel_is_not_found() {
        let f = fixture().await;
        let Json(appointment) = book_appointment(
            State(f.state.clone()),
            Auth(f.patient),
            Json(booking(f.doctor.user_id, "2024-06-01")),
        )
        .await
        .unwrap();

        let status = cancel_appointment(Path(appointment.id), State(f.state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = cancel_appointment(Path(appointment.id), State(f.state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn concurrent_cancel_and_update_never_corrupt() {
        // The contract: the operations serialize on the store's write lock.
        // The cancel always finds a row to delete (the update never removes
        // it), and the update either lands before the delete or observes
        // NotFound. No interleaving leaves a deleted-but-updated row.
        for _ in 0..50 {
            let f = fixture().await;
            let Json(appointment) = book_appointment(
                State(f.state.clone()),
                Auth(f.patient.clone()),
                Json(booking(f.doctor.user_id, "2024-06-01")),
            )
            .await
            .unwrap();

            let cancel_state = f.state.clone();
            let update_state = f.state.clone();
            let id = appointment.id;

            let cancel = tokio::spawn(async move {
                cancel_appointment(Path(id), State(cancel_state)).await
            });
            let update = tokio::spawn(async move {
                update_status(
                    Path(id),
                    State(update_state),
                    Json(UpdateStatusRequest {
                        status: "accepted".into(),
                    }),
                )
                .await
            });

            let cancel_result = cancel.await.unwrap();
            let update_result = update.await.unwrap();

            assert!(cancel_result.is_ok(), "cancel must win or run first");
            if let Err(e) = update_result {
                // The update lost the race against the delete.
                assert_eq!(e.status, StatusCode::NOT_FOUND);
            }
            // Either way the row is gone afterwards.
            assert!(f.state.store.read().await.appointment_by_id(id).is_none());
        }
    }

    #[tokio::test]
    async fn doctor_listing_requires_doctor_role() {
        let f = fixture().await;
        let err = doctor_appointments(
            State(f.state),
            Auth(f.patient),
            Query(PageQuery { page: 0, size: 5 }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn doctor_listing_pages_deterministically() {
        let f = fixture().await;
        for day in 1..=7 {
            book_appointment(
                State(f.state.clone()),
                Auth(f.patient.clone()),
                Json(booking(f.doctor.user_id, &format!("2024-06-0{day}"))),
            )
            .await
            .unwrap();
        }

        let Json(first) = doctor_appointments(
            State(f.state.clone()),
            Auth(f.doctor.clone()),
            Query(PageQuery { page: 0, size: 5 }),
        )
        .await
        .unwrap();
        let Json(second) = doctor_appointments(
            State(f.state),
            Auth(f.doctor),
            Query(PageQuery { page: 0, size: 5 }),
        )
        .await
        .unwrap();

        assert_eq!(first.content, second.content);
        assert_eq!(first.total_elements, 7);
        assert_eq!(second.total_elements, 7);
        assert_eq!(first.total_pages, 2);
        assert!(!first.is_last_page);
    }

    #[tokio::test]
    async fn status_listing_filters_by_status_and_validates_input() {
        let f = fixture().await;
        let Json(appointment) = book_appointment(
            State(f.state.clone()),
            Auth(f.patient.clone()),
            Json(booking(f.doctor.user_id, "2024-06-01")),
        )
        .await
        .unwrap();
        book_appointment(
            State(f.state.clone()),
            Auth(f.patient.clone()),
            Json(booking(f.doctor.user_id, "2024-06-02")),
        )
        .await
        .unwrap();
        update_status(
            Path(appointment.id),
            State(f.state.clone()),
            Json(UpdateStatusRequest {
                status: "rejected".into(),
            }),
        )
        .await
        .unwrap();

        let Json(rejected) = doctor_appointments_by_status(
            Path("rejected".into()),
            State(f.state.clone()),
            Auth(f.doctor.clone()),
        )
        .await
        .unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].id, appointment.id);

        // cancelled is a valid filter that can never match a row.
        let Json(cancelled) = doctor_appointments_by_status(
            Path("cancelled".into()),
            State(f.state.clone()),
            Auth(f.doctor.clone()),
        )
        .await
        .unwrap();
        assert!(cancelled.is_empty());

        let err = doctor_appointments_by_status(
            Path("approved".into()),
            State(f.state.clone()),
            Auth(f.doctor.clone()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = doctor_appointments_by_status(
            Path("rejected".into()),
            State(f.state),
            Auth(f.patient),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn patient_listing_and_counts_projections() {
        let f = fixture().await;
        let Json(appointment) = book_appointment(
            State(f.state.clone()),
            Auth(f.patient.clone()),
            Json(booking(f.doctor.user_id, "2024-06-01")),
        )
        .await
        .unwrap();
        update_status(
            Path(appointment.id),
            State(f.state.clone()),
            Json(UpdateStatusRequest {
                status: "accepted".into(),
            }),
        )
        .await
        .unwrap();

        let Json(mine) = patient_appointments(State(f.state.clone()), Auth(f.patient))
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);

        let Json(counts) = appointment_counts(State(f.state), Auth(f.doctor))
            .await
            .unwrap();
        assert_eq!(counts.accepted, 1);
        assert_eq!(counts.cancelled, 0);
    }
}
